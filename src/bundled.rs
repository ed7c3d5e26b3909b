//! Script engine compiled into the binary through the `bitcoinconsensus` crate.

use bitcoinconsensus::Error as CoreError;

use crate::{
    engine::{declared_prefix, reclassify_overstated, EngineErrorCode, ScriptEngine},
    types::{c_int, c_uint},
};

/// Bitcoin Core's consensus code linked statically.
///
/// The crate exposes a `Result` based API; this adapter folds it back into the
/// raw result/error-code pair of the C contract so it is interchangeable with
/// [`NativeEngine`](crate::NativeEngine).
#[derive(Debug, Default, Copy, Clone)]
pub struct BundledEngine;

impl BundledEngine {
    pub fn new() -> Self {
        BundledEngine
    }
}

fn raw_error_code(err: CoreError) -> c_int {
    match err {
        CoreError::ERR_SCRIPT => EngineErrorCode::Ok.raw(),
        CoreError::ERR_TX_INDEX => EngineErrorCode::TxIndex.raw(),
        CoreError::ERR_TX_SIZE_MISMATCH => EngineErrorCode::TxSizeMismatch.raw(),
        CoreError::ERR_TX_DESERIALIZE => EngineErrorCode::Deserialize.raw(),
        // Codes newer than the legacy API keep their numeric value.
        other => other as c_int,
    }
}

impl ScriptEngine for BundledEngine {
    fn verify_script(
        &self,
        script_pubkey: &[u8],
        script_pubkey_len: c_uint,
        tx_to: &[u8],
        tx_to_len: c_uint,
        n_in: c_uint,
        flags: c_uint,
        err: &mut c_int,
    ) -> c_int {
        let script = declared_prefix(script_pubkey, script_pubkey_len);
        let tx = declared_prefix(tx_to, tx_to_len);

        let result =
            match bitcoinconsensus::verify_with_flags(script, 0, tx, None, n_in as usize, flags) {
                Ok(()) => {
                    *err = EngineErrorCode::Ok.raw();
                    1
                }
                Err(failure) => {
                    *err = raw_error_code(failure);
                    0
                }
            };
        if tx.len() < tx_to_len as usize {
            reclassify_overstated(result, err)
        } else {
            result
        }
    }

    fn version(&self) -> c_int {
        bitcoinconsensus::version() as c_int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_failure_is_not_an_error_code() {
        assert_eq!(raw_error_code(CoreError::ERR_SCRIPT), 0);
    }

    #[test]
    fn structural_errors_keep_wire_values() {
        assert_eq!(raw_error_code(CoreError::ERR_TX_INDEX), 1);
        assert_eq!(raw_error_code(CoreError::ERR_TX_SIZE_MISMATCH), 2);
        assert_eq!(raw_error_code(CoreError::ERR_TX_DESERIALIZE), 3);
        assert_eq!(raw_error_code(CoreError::ERR_INVALID_FLAGS), 5);
    }
}
