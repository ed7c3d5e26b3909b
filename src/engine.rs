//! The boundary to the external script verification engine.
//!
//! The engine is Bitcoin Core's consensus library (or anything reproducing
//! its contract). This crate never interprets scripts itself; it only hands
//! buffers across and reads back a result and an error code.

use std::sync::Arc;

use crate::types::{c_int, c_uint};

/// Error codes written by the engine into its `err` out-parameter.
///
/// This is a fixed wire contract (`bitcoinconsensus_error` in the C header).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i32)]
pub enum EngineErrorCode {
    /// No errors with the input parameters.
    Ok = 0,
    /// An invalid index for `txTo`.
    TxIndex = 1,
    /// `txToLen` did not match with the size of `txTo`.
    TxSizeMismatch = 2,
    /// An error deserializing `txTo`.
    Deserialize = 3,
}

impl EngineErrorCode {
    /// Returns `None` for codes outside the known enumeration.
    pub const fn from_raw(code: c_int) -> Option<Self> {
        match code {
            0 => Some(EngineErrorCode::Ok),
            1 => Some(EngineErrorCode::TxIndex),
            2 => Some(EngineErrorCode::TxSizeMismatch),
            3 => Some(EngineErrorCode::Deserialize),
            _ => None,
        }
    }

    pub const fn raw(self) -> c_int {
        self as c_int
    }
}

/// A script verification engine callable through the
/// `bitcoinconsensus_verify_script` contract.
///
/// Implementations must be safe to call from several threads at once for
/// independent inputs, and must never read past the end of `script_pubkey`
/// or `tx_to`. A declared `tx_to_len` larger than the buffer is answered
/// from the bytes actually supplied; see [`declared_prefix`] and
/// [`reclassify_overstated`].
pub trait ScriptEngine: Send + Sync {
    /// Returns `1` if input `n_in` of `tx_to` correctly spends `script_pubkey`
    /// under `flags`, `0` otherwise. `err` receives an [`EngineErrorCode`].
    #[allow(clippy::too_many_arguments)]
    fn verify_script(
        &self,
        script_pubkey: &[u8],
        script_pubkey_len: c_uint,
        tx_to: &[u8],
        tx_to_len: c_uint,
        n_in: c_uint,
        flags: c_uint,
        err: &mut c_int,
    ) -> c_int;

    /// API version reported by the engine.
    fn version(&self) -> c_int;
}

/// The part of `buf` an engine may read for a declared length: the first
/// `declared` bytes, or all of `buf` when more was declared than supplied.
pub fn declared_prefix(buf: &[u8], declared: c_uint) -> &[u8] {
    let len = usize::try_from(declared).unwrap_or(usize::MAX);
    &buf[..len.min(buf.len())]
}

/// Adjusts an answer computed over the supplied bytes of a `txTo` whose
/// declared length exceeds its buffer.
///
/// Bitcoin Core checks the flags, deserializes, bounds-checks the input
/// index and only then compares the serialized size with the declared length.
/// An index error or an unrecognized code therefore stands. Anything else
/// becomes [`EngineErrorCode::TxSizeMismatch`]: either the transaction
/// parsed completely and is shorter than declared, or it needs bytes the
/// caller never supplied.
pub fn reclassify_overstated(result: c_int, err: &mut c_int) -> c_int {
    match EngineErrorCode::from_raw(*err) {
        Some(EngineErrorCode::TxIndex) | None => result,
        Some(_) => {
            *err = EngineErrorCode::TxSizeMismatch.raw();
            0
        }
    }
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for &E {
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
        (**self).verify_script(
            script_pubkey,
            script_pubkey_len,
            tx_to,
            tx_to_len,
            n_in,
            flags,
            err,
        )
    }

    fn version(&self) -> c_int {
        (**self).version()
    }
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Arc<E> {
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
        (**self).verify_script(
            script_pubkey,
            script_pubkey_len,
            tx_to,
            tx_to_len,
            n_in,
            flags,
            err,
        )
    }

    fn version(&self) -> c_int {
        (**self).version()
    }
}
