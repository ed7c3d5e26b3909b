//! Verification call adapter.
//!
//! [`Verifier`] marshals a request across the engine boundary and turns the
//! engine's `(result, err)` pair into a typed outcome. It holds no state
//! between calls and never retries: verification is deterministic, so the
//! same request always yields the same outcome.

use log::{debug, trace, warn};

use crate::{
    engine::{EngineErrorCode, ScriptEngine},
    flags::FlagSet,
    hexutil,
    types::{c_int, c_uint},
    Error,
};

#[cfg(feature = "native")]
use crate::{error::LoadError, native::NativeEngine};

#[cfg(feature = "bundled")]
use crate::bundled::BundledEngine;

/// A single verification call: which input of `tx_to` spends `script_pubkey`,
/// and under which rules.
#[derive(Debug, Clone, Copy)]
pub struct VerificationRequest<'a> {
    script_pubkey: &'a [u8],
    tx_to: &'a [u8],
    input_index: c_uint,
    flags: c_uint,
    declared_tx_len: Option<usize>,
}

impl<'a> VerificationRequest<'a> {
    /// A request with no verification flags.
    pub fn new(script_pubkey: &'a [u8], tx_to: &'a [u8], input_index: c_uint) -> Self {
        Self {
            script_pubkey,
            tx_to,
            input_index,
            flags: FlagSet::NONE.bits(),
            declared_tx_len: None,
        }
    }

    pub fn with_flags(mut self, flags: impl Into<FlagSet>) -> Self {
        self.flags = flags.into().bits();
        self
    }

    /// Sets a raw mask. Bits no [`VerifyFlag`](crate::VerifyFlag) names are
    /// forwarded to the engine untouched.
    pub fn with_flag_bits(mut self, bits: c_uint) -> Self {
        self.flags = bits;
        self
    }

    /// Reports `len` as the length of `tx_to` instead of its actual size.
    ///
    /// A shorter `len` hands the engine only that prefix. A longer one is
    /// never padded: the engine answers from the bytes supplied and reports
    /// the overstatement as [`Error::TxSizeMismatch`] unless the input index
    /// is already out of range.
    pub fn with_declared_tx_len(mut self, len: usize) -> Self {
        self.declared_tx_len = Some(len);
        self
    }

    pub fn script_pubkey(&self) -> &'a [u8] {
        self.script_pubkey
    }

    pub fn tx_to(&self) -> &'a [u8] {
        self.tx_to
    }

    pub fn input_index(&self) -> c_uint {
        self.input_index
    }

    pub fn flags(&self) -> c_uint {
        self.flags
    }

    /// Length of `tx_to` as reported to the engine.
    pub fn tx_len(&self) -> usize {
        self.declared_tx_len.unwrap_or(self.tx_to.len())
    }
}

/// Translates the engine's return value and error code.
///
/// A non-OK error code takes precedence over the returned status.
pub fn outcome_from_raw(result: c_int, err: c_int) -> Result<bool, Error> {
    match EngineErrorCode::from_raw(err) {
        Some(EngineErrorCode::Ok) => Ok(result == 1),
        Some(EngineErrorCode::TxIndex) => Err(Error::TxIndexOutOfBounds),
        Some(EngineErrorCode::TxSizeMismatch) => Err(Error::TxSizeMismatch),
        Some(EngineErrorCode::Deserialize) => Err(Error::Deserialize),
        None => Err(Error::UnrecognizedEngineError(err)),
    }
}

fn wire_len(field: &'static str, len: usize) -> Result<c_uint, Error> {
    c_uint::try_from(len).map_err(|_| Error::LengthOverflow { field, len })
}

/// Verifies transaction inputs against previous output scripts through a
/// [`ScriptEngine`].
#[derive(Debug, Clone, Default)]
pub struct Verifier<E> {
    engine: E,
}

impl<E: ScriptEngine> Verifier<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Evaluates input `input_index` of the serialized transaction `tx_to`
    /// against `script_pubkey`.
    ///
    /// Returns `Ok(true)` if the script evaluated successfully, `Ok(false)`
    /// if it did not, and an [`Error`] if the engine rejected the arguments.
    /// Empty buffers are forwarded as-is.
    pub fn verify(
        &self,
        script_pubkey: &[u8],
        tx_to: &[u8],
        input_index: c_uint,
        flags: impl Into<FlagSet>,
    ) -> Result<bool, Error> {
        self.verify_request(
            &VerificationRequest::new(script_pubkey, tx_to, input_index).with_flags(flags),
        )
    }

    /// Same as [`Verifier::verify`] with a raw flags mask.
    pub fn verify_bits(
        &self,
        script_pubkey: &[u8],
        tx_to: &[u8],
        input_index: c_uint,
        flags: c_uint,
    ) -> Result<bool, Error> {
        self.verify_request(
            &VerificationRequest::new(script_pubkey, tx_to, input_index).with_flag_bits(flags),
        )
    }

    /// Same as [`Verifier::verify`] with hex encoded script and transaction.
    pub fn verify_hex(
        &self,
        script_pubkey_hex: &str,
        tx_to_hex: &str,
        input_index: c_uint,
        flags: impl Into<FlagSet>,
    ) -> Result<bool, Error> {
        let script_pubkey = hexutil::decode(script_pubkey_hex)?;
        let tx_to = hexutil::decode(tx_to_hex)?;
        self.verify(&script_pubkey, &tx_to, input_index, flags)
    }

    /// Performs exactly one engine call for `request`.
    pub fn verify_request(&self, request: &VerificationRequest<'_>) -> Result<bool, Error> {
        let script_pubkey_len = wire_len("scriptPubKey", request.script_pubkey.len())?;
        let tx_to_len = wire_len("txTo", request.tx_len())?;

        trace!(
            "verify_script spk={} spk_len={} tx_len={} (buffer {}) n_in={} flags={:#x}",
            hexutil::encode(request.script_pubkey),
            script_pubkey_len,
            tx_to_len,
            request.tx_to.len(),
            request.input_index,
            request.flags
        );

        let mut err: c_int = EngineErrorCode::Ok.raw();
        let result = self.engine.verify_script(
            request.script_pubkey,
            script_pubkey_len,
            request.tx_to,
            tx_to_len,
            request.input_index,
            request.flags,
            &mut err,
        );

        let outcome = outcome_from_raw(result, err);
        match &outcome {
            Ok(valid) => trace!("verify_script result={result} valid={valid}"),
            Err(Error::UnrecognizedEngineError(code)) => {
                warn!("script engine returned unrecognized error code {code} (result={result})")
            }
            Err(failure) => debug!("verify_script n_in={} failed: {failure}", request.input_index),
        }
        outcome
    }

    /// API version reported by the engine.
    pub fn engine_version(&self) -> c_int {
        self.engine.version()
    }
}

#[cfg(feature = "native")]
impl Verifier<NativeEngine> {
    /// Loads `libbitcoinconsensus` by its default name.
    pub fn load() -> Result<Self, LoadError> {
        NativeEngine::load().map(Self::new)
    }

    /// Loads the library at `path`.
    pub fn open<P: AsRef<std::ffi::OsStr>>(path: P) -> Result<Self, LoadError> {
        NativeEngine::open(path).map(Self::new)
    }

    /// See [`NativeEngine::from_env`].
    pub fn from_env() -> Result<Self, LoadError> {
        NativeEngine::from_env().map(Self::new)
    }
}

#[cfg(feature = "bundled")]
impl Verifier<BundledEngine> {
    pub fn bundled() -> Self {
        Self::new(BundledEngine::new())
    }
}
