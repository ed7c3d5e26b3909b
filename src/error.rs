//! Error types.

use crate::types::c_int;

/// Typed failure of a single verification call.
///
/// The first three variants mirror the structural error codes of
/// `libbitcoinconsensus`. A script that merely fails evaluation is not an
/// error: it is reported as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `nIn` does not address an input of `txTo`.
    #[error("invalid index for txTo")]
    TxIndexOutOfBounds,

    /// The declared length of `txTo` did not match its serialized size.
    #[error("txToLen did not match with the size of txTo")]
    TxSizeMismatch,

    /// `txTo` is not a well-formed serialized transaction.
    #[error("failed to deserialize txTo")]
    Deserialize,

    /// The engine reported an error code this crate does not know.
    ///
    /// Newer engines add codes (amount required, invalid flags, ...); they are
    /// surfaced verbatim rather than folded into a known variant.
    #[error("script engine returned unrecognized error code {0}")]
    UnrecognizedEngineError(c_int),

    /// A buffer length cannot be expressed as a C `unsigned int`.
    #[error("{field} length {len} does not fit the engine's length field")]
    LengthOverflow { field: &'static str, len: usize },

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl Error {
    /// Whether the failure points at a bug in the caller (bad index or length)
    /// rather than at the supplied data.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::TxIndexOutOfBounds | Error::TxSizeMismatch | Error::LengthOverflow { .. }
        )
    }
}

/// Unknown script verification flag name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown script verification flag `{0}`")]
pub struct ParseFlagError(pub String);

/// Failure to load a native script engine.
#[cfg(feature = "native")]
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("library {path} does not expose {symbol}: {source}")]
    Symbol {
        path: String,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}
