//! Typed bindings for the `libbitcoinconsensus` script verification API.
//!
//! The script interpreter itself lives in Bitcoin Core's consensus library.
//! This crate provides the layer around it: the verification flag model,
//! the [`ScriptEngine`] boundary mirroring `bitcoinconsensus_verify_script`,
//! and a [`Verifier`] that maps the engine's integer error codes to [`Error`].
//!
//! ```no_run
//! use consensus_bridge::{Verifier, STANDARD_VERIFY_FLAGS};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = Verifier::from_env()?;
//! let valid = verifier.verify_hex(
//!     "76a9144621d47f08fcb1e6be0b91144202de7a186deade88ac",
//!     "0100000001...",
//!     0,
//!     STANDARD_VERIFY_FLAGS,
//! )?;
//! # let _ = valid;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "bundled")]
mod bundled;
mod engine;
mod error;
pub mod flags;
pub mod hexutil;
#[cfg(feature = "native")]
mod native;
pub mod types;
mod verifier;

#[cfg(feature = "bundled")]
pub use bundled::BundledEngine;
pub use engine::{declared_prefix, reclassify_overstated, EngineErrorCode, ScriptEngine};
#[cfg(feature = "native")]
pub use error::LoadError;
pub use error::{Error, ParseFlagError};
pub use flags::{
    combine, value_of, FlagSet, VerifyFlag, MANDATORY_VERIFY_FLAGS, STANDARD_VERIFY_FLAGS,
};
#[cfg(feature = "native")]
pub use native::{NativeEngine, DEFAULT_LIBRARY_NAME, LIBRARY_PATH_ENV};
pub use verifier::{outcome_from_raw, VerificationRequest, Verifier};

use crate::types::{c_int, c_uint};

/// `BITCOINCONSENSUS_API_VER` of the C header this crate is written against.
pub const CONSENSUS_API_VERSION: c_int = 1;

/// Bit of [`VerifyFlag::None`]: no special handling.
pub const VERIFY_NONE: c_uint = 0;
/// Bit of [`VerifyFlag::P2sh`]: evaluate P2SH (BIP16) subscripts.
pub const VERIFY_P2SH: c_uint = 1 << 0;
/// Bit of [`VerifyFlag::StrictEnc`]: require defined sighash types and strictly encoded signatures and public keys.
pub const VERIFY_STRICTENC: c_uint = 1 << 1;
/// Bit of [`VerifyFlag::DerSig`]: enforce strict DER (BIP66) signature encoding.
pub const VERIFY_DERSIG: c_uint = 1 << 2;
/// Bit of [`VerifyFlag::LowS`]: require signatures with S at most half the curve order (BIP62 rule 5).
pub const VERIFY_LOW_S: c_uint = 1 << 3;
/// Bit of [`VerifyFlag::NullDummy`]: the dummy element consumed by CHECKMULTISIG must be empty (BIP62 rule 7).
pub const VERIFY_NULLDUMMY: c_uint = 1 << 4;
/// Bit of [`VerifyFlag::SigPushOnly`]: scriptSig may only contain push operations (BIP62 rule 2).
pub const VERIFY_SIGPUSHONLY: c_uint = 1 << 5;
/// Bit of [`VerifyFlag::MinimalData`]: require minimal push encodings and minimally encoded numbers (BIP62 rules 3 and 4).
pub const VERIFY_MINIMALDATA: c_uint = 1 << 6;
/// Bit of [`VerifyFlag::DiscourageUpgradableNops`]: fail when an executed NOP1-NOP10 is encountered.
pub const VERIFY_DISCOURAGE_UPGRADABLE_NOPS: c_uint = 1 << 7;
/// Bit of [`VerifyFlag::CleanStack`]: exactly one stack element may remain after evaluation (BIP62 rule 6).
pub const VERIFY_CLEANSTACK: c_uint = 1 << 8;
/// Bit of [`VerifyFlag::CheckLockTimeVerify`]: enable OP_CHECKLOCKTIMEVERIFY (BIP65).
pub const VERIFY_CHECKLOCKTIMEVERIFY: c_uint = 1 << 9;
