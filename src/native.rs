//! Dynamically loaded `libbitcoinconsensus`.

use std::{
    env,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use libloading::Library;
use log::{debug, info, warn};

use crate::{
    engine::{declared_prefix, reclassify_overstated, ScriptEngine},
    error::LoadError,
    types::{c_int, c_uint},
    CONSENSUS_API_VERSION,
};

/// Library name resolved to the platform file name by [`NativeEngine::load`].
pub const DEFAULT_LIBRARY_NAME: &str = "bitcoinconsensus";

/// Environment variable holding an explicit path to the shared library.
pub const LIBRARY_PATH_ENV: &str = "BITCOINCONSENSUS_LIB";

const VERIFY_SCRIPT_SYMBOL: &str = "bitcoinconsensus_verify_script";
const VERSION_SYMBOL: &str = "bitcoinconsensus_version";

type VerifyScriptFn = unsafe extern "C" fn(
    *const u8,
    c_uint,
    *const u8,
    c_uint,
    c_uint,
    c_uint,
    *mut c_int,
) -> c_int;

type VersionFn = unsafe extern "C" fn() -> c_int;

/// Script engine backed by a `libbitcoinconsensus` shared library.
///
/// Both entry points are resolved once when the library is opened; the
/// library stays loaded for as long as the engine lives.
#[derive(Debug)]
pub struct NativeEngine {
    verify_script: VerifyScriptFn,
    version: VersionFn,
    path: PathBuf,
    _lib: Library,
}

impl NativeEngine {
    /// Loads the library by its default name through the system search path.
    pub fn load() -> Result<Self, LoadError> {
        Self::open(libloading::library_filename(DEFAULT_LIBRARY_NAME))
    }

    /// Loads the library named by `BITCOINCONSENSUS_LIB`, or the default
    /// library when the variable is unset or empty.
    pub fn from_env() -> Result<Self, LoadError> {
        match env::var_os(LIBRARY_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::open(path),
            _ => Self::load(),
        }
    }

    /// Loads the library at `path` (or by file name through the search path).
    pub fn open<P: AsRef<OsStr>>(path: P) -> Result<Self, LoadError> {
        let path = PathBuf::from(path.as_ref());
        let display = || path.display().to_string();

        // SAFETY: Loading a dynamic library runs its initialisers; libbitcoinconsensus has none
        // beyond static data. Symbols are validated below.
        let lib = unsafe { Library::new(&path) }.map_err(|source| LoadError::Open {
            path: display(),
            source,
        })?;

        // SAFETY: The function pointer type matches the C header ABI.
        let verify_script = unsafe { lib.get::<VerifyScriptFn>(VERIFY_SCRIPT_SYMBOL.as_bytes()) }
            .map(|sym| *sym)
            .map_err(|source| LoadError::Symbol {
                path: display(),
                symbol: VERIFY_SCRIPT_SYMBOL,
                source,
            })?;

        // SAFETY: The function pointer type matches the C header ABI.
        let version = unsafe { lib.get::<VersionFn>(VERSION_SYMBOL.as_bytes()) }
            .map(|sym| *sym)
            .map_err(|source| LoadError::Symbol {
                path: display(),
                symbol: VERSION_SYMBOL,
                source,
            })?;

        let engine = Self {
            verify_script,
            version,
            path,
            _lib: lib,
        };
        let api_version = engine.version();
        info!(
            "loaded {} (api version {})",
            engine.path.display(),
            api_version
        );
        if api_version != CONSENSUS_API_VERSION {
            warn!(
                "{} reports api version {}, expected {}",
                engine.path.display(),
                api_version,
                CONSENSUS_API_VERSION
            );
        }
        Ok(engine)
    }

    /// Path or file name the library was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScriptEngine for NativeEngine {
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
        let overstated = tx.len() < tx_to_len as usize;
        if overstated {
            debug!(
                "txTo declared as {} bytes but only {} supplied",
                tx_to_len,
                tx.len()
            );
        }

        // SAFETY: each pointer is passed with the length of the slice it came from, both
        // slices outlive the call and `err` is a valid exclusive pointer.
        let result = unsafe {
            (self.verify_script)(
                script.as_ptr(),
                script.len() as c_uint,
                tx.as_ptr(),
                tx.len() as c_uint,
                n_in,
                flags,
                err,
            )
        };
        if overstated {
            reclassify_overstated(result, err)
        } else {
            result
        }
    }

    fn version(&self) -> c_int {
        // SAFETY: Symbol was resolved at load time and takes no arguments.
        unsafe { (self.version)() }
    }
}
