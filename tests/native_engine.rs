//! Runs the shared vectors against a real `libbitcoinconsensus`.
//!
//! Set `BITCOINCONSENSUS_LIB` to the shared library to enable these tests;
//! without it they report a skip and pass.

#![cfg(feature = "native")]


use std::env;

use consensus_bridge::{
    hexutil, NativeEngine, Verifier, LIBRARY_PATH_ENV, MANDATORY_VERIFY_FLAGS,
};

const P2PKH_SPEND_TX: &str = "01000000015884e5db9de218238671572340b207ee85b628074e7e467096c267266baf77a4000000006a4730440220340f35055aceb14250e4954b23743332f671eb803263f363d1d7272f1d487209022037a0eaf7cb73897ba9069fc538e7275c5ae188e934ae47ca4a70453b64fc836401210234257444bd3aead2b851bda4288d60abe34095a2a8d49aff1d4d19773d22b32cffffffff01a0860100000000001976a9147821c0a3768aa9d1a37e16cf76002aef5373f1a888ac00000000";

fn native_verifier() -> Option<Verifier<NativeEngine>> {
    let Some(path) = env::var_os(LIBRARY_PATH_ENV) else {
        eprintln!("skipping: {LIBRARY_PATH_ENV} is not set");
        return None;
    };
    match Verifier::open(&path) {
        Ok(verifier) => Some(verifier),
        Err(err) => panic!("{LIBRARY_PATH_ENV} is set but the library failed to load: {err}"),
    }
}

#[test]
fn native_engine_passes_shared_vectors() {
    let Some(verifier) = native_verifier() else {
        return;
    };
    eprintln!(
        "native engine {} api version {}",
        verifier.engine().path().display(),
        verifier.engine_version()
    );
    let checked = vectors::run_all(&verifier, MANDATORY_VERIFY_FLAGS);
    assert!(checked > 0);
}

#[test]
fn native_engine_accepts_empty_script_pubkey() {
    let Some(verifier) = native_verifier() else {
        return;
    };
    let tx = hexutil::decode(P2PKH_SPEND_TX).unwrap();
    let outcome = verifier.verify(&[], &tx, 0, MANDATORY_VERIFY_FLAGS);
    assert!(outcome.is_ok(), "got {outcome:?}");
}

#[test]
fn native_engine_is_deterministic() {
    let Some(verifier) = native_verifier() else {
        return;
    };
    for vector in vectors::load() {
        let first = format!("{:?}", vector.run(&verifier));
        let second = format!("{:?}", vector.run(&verifier));
        assert_eq!(first, second, "vector `{}`", vector.comment);
    }
}
