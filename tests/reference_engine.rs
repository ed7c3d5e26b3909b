//! Pure-Rust stand-in for `libbitcoinconsensus`, used where the native
//! library is not available.
//!
//! Structural checks run in the same order as Bitcoin Core's
//! `verify_script`: deserialize, bounds-check the input index, then compare
//! the serialized size with the declared length. Only the bytes actually
//! supplied are read; a transaction that would need more of them than the
//! buffer holds is a size mismatch. Script evaluation is
//! limited to pay-to-pubkey-hash spends; any other script evaluates to false.
//! Flags are accepted but not interpreted.

#![allow(dead_code)]

use bitcoin::{
    consensus::encode::deserialize_partial,
    ecdsa,
    hashes::{hash160, Hash},
    script::Instruction,
    secp256k1::{Message, Secp256k1, VerifyOnly},
    sighash::SighashCache,
    PublicKey, Script, Transaction,
};
use consensus_bridge::{
    declared_prefix, hexutil,
    types::{c_int, c_uint},
    EngineErrorCode, ScriptEngine, CONSENSUS_API_VERSION,
};

/// A signed transaction with one input spending a P2PKH output.
pub const P2PKH_SPEND_TX: &str = "01000000015884e5db9de218238671572340b207ee85b628074e7e467096c267266baf77a4000000006a4730440220340f35055aceb14250e4954b23743332f671eb803263f363d1d7272f1d487209022037a0eaf7cb73897ba9069fc538e7275c5ae188e934ae47ca4a70453b64fc836401210234257444bd3aead2b851bda4288d60abe34095a2a8d49aff1d4d19773d22b32cffffffff01a0860100000000001976a9147821c0a3768aa9d1a37e16cf76002aef5373f1a888ac00000000";

/// The output spent by [`P2PKH_SPEND_TX`].
pub const P2PKH_SPENT_SCRIPT: &str = "76a9144621d47f08fcb1e6be0b91144202de7a186deade88ac";

/// A P2PKH script for a different key (the spend's own change output).
pub const P2PKH_OTHER_SCRIPT: &str = "76a9147821c0a3768aa9d1a37e16cf76002aef5373f1a888ac";

/// Two bytes that are not a transaction.
pub const MALFORMED_TX: &str = "abcd";

pub fn bytes(hex: &str) -> Vec<u8> {
    hexutil::decode(hex).expect("fixture hex")
}

/// API version reported by the reference engine.
pub const REFERENCE_API_VERSION: c_int = CONSENSUS_API_VERSION;

pub struct ReferenceEngine {
    secp: Secp256k1<VerifyOnly>,
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl ReferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn eval_p2pkh(&self, tx: &Transaction, input_index: usize, script_pubkey: &Script) -> bool {
        if !script_pubkey.is_p2pkh() {
            return false;
        }
        let expected_hash = &script_pubkey.as_bytes()[3..23];

        let pushes: Option<Vec<&[u8]>> = tx.input[input_index]
            .script_sig
            .instructions()
            .map(|ins| match ins {
                Ok(Instruction::PushBytes(data)) => Some(data.as_bytes()),
                _ => None,
            })
            .collect();
        let Some(pushes) = pushes else {
            return false;
        };
        let [sig_bytes, pubkey_bytes] = pushes.as_slice() else {
            return false;
        };

        if &hash160::Hash::hash(pubkey_bytes).to_byte_array()[..] != expected_hash {
            return false;
        }
        let Ok(pubkey) = PublicKey::from_slice(pubkey_bytes) else {
            return false;
        };
        let Ok(sig) = ecdsa::Signature::from_slice(sig_bytes) else {
            return false;
        };
        let Ok(sighash) = SighashCache::new(tx).legacy_signature_hash(
            input_index,
            script_pubkey,
            sig.sighash_type.to_u32(),
        ) else {
            return false;
        };

        let msg = Message::from_digest(sighash.to_byte_array());
        let mut signature = sig.signature;
        signature.normalize_s();
        self.secp
            .verify_ecdsa(&msg, &signature, &pubkey.inner)
            .is_ok()
    }
}

impl ScriptEngine for ReferenceEngine {
    fn verify_script(
        &self,
        script_pubkey: &[u8],
        script_pubkey_len: c_uint,
        tx_to: &[u8],
        tx_to_len: c_uint,
        n_in: c_uint,
        _flags: c_uint,
        err: &mut c_int,
    ) -> c_int {
        let script = declared_prefix(script_pubkey, script_pubkey_len);
        let tx_bytes = declared_prefix(tx_to, tx_to_len);
        let declared_len = tx_to_len as usize;

        let (tx, consumed) = match deserialize_partial::<Transaction>(tx_bytes) {
            Ok(parsed) => parsed,
            Err(_) if tx_bytes.len() < declared_len => {
                *err = EngineErrorCode::TxSizeMismatch.raw();
                return 0;
            }
            Err(_) => {
                *err = EngineErrorCode::Deserialize.raw();
                return 0;
            }
        };
        let input_index = n_in as usize;
        if input_index >= tx.input.len() {
            *err = EngineErrorCode::TxIndex.raw();
            return 0;
        }
        if consumed != declared_len {
            *err = EngineErrorCode::TxSizeMismatch.raw();
            return 0;
        }

        *err = EngineErrorCode::Ok.raw();
        c_int::from(self.eval_p2pkh(&tx, input_index, Script::from_bytes(script)))
    }

    fn version(&self) -> c_int {
        REFERENCE_API_VERSION
    }
}
