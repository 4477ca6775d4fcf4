// zkwarp/zkwarp-event-proof/src/attestation.rs

use serde::{Deserialize, Serialize};

/// Validator-set attestation over a header signing digest. The
/// commitment identifies which validator set signed; the signature
/// format is attester-specific.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub validator_set_commitment: [u8; 32],
    pub signature: Vec<u8>,
}

/// Produces and checks attestations. Implementations wrap whatever the
/// source subnet's validators actually sign with.
pub trait Attester: Send + Sync {
    fn validator_set_commitment(&self) -> [u8; 32];
    fn attest(&self, digest: &[u8; 32]) -> Attestation;
    fn check(&self, digest: &[u8; 32], attestation: &Attestation) -> bool;
}

/// Symmetric attester: the signature is a keyed blake3 MAC over the
/// digest, and the commitment is the hash of the key. Suitable when
/// prover and verifier share the validator key material (tests,
/// single-operator deployments).
pub struct KeyedAttester {
    key: [u8; 32],
}

impl KeyedAttester {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }
}

impl Attester for KeyedAttester {
    fn validator_set_commitment(&self) -> [u8; 32] {
        *blake3::hash(&self.key).as_bytes()
    }

    fn attest(&self, digest: &[u8; 32]) -> Attestation {
        Attestation {
            validator_set_commitment: self.validator_set_commitment(),
            signature: blake3::keyed_hash(&self.key, digest).as_bytes().to_vec(),
        }
    }

    fn check(&self, digest: &[u8; 32], attestation: &Attestation) -> bool {
        if attestation.validator_set_commitment != self.validator_set_commitment() {
            return false;
        }
        let expected = blake3::keyed_hash(&self.key, digest);
        // constant-time comparison via blake3's Hash PartialEq
        match <[u8; 32]>::try_from(&attestation.signature[..]) {
            Ok(bytes) => blake3::Hash::from_bytes(bytes) == expected,
            Err(_) => false,
        }
    }
}
