// zkwarp/zkwarp-common/src/lib.rs

pub mod artifacts;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use zkwarp_circuit::ConstraintViolation;
use zkwarp_circuit::{CircuitPublic, PUBLIC_SIGNAL_COUNT};

/// Wire format version for threshold-proof bundles. Unknown versions are
/// rejected before any cryptographic work.
pub const PROTOCOL_VERSION: u32 = 1;
/// The only curve this engine produces or checks proofs for.
pub const CURVE_ID: &str = "bn254";

#[derive(Debug, Error)]
pub enum ZkwarpError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
    #[error("cryptographic failure: {0}")]
    CryptographicFailure(String),
    #[error("nullifier has already been spent")]
    ReplayDetected,
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("unsupported proof version {got}, this verifier supports {supported}")]
    UnsupportedVersion { got: u32, supported: u32 },
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Public statement carried alongside a threshold proof.
///
/// `nullifier` is `Hash(secret_seed, amount)`; the verifier cannot
/// recompute it and only checks it through the pairing equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals {
    pub min_amount: u64,
    pub merkle_root: [u8; 32],
    pub nullifier: [u8; 32],
}

impl PublicSignals {
    pub fn from_circuit(public: &CircuitPublic) -> Self {
        Self {
            min_amount: public.min_amount,
            merkle_root: fr_to_bytes(&public.merkle_root),
            nullifier: fr_to_bytes(&public.nullifier),
        }
    }

    /// Field-element view in the circuit's input order.
    pub fn to_field_elements(&self) -> Result<[Fr; PUBLIC_SIGNAL_COUNT], ZkwarpError> {
        Ok([
            Fr::from(self.min_amount),
            fr_from_bytes(&self.merkle_root)?,
            fr_from_bytes(&self.nullifier)?,
        ])
    }
}

/// Versioned threshold-proof wire format. `proof` holds the compressed
/// canonical encoding of the Groth16 `(A, B, C)` points.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThresholdProofBundle {
    pub protocol_version: u32,
    pub curve_id: String,
    pub proof: Vec<u8>,
    pub public_signals: PublicSignals,
    /// Caller-chosen correlation id binding this proof to an event proof.
    /// Opaque to the verifier; not part of the proven statement.
    #[serde(default)]
    pub event_binding_id: [u8; 32],
}

impl ThresholdProofBundle {
    pub fn new(proof: Vec<u8>, public_signals: PublicSignals, event_binding_id: [u8; 32]) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            curve_id: CURVE_ID.to_string(),
            proof,
            public_signals,
            event_binding_id,
        }
    }
}

pub fn serialize_bundle(bundle: &ThresholdProofBundle) -> Result<Vec<u8>, ZkwarpError> {
    serde_json::to_vec(bundle)
        .map_err(|err| ZkwarpError::MalformedInput(format!("failed to serialize bundle: {err}")))
}

pub fn deserialize_bundle(bytes: &[u8]) -> Result<ThresholdProofBundle, ZkwarpError> {
    serde_json::from_slice(bytes)
        .map_err(|err| ZkwarpError::MalformedInput(format!("failed to parse bundle: {err}")))
}

/// Little-endian canonical encoding of a scalar.
pub fn fr_to_bytes(fr: &Fr) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    let repr = fr.into_bigint().to_bytes_le();
    bytes[..repr.len()].copy_from_slice(&repr);
    bytes
}

pub fn fr_from_bytes(bytes: &[u8; 32]) -> Result<Fr, ZkwarpError> {
    let value = BigUint::from_bytes_le(bytes);
    if value >= Fr::MODULUS.into() {
        return Err(ZkwarpError::MalformedInput(
            "scalar encoding exceeds the bn254 field modulus".into(),
        ));
    }
    Ok(Fr::from(value))
}

pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkwarp_circuit::CircuitPublic;

    fn sample_public() -> CircuitPublic {
        CircuitPublic {
            min_amount: 1_000_000_000_000_000_000,
            merkle_root: Fr::from(123_456_789u64),
            nullifier: Fr::from(987_654_321u64),
        }
    }

    #[test]
    fn fr_bytes_round_trip() {
        let value = Fr::from(2024u64);
        let bytes = fr_to_bytes(&value);
        assert_eq!(fr_from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn fr_from_bytes_rejects_oversized_encoding() {
        let bytes = [0xFF; 32];
        assert!(fr_from_bytes(&bytes).is_err());
    }

    #[test]
    fn public_signals_round_trip_through_field_elements() {
        let public = sample_public();
        let signals = PublicSignals::from_circuit(&public);
        let elements = signals.to_field_elements().unwrap();
        assert_eq!(elements[0], Fr::from(public.min_amount));
        assert_eq!(elements[1], public.merkle_root);
        assert_eq!(elements[2], public.nullifier);
    }

    #[test]
    fn bundle_json_round_trip() {
        let bundle = ThresholdProofBundle::new(
            vec![1, 2, 3],
            PublicSignals::from_circuit(&sample_public()),
            [7u8; 32],
        );
        let bytes = serialize_bundle(&bundle).unwrap();
        let decoded = deserialize_bundle(&bytes).unwrap();
        assert_eq!(decoded.protocol_version, PROTOCOL_VERSION);
        assert_eq!(decoded.curve_id, CURVE_ID);
        assert_eq!(decoded.proof, bundle.proof);
        assert_eq!(decoded.public_signals, bundle.public_signals);
        assert_eq!(decoded.event_binding_id, bundle.event_binding_id);
    }
}
