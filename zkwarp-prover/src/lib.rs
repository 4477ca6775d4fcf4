// zkwarp/zkwarp-prover/src/lib.rs

use ark_bn254::{Bn254, Fr};
use ark_ff::PrimeField;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::CanonicalSerialize;
use ark_snark::SNARK;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use zkwarp_circuit::{
    commitment_tree::MembershipPath, compute_nullifier, evaluate_witness, CircuitPublic,
    CircuitWitness, ThresholdCircuit, MERKLE_DEPTH,
};
use zkwarp_common::{
    fr_from_bytes, fr_to_bytes, PublicSignals, ThresholdProofBundle, ZkwarpError,
};

pub struct ProverParams {
    pub pk: ProvingKey<Bn254>,
    pub vk: VerifyingKey<Bn254>,
}

/// One-time circuit-specific key generation. Production deployments load
/// keys from a manifest instead; this exists for tooling and tests.
pub fn setup() -> Result<ProverParams, ZkwarpError> {
    let mut rng = OsRng;
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(ThresholdCircuit::blank(), &mut rng)
        .map_err(|err| ZkwarpError::CryptographicFailure(format!("keygen failed: {err}")))?;
    Ok(ProverParams { pk, vk })
}

/// Private proof inputs. Never serialized onto the wire; the whole struct
/// is scrubbed when dropped. Deliberately carries no `Debug` impl.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PrivateWitness {
    pub actual_amount: u64,
    /// Interpreted little-endian and reduced into the scalar field.
    pub secret_seed: [u8; 32],
    pub path_elements: Vec<[u8; 32]>,
    pub path_indices: Vec<u8>,
}

impl PrivateWitness {
    pub fn new(actual_amount: u64, secret_seed: [u8; 32], path: &MembershipPath) -> Self {
        Self {
            actual_amount,
            secret_seed,
            path_elements: path.elements.iter().map(fr_to_bytes).collect(),
            path_indices: path.indices.iter().map(|bit| *bit as u8).collect(),
        }
    }
}

/// Public side of a proof request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ProofRequest {
    pub min_amount: u64,
    pub merkle_root: [u8; 32],
    /// Correlation id for pairing this proof with an event proof. Echoed
    /// into the bundle, never proven.
    #[serde(default)]
    pub event_binding_id: [u8; 32],
}

/// Produce a threshold proof for `witness` against `request`.
///
/// All three constraint groups are evaluated natively first so an
/// unsatisfiable witness fails with its specific violation before any
/// proving work. Groth16 randomness is drawn fresh from the OS on every
/// call.
pub fn prove(
    pk: &ProvingKey<Bn254>,
    witness: PrivateWitness,
    request: &ProofRequest,
) -> Result<ThresholdProofBundle, ZkwarpError> {
    let circuit_witness = build_circuit_witness(&witness)?;
    let merkle_root = fr_from_bytes(&request.merkle_root)?;
    let nullifier = compute_nullifier(circuit_witness.seed, circuit_witness.amount_raw);
    let public = CircuitPublic {
        min_amount: request.min_amount,
        merkle_root,
        nullifier,
    };

    evaluate_witness(&circuit_witness, &public)?;

    let circuit = ThresholdCircuit::new(circuit_witness, public);
    let mut rng = OsRng;
    let proof = Groth16::<Bn254>::prove(pk, circuit, &mut rng)
        .map_err(|err| ZkwarpError::CryptographicFailure(format!("proving failed: {err}")))?;

    let mut proof_bytes = Vec::new();
    proof
        .serialize_compressed(&mut proof_bytes)
        .map_err(|err| {
            ZkwarpError::CryptographicFailure(format!("proof serialization failed: {err}"))
        })?;

    let signals = PublicSignals::from_circuit(&public);
    // scrub amount, seed, and path material
    drop(witness);

    Ok(ThresholdProofBundle::new(
        proof_bytes,
        signals,
        request.event_binding_id,
    ))
}

fn build_circuit_witness(witness: &PrivateWitness) -> Result<CircuitWitness, ZkwarpError> {
    if witness.path_elements.len() != MERKLE_DEPTH || witness.path_indices.len() != MERKLE_DEPTH {
        return Err(ZkwarpError::MalformedInput(format!(
            "membership path must have exactly {MERKLE_DEPTH} levels"
        )));
    }

    let mut path_elements = [Fr::from(0u64); MERKLE_DEPTH];
    for (slot, bytes) in path_elements.iter_mut().zip(witness.path_elements.iter()) {
        *slot = fr_from_bytes(bytes)?;
    }

    let mut path_indices = [false; MERKLE_DEPTH];
    for (slot, bit) in path_indices.iter_mut().zip(witness.path_indices.iter()) {
        *slot = match bit {
            0 => false,
            1 => true,
            other => {
                return Err(ZkwarpError::MalformedInput(format!(
                    "path index must be 0 or 1, got {other}"
                )))
            }
        };
    }

    Ok(CircuitWitness {
        amount_raw: witness.actual_amount,
        seed: Fr::from_le_bytes_mod_order(&witness.secret_seed),
        path_elements,
        path_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkwarp_circuit::commitment_tree::CommitmentTree;
    use zkwarp_circuit::ConstraintViolation;

    const AMOUNT: u64 = 5_000_000_000_000_000_000;
    const MIN: u64 = 1_000_000_000_000_000_000;

    fn fixture() -> (PrivateWitness, ProofRequest) {
        let leaves = vec![Fr::from(AMOUNT), Fr::from(17u64), Fr::from(23u64)];
        let tree = CommitmentTree::new(&leaves).unwrap();
        let path = tree.path(0).unwrap();
        let witness = PrivateWitness::new(AMOUNT, [42u8; 32], &path);
        let request = ProofRequest {
            min_amount: MIN,
            merkle_root: fr_to_bytes(&tree.root()),
            event_binding_id: [9u8; 32],
        };
        (witness, request)
    }

    #[test]
    fn below_threshold_fails_before_any_proving_work() {
        let (witness, mut request) = fixture();
        request.min_amount = AMOUNT + 1;
        let circuit_witness = build_circuit_witness(&witness).unwrap();
        let public = CircuitPublic {
            min_amount: request.min_amount,
            merkle_root: fr_from_bytes(&request.merkle_root).unwrap(),
            nullifier: compute_nullifier(circuit_witness.seed, circuit_witness.amount_raw),
        };
        assert_eq!(
            evaluate_witness(&circuit_witness, &public),
            Err(ConstraintViolation::ThresholdViolation)
        );
    }

    #[test]
    fn short_membership_path_is_malformed() {
        let (mut witness, _) = fixture();
        witness.path_elements.pop();
        assert!(matches!(
            build_circuit_witness(&witness),
            Err(ZkwarpError::MalformedInput(_))
        ));
    }

    #[test]
    fn non_binary_path_index_is_malformed() {
        let (mut witness, _) = fixture();
        witness.path_indices[0] = 2;
        assert!(matches!(
            build_circuit_witness(&witness),
            Err(ZkwarpError::MalformedInput(_))
        ));
    }

    #[test]
    fn witness_json_round_trip_preserves_path() {
        let (witness, _) = fixture();
        let json = serde_json::to_string(&witness).unwrap();
        let decoded: PrivateWitness = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.actual_amount, witness.actual_amount);
        assert_eq!(decoded.path_elements, witness.path_elements);
        assert_eq!(decoded.path_indices, witness.path_indices);
    }
}
