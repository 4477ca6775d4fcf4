// zkwarp/zkwarp-circuit/src/lib.rs

pub mod commitment_tree;
pub mod gadgets;
pub mod poseidon;

use ark_bn254::Fr;
use ark_r1cs_std::{
    alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar,
};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use thiserror::Error;

use crate::commitment_tree::{fold_path, MembershipPath};
use crate::poseidon::nullifier_hash;

/// Depth of the value-commitment accumulator (up to 1024 committed amounts).
pub const MERKLE_DEPTH: usize = 10;
/// Token amounts are compared as 64-bit unsigned integers.
pub const AMOUNT_BITS: usize = 64;
/// Public signal layout: [min_amount, merkle_root, nullifier].
pub const PUBLIC_SIGNAL_COUNT: usize = 3;

/// A witness that fails one of the three constraint groups. Proof
/// generation must stop on the first violation; a proof cannot exist for
/// an unsatisfiable witness.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("committed amount is below the disclosed minimum")]
    ThresholdViolation,
    #[error("committed amount is not a member of the accumulator root")]
    InvalidMembership,
    #[error("nullifier does not bind the secret seed to the amount")]
    NullifierMismatch,
}

/// Private assignment for one proof. Field copies made while synthesizing
/// constraints live only as long as the constraint system. Carries no
/// `Debug` impl so the seed and amount cannot leak through formatting.
#[derive(Clone, Copy)]
pub struct CircuitWitness {
    pub amount_raw: u64,
    pub seed: Fr,
    pub path_elements: [Fr; MERKLE_DEPTH],
    pub path_indices: [bool; MERKLE_DEPTH],
}

#[derive(Clone, Copy, Debug)]
pub struct CircuitPublic {
    pub min_amount: u64,
    pub merkle_root: Fr,
    pub nullifier: Fr,
}

/// The fixed threshold statement: the witness amount meets the public
/// minimum, sits under the public accumulator root, and hashes with the
/// secret seed to the public nullifier.
#[derive(Clone, Default)]
pub struct ThresholdCircuit {
    pub witness: Option<CircuitWitness>,
    pub public: Option<CircuitPublic>,
}

impl ThresholdCircuit {
    pub fn new(witness: CircuitWitness, public: CircuitPublic) -> Self {
        Self {
            witness: Some(witness),
            public: Some(public),
        }
    }

    /// Witness-free instance used for key generation.
    pub fn blank() -> Self {
        Self::default()
    }
}

/// Public signals in the order the circuit allocates its input variables.
pub fn public_signal_vector(public: &CircuitPublic) -> [Fr; PUBLIC_SIGNAL_COUNT] {
    [
        Fr::from(public.min_amount),
        public.merkle_root,
        public.nullifier,
    ]
}

/// Evaluate all three constraint groups natively, without any proving work.
///
/// Generation-side callers run this before Groth16 so an unsatisfiable
/// witness fails with a specific violation instead of an opaque synthesis
/// error.
pub fn evaluate_witness(
    witness: &CircuitWitness,
    public: &CircuitPublic,
) -> Result<(), ConstraintViolation> {
    if witness.amount_raw < public.min_amount {
        return Err(ConstraintViolation::ThresholdViolation);
    }

    let path = MembershipPath {
        elements: witness.path_elements,
        indices: witness.path_indices,
    };
    if fold_path(Fr::from(witness.amount_raw), &path) != public.merkle_root {
        return Err(ConstraintViolation::InvalidMembership);
    }

    if nullifier_hash(witness.seed, Fr::from(witness.amount_raw)) != public.nullifier {
        return Err(ConstraintViolation::NullifierMismatch);
    }

    Ok(())
}

/// Derive the nullifier the circuit will expose for this witness.
pub fn compute_nullifier(seed: Fr, amount_raw: u64) -> Fr {
    nullifier_hash(seed, Fr::from(amount_raw))
}

impl ConstraintSynthesizer<Fr> for ThresholdCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let public = self.public;
        let witness = self.witness;

        // Public inputs, in the fixed signal order.
        let min_amount = FpVar::new_input(cs.clone(), || {
            public
                .map(|p| Fr::from(p.min_amount))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let merkle_root = FpVar::new_input(cs.clone(), || {
            public
                .map(|p| p.merkle_root)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier = FpVar::new_input(cs.clone(), || {
            public
                .map(|p| p.nullifier)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let amount = FpVar::new_witness(cs.clone(), || {
            witness
                .map(|w| Fr::from(w.amount_raw))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let seed = FpVar::new_witness(cs.clone(), || {
            witness
                .map(|w| w.seed)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let mut siblings = Vec::with_capacity(MERKLE_DEPTH);
        let mut path_bits = Vec::with_capacity(MERKLE_DEPTH);
        for level in 0..MERKLE_DEPTH {
            siblings.push(FpVar::new_witness(cs.clone(), || {
                witness
                    .map(|w| w.path_elements[level])
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
            path_bits.push(Boolean::new_witness(cs.clone(), || {
                witness
                    .map(|w| w.path_indices[level])
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        gadgets::compare::enforce_geq(&amount, &min_amount, AMOUNT_BITS)?;

        let computed_root =
            gadgets::merkle::recompute_root(cs.clone(), &amount, &siblings, &path_bits)?;
        computed_root.enforce_equal(&merkle_root)?;

        let computed_nullifier = gadgets::nullifier::compute_nullifier(cs, &seed, &amount)?;
        computed_nullifier.enforce_equal(&nullifier)
    }
}
