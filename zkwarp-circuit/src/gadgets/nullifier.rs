// zkwarp/zkwarp-circuit/src/gadgets/nullifier.rs

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::gadgets::poseidon;

pub fn compute_nullifier(
    cs: ConstraintSystemRef<Fr>,
    seed: &FpVar<Fr>,
    amount: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon::hash2(cs, seed, amount)
}
