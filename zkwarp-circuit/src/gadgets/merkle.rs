// zkwarp/zkwarp-circuit/src/gadgets/merkle.rs

use ark_bn254::Fr;
use ark_r1cs_std::{boolean::Boolean, fields::fp::FpVar, select::CondSelectGadget};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::gadgets::poseidon;

/// Walk the authentication path from the leaf up to the root.
///
/// A path bit of 1 means the running node is the right child at that level,
/// matching the bit convention of `commitment_tree::MembershipPath`.
pub fn recompute_root(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    siblings: &[FpVar<Fr>],
    path_bits: &[Boolean<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    debug_assert_eq!(siblings.len(), path_bits.len());
    let mut node = leaf.clone();
    for (sibling, bit) in siblings.iter().zip(path_bits.iter()) {
        let left = FpVar::conditionally_select(bit, sibling, &node)?;
        let right = FpVar::conditionally_select(bit, &node, sibling)?;
        node = poseidon::hash2(cs.clone(), &left, &right)?;
    }
    Ok(node)
}
