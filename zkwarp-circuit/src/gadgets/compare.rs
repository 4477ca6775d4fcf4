// zkwarp/zkwarp-circuit/src/gadgets/compare.rs

use ark_bn254::Fr;
use ark_r1cs_std::{boolean::Boolean, eq::EqGadget, fields::fp::FpVar, ToBitsGadget};
use ark_relations::r1cs::SynthesisError;

/// Enforce a >= b for values encoded in at most `bits` bits.
///
/// Both operands are range-checked before comparing, so `a - b` can only
/// fit back into `bits` bits when no wrap-around occurred.
pub fn enforce_geq(a: &FpVar<Fr>, b: &FpVar<Fr>, bits: usize) -> Result<(), SynthesisError> {
    enforce_bit_length(a, bits)?;
    enforce_bit_length(b, bits)?;
    enforce_bit_length(&(a - b), bits)
}

/// Constrain `value` to the low `bits` bits of its canonical decomposition.
pub fn enforce_bit_length(value: &FpVar<Fr>, bits: usize) -> Result<(), SynthesisError> {
    let decomposition = value.to_bits_le()?;
    for bit in decomposition.iter().skip(bits) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }
    Ok(())
}
