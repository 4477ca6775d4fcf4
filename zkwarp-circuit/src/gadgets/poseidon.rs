// zkwarp/zkwarp-circuit/src/gadgets/poseidon.rs

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    constraints::CryptographicSpongeVar, poseidon::constraints::PoseidonSpongeVar,
};
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::poseidon::poseidon_config;

/// In-circuit counterpart of `poseidon::hash2`. Absorb order matches the
/// native sponge exactly.
pub fn hash2(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, poseidon_config());
    sponge.absorb(a)?;
    sponge.absorb(b)?;
    Ok(sponge.squeeze_field_elements(1)?.remove(0))
}
