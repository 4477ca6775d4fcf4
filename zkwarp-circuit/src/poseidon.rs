// zkwarp/zkwarp-circuit/src/poseidon.rs

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge},
    CryptographicSponge, FieldBasedCryptographicSponge,
};
use ark_ff::PrimeField;
use once_cell::sync::Lazy;

pub const POSEIDON_RATE: usize = 2;
pub const POSEIDON_CAPACITY: usize = 1;
pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;
pub const POSEIDON_ALPHA: u64 = 5;

static POSEIDON_CONFIG: Lazy<PoseidonConfig<Fr>> = Lazy::new(|| {
    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        Fr::MODULUS_BIT_SIZE as u64,
        POSEIDON_RATE,
        POSEIDON_FULL_ROUNDS as u64,
        POSEIDON_PARTIAL_ROUNDS as u64,
        0,
    );
    PoseidonConfig::new(
        POSEIDON_FULL_ROUNDS,
        POSEIDON_PARTIAL_ROUNDS,
        POSEIDON_ALPHA,
        mds,
        ark,
        POSEIDON_RATE,
        POSEIDON_CAPACITY,
    )
});

/// Canonical Poseidon parameters shared by the native helpers and the
/// in-circuit sponge. Both sides must absorb in the same order or the
/// prover and verifier diverge.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    &POSEIDON_CONFIG
}

pub fn hash2(a: Fr, b: Fr) -> Fr {
    let mut sponge = PoseidonSponge::new(poseidon_config());
    sponge.absorb(&a);
    sponge.absorb(&b);
    sponge.squeeze_native_field_elements(1)[0]
}

/// One-time-use binding of a secret seed to the committed amount.
pub fn nullifier_hash(seed: Fr, amount: Fr) -> Fr {
    hash2(seed, amount)
}

/// Order-sensitive node combiner for the commitment tree.
pub fn combine_nodes(left: Fr, right: Fr) -> Fr {
    hash2(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash2_is_deterministic() {
        let a = Fr::from(17u64);
        let b = Fr::from(23u64);
        assert_eq!(hash2(a, b), hash2(a, b));
    }

    #[test]
    fn hash2_is_order_sensitive() {
        let a = Fr::from(17u64);
        let b = Fr::from(23u64);
        assert_ne!(hash2(a, b), hash2(b, a));
    }
}
