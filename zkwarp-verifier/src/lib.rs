// zkwarp/zkwarp-verifier/src/lib.rs
//
// Stateless checks first, pairing last, nullifier recording only after
// everything else passed. `verify` never writes; `verify_and_spend` is
// the only entry point that marks a nullifier as spent.

pub mod nullifier;

use ark_bn254::{Bn254, Fr, G1Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_groth16::{PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;

use zkwarp_common::{
    PublicSignals, ThresholdProofBundle, ZkwarpError, CURVE_ID, PROTOCOL_VERSION,
};

use crate::nullifier::NullifierStore;

/// Check a bundle against the verifying key and the registry without
/// recording anything. Order:
///
/// 1. protocol version and curve id gates
/// 2. proof decoding with explicit point validation
/// 3. public-signal bound checks
/// 4. replay pre-check against the store
/// 5. pairing equation
///
/// The replay pre-check is advisory; only `verify_and_spend` gives the
/// atomic guarantee.
pub fn verify(
    pvk: &PreparedVerifyingKey<Bn254>,
    bundle: &ThresholdProofBundle,
    store: &dyn NullifierStore,
) -> Result<(), ZkwarpError> {
    check_versions(bundle)?;
    let proof = decode_proof(&bundle.proof)?;
    check_points(&proof)?;
    check_public_signals(&bundle.public_signals)?;
    if store.contains(&bundle.public_signals.nullifier)? {
        return Err(ZkwarpError::ReplayDetected);
    }
    check_pairing(pvk, &proof, &bundle.public_signals)
}

/// `verify`, then atomically record the nullifier. Of two concurrent
/// calls with the same nullifier exactly one returns `Ok`; the other
/// gets `ReplayDetected`. A rejected proof leaves the store untouched.
pub fn verify_and_spend(
    pvk: &PreparedVerifyingKey<Bn254>,
    bundle: &ThresholdProofBundle,
    store: &dyn NullifierStore,
) -> Result<(), ZkwarpError> {
    verify(pvk, bundle, store)?;
    if !store.insert_if_absent(&bundle.public_signals.nullifier)? {
        return Err(ZkwarpError::ReplayDetected);
    }
    Ok(())
}

/// Stateless variant for callers that manage replay protection
/// elsewhere.
pub fn verify_proof_only(
    pvk: &PreparedVerifyingKey<Bn254>,
    bundle: &ThresholdProofBundle,
) -> Result<(), ZkwarpError> {
    check_versions(bundle)?;
    let proof = decode_proof(&bundle.proof)?;
    check_points(&proof)?;
    check_public_signals(&bundle.public_signals)?;
    check_pairing(pvk, &proof, &bundle.public_signals)
}

fn check_versions(bundle: &ThresholdProofBundle) -> Result<(), ZkwarpError> {
    if bundle.protocol_version != PROTOCOL_VERSION {
        return Err(ZkwarpError::UnsupportedVersion {
            got: bundle.protocol_version,
            supported: PROTOCOL_VERSION,
        });
    }
    if bundle.curve_id != CURVE_ID {
        return Err(ZkwarpError::MalformedInput(format!(
            "unsupported curve id '{}', expected '{CURVE_ID}'",
            bundle.curve_id
        )));
    }
    Ok(())
}

fn decode_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ZkwarpError> {
    Proof::<Bn254>::deserialize_compressed(bytes).map_err(|err| {
        ZkwarpError::CryptographicFailure(format!("proof decoding failed: {err}"))
    })
}

// Deserialization already validates, but the on-curve and subgroup
// checks are part of the verification contract and stay explicit here.
fn check_points(proof: &Proof<Bn254>) -> Result<(), ZkwarpError> {
    let a_ok = proof.a.is_on_curve() && proof.a.is_in_correct_subgroup_assuming_on_curve();
    let b_ok = proof.b.is_on_curve() && proof.b.is_in_correct_subgroup_assuming_on_curve();
    let c_ok = proof.c.is_on_curve() && proof.c.is_in_correct_subgroup_assuming_on_curve();
    if !(a_ok && b_ok && c_ok) {
        return Err(ZkwarpError::CryptographicFailure(
            "proof point off curve or outside the prime-order subgroup".into(),
        ));
    }
    Ok(())
}

fn check_public_signals(signals: &PublicSignals) -> Result<(), ZkwarpError> {
    if signals.min_amount == 0 {
        return Err(ZkwarpError::MalformedInput(
            "minimum amount must be positive".into(),
        ));
    }
    // root and nullifier must decode as canonical field elements
    signals.to_field_elements()?;
    Ok(())
}

/// Fold the public signals into the verification key's input commitment:
/// `vk_x = gamma_abc[0] + sum_i s_i * gamma_abc[i + 1]`.
fn prepare_public_inputs(
    vk: &VerifyingKey<Bn254>,
    inputs: &[Fr],
) -> Result<G1Projective, ZkwarpError> {
    if inputs.len() + 1 != vk.gamma_abc_g1.len() {
        return Err(ZkwarpError::MalformedInput(format!(
            "verifying key expects {} public signals, got {}",
            vk.gamma_abc_g1.len() - 1,
            inputs.len()
        )));
    }
    let mut acc = vk.gamma_abc_g1[0].into_group();
    for (scalar, base) in inputs.iter().zip(vk.gamma_abc_g1.iter().skip(1)) {
        acc += base.mul_bigint(scalar.into_bigint());
    }
    Ok(acc)
}

/// The Groth16 acceptance equation
/// `e(A, B) = e(alpha, beta) * e(vk_x, gamma) * e(C, delta)`,
/// evaluated as one multi-Miller loop against the prepared negated
/// gamma and delta, compared to the precomputed `e(alpha, beta)`.
fn check_pairing(
    pvk: &PreparedVerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    signals: &PublicSignals,
) -> Result<(), ZkwarpError> {
    let inputs = signals.to_field_elements()?;
    let vk_x = prepare_public_inputs(&pvk.vk, &inputs)?;

    let g1_terms: [<Bn254 as Pairing>::G1Prepared; 3] = [
        proof.a.into(),
        vk_x.into_affine().into(),
        proof.c.into(),
    ];
    let g2_terms: [<Bn254 as Pairing>::G2Prepared; 3] = [
        proof.b.into(),
        pvk.gamma_g2_neg_pc.clone(),
        pvk.delta_g2_neg_pc.clone(),
    ];

    let qap = Bn254::multi_miller_loop(g1_terms, g2_terms);
    let test = Bn254::final_exponentiation(qap).ok_or_else(|| {
        ZkwarpError::CryptographicFailure("pairing final exponentiation failed".into())
    })?;

    if test.0 != pvk.alpha_g1_beta_g2 {
        return Err(ZkwarpError::CryptographicFailure(
            "pairing equation does not hold".into(),
        ));
    }
    Ok(())
}
