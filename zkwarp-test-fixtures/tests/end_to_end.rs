// zkwarp/zkwarp-test-fixtures/tests/end_to_end.rs
//
// Full prove/verify/spend pipeline over the shared fixture artifacts.

use std::fs;
use std::sync::Arc;
use std::thread;

use zkwarp_common::{
    artifacts::{load_verifier_artifacts, write_manifest, MANIFEST_FILE},
    deserialize_bundle, serialize_bundle, ZkwarpError,
};
use zkwarp_prover::prove;
use zkwarp_test_fixtures::{fixtures, FIXTURE_AMOUNT, FIXTURE_MIN};
use zkwarp_verifier::{
    nullifier::{MemoryNullifierStore, NullifierStore, SledNullifierStore},
    verify, verify_and_spend, verify_proof_only,
};

#[test]
fn fixture_bundle_verifies() {
    let fx = fixtures();
    verify_proof_only(fx.pvk(), fx.bundle()).unwrap();
}

#[test]
fn spend_accepts_once_then_replays() {
    let fx = fixtures();
    let store = MemoryNullifierStore::new();
    verify_and_spend(fx.pvk(), fx.bundle(), &store).unwrap();
    assert!(matches!(
        verify_and_spend(fx.pvk(), fx.bundle(), &store),
        Err(ZkwarpError::ReplayDetected)
    ));
    // the read-only path sees the spent nullifier too
    assert!(matches!(
        verify(fx.pvk(), fx.bundle(), &store),
        Err(ZkwarpError::ReplayDetected)
    ));
}

#[test]
fn concurrent_spends_admit_exactly_one_winner() {
    let fx = fixtures();
    let store = Arc::new(MemoryNullifierStore::new());
    let mut handles = Vec::new();
    for _ in 0..2 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            verify_and_spend(fixtures().pvk(), fixtures().bundle(), store.as_ref())
        }));
    }
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let replayed = results
        .iter()
        .filter(|result| matches!(result, Err(ZkwarpError::ReplayDetected)))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(replayed, 1);
}

#[test]
fn spend_persists_across_sled_reopen_handles() {
    let fx = fixtures();
    let store = SledNullifierStore::temporary().unwrap();
    verify_and_spend(fx.pvk(), fx.bundle(), &store).unwrap();
    assert!(store.contains(&fx.bundle().public_signals.nullifier).unwrap());
}

#[test]
fn bundle_json_reveals_minimum_but_not_the_amount() {
    let fx = fixtures();
    let json = fx.bundle_json();
    assert!(json.contains(&FIXTURE_MIN.to_string()));
    assert!(!json.contains(&FIXTURE_AMOUNT.to_string()));
}

#[test]
fn bundle_survives_the_wire() {
    let fx = fixtures();
    let bytes = serialize_bundle(fx.bundle()).unwrap();
    let decoded = deserialize_bundle(&bytes).unwrap();
    verify_proof_only(fx.pvk(), &decoded).unwrap();
}

#[test]
fn corrupted_proof_bytes_are_rejected() {
    let fx = fixtures();
    let mut bundle = fx.bundle().clone();
    let last = bundle.proof.len() - 1;
    bundle.proof[last] ^= 0x01;
    assert!(matches!(
        verify_proof_only(fx.pvk(), &bundle),
        Err(ZkwarpError::CryptographicFailure(_))
    ));
}

#[test]
fn restating_the_minimum_breaks_the_proof() {
    let fx = fixtures();
    let mut bundle = fx.bundle().clone();
    bundle.public_signals.min_amount = FIXTURE_MIN + 1;
    assert!(matches!(
        verify_proof_only(fx.pvk(), &bundle),
        Err(ZkwarpError::CryptographicFailure(_))
    ));
}

#[test]
fn distinct_seeds_spend_independently() {
    let fx = fixtures();
    let mut witness = fx.witness();
    witness.secret_seed = [43u8; 32];
    let second = prove(&fx.params().pk, witness, &fx.request()).unwrap();
    assert_ne!(
        second.public_signals.nullifier,
        fx.bundle().public_signals.nullifier
    );

    let store = MemoryNullifierStore::new();
    verify_and_spend(fx.pvk(), fx.bundle(), &store).unwrap();
    verify_and_spend(fx.pvk(), &second, &store).unwrap();
}

#[test]
fn verifier_artifacts_load_from_manifest() {
    let fx = fixtures();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("vk.bin"), fx.vk_bytes()).unwrap();
    fs::write(dir.path().join("pk.bin"), fx.pk_bytes()).unwrap();
    let manifest_path = dir.path().join(MANIFEST_FILE);
    write_manifest(&manifest_path, fx.manifest()).unwrap();

    let artifacts = load_verifier_artifacts(&manifest_path).unwrap();
    verify_proof_only(&artifacts.pvk, fx.bundle()).unwrap();
}

#[test]
fn tampered_artifact_fails_the_integrity_check() {
    let fx = fixtures();
    let dir = tempfile::tempdir().unwrap();
    let mut vk_bytes = fx.vk_bytes().to_vec();
    vk_bytes[0] ^= 0x01;
    fs::write(dir.path().join("vk.bin"), &vk_bytes).unwrap();
    fs::write(dir.path().join("pk.bin"), fx.pk_bytes()).unwrap();
    let manifest_path = dir.path().join(MANIFEST_FILE);
    write_manifest(&manifest_path, fx.manifest()).unwrap();

    assert!(load_verifier_artifacts(&manifest_path).is_err());
}
