// zkwarp/zkwarp-test-fixtures/src/lib.rs

use anyhow::{Context, Result};
use ark_bn254::{Bn254, Fr};
use ark_groth16::{prepare_verifying_key, PreparedVerifyingKey};
use once_cell::sync::OnceCell;

use zkwarp_circuit::commitment_tree::CommitmentTree;
use zkwarp_common::{
    artifacts::{
        serialize_proving_key, serialize_verifying_key, ArtifactFile, ArtifactManifest,
        MANIFEST_VERSION,
    },
    fr_to_bytes, ThresholdProofBundle, PROTOCOL_VERSION,
};
use zkwarp_prover::{prove, setup, PrivateWitness, ProofRequest, ProverParams};

const CREATED_AT_UNIX: u64 = 1_700_000_000;

/// 5.0 tokens at 18 decimals, proven against a 1.0 token minimum.
pub const FIXTURE_AMOUNT: u64 = 5_000_000_000_000_000_000;
pub const FIXTURE_MIN: u64 = 1_000_000_000_000_000_000;
pub const FIXTURE_SEED: [u8; 32] = [42u8; 32];

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// Key material, a sample commitment tree, and one proven bundle,
/// generated once and shared across tests. Groth16 setup is the
/// expensive part; nothing here should be regenerated per test.
pub struct TestFixtures {
    params: ProverParams,
    pvk: PreparedVerifyingKey<Bn254>,
    vk_bytes: Vec<u8>,
    pk_bytes: Vec<u8>,
    manifest: ArtifactManifest,
    tree: CommitmentTree,
    witness: PrivateWitness,
    request: ProofRequest,
    bundle: ThresholdProofBundle,
    bundle_json: String,
}

impl TestFixtures {
    pub fn params(&self) -> &ProverParams {
        &self.params
    }

    pub fn pvk(&self) -> &PreparedVerifyingKey<Bn254> {
        &self.pvk
    }

    pub fn vk_bytes(&self) -> &[u8] {
        &self.vk_bytes
    }

    pub fn pk_bytes(&self) -> &[u8] {
        &self.pk_bytes
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn tree(&self) -> &CommitmentTree {
        &self.tree
    }

    /// Fresh copy; callers may mutate it freely.
    pub fn witness(&self) -> PrivateWitness {
        self.witness.clone()
    }

    pub fn request(&self) -> ProofRequest {
        self.request
    }

    pub fn bundle(&self) -> &ThresholdProofBundle {
        &self.bundle
    }

    pub fn bundle_json(&self) -> &str {
        &self.bundle_json
    }
}

/// Lazily constructed fixtures shared across crates.
pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(|| build_fixtures().expect("failed to build zkwarp test fixtures"))
}

fn build_fixtures() -> Result<TestFixtures> {
    let leaves = vec![
        Fr::from(FIXTURE_AMOUNT),
        Fr::from(17u64),
        Fr::from(23u64),
        Fr::from(99u64),
    ];
    let tree = CommitmentTree::new(&leaves).context("build fixture tree")?;
    let path = tree.path(0).context("fixture membership path")?;
    let witness = PrivateWitness::new(FIXTURE_AMOUNT, FIXTURE_SEED, &path);
    let request = ProofRequest {
        min_amount: FIXTURE_MIN,
        merkle_root: fr_to_bytes(&tree.root()),
        event_binding_id: [9u8; 32],
    };

    let params = setup().context("fixture keygen")?;
    let bundle = prove(&params.pk, witness.clone(), &request).context("fixture proof")?;
    let bundle_json = serde_json::to_string(&bundle).context("encode fixture bundle")?;

    let vk_bytes = serialize_verifying_key(&params.vk)?;
    let pk_bytes = serialize_proving_key(&params.pk)?;
    let manifest = ArtifactManifest {
        manifest_version: MANIFEST_VERSION,
        protocol_version: PROTOCOL_VERSION,
        created_at_unix: CREATED_AT_UNIX,
        vk: ArtifactFile::from_bytes("vk.bin", &vk_bytes),
        pk: ArtifactFile::from_bytes("pk.bin", &pk_bytes),
    };
    let pvk = prepare_verifying_key(&params.vk);

    Ok(TestFixtures {
        params,
        pvk,
        vk_bytes,
        pk_bytes,
        manifest,
        tree,
        witness,
        request,
        bundle,
        bundle_json,
    })
}
