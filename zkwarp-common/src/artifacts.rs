// zkwarp/zkwarp-common/src/artifacts.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use ark_bn254::Bn254;
use ark_groth16::{prepare_verifying_key, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use crate::{hash_bytes_hex, PROTOCOL_VERSION};

pub const MANIFEST_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub path: String,
    pub blake3: String,
    pub size: u64,
}

impl ArtifactFile {
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            blake3: hash_bytes_hex(bytes),
            size: bytes.len() as u64,
        }
    }

    fn resolve_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.path)
    }
}

/// Manifest describing one trusted-setup delivery. The key files are
/// integrity-checked against it on every load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub manifest_version: u32,
    pub protocol_version: u32,
    pub created_at_unix: u64,
    pub vk: ArtifactFile,
    pub pk: ArtifactFile,
}

#[derive(Clone, Debug)]
pub struct ProverArtifacts {
    pub manifest: ArtifactManifest,
    pub vk_bytes: Vec<u8>,
    pub pk_bytes: Vec<u8>,
    pub vk: VerifyingKey<Bn254>,
    pub pk: ProvingKey<Bn254>,
}

#[derive(Clone, Debug)]
pub struct VerifierArtifacts {
    pub manifest: ArtifactManifest,
    pub vk_bytes: Vec<u8>,
    pub vk: VerifyingKey<Bn254>,
    pub pvk: PreparedVerifyingKey<Bn254>,
}

pub fn serialize_verifying_key(vk: &VerifyingKey<Bn254>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    vk.serialize_compressed(&mut buf)
        .context("failed to serialize verifying key")?;
    Ok(buf)
}

pub fn deserialize_verifying_key(bytes: &[u8]) -> Result<VerifyingKey<Bn254>> {
    VerifyingKey::deserialize_compressed(bytes).context("failed to deserialize verifying key")
}

pub fn serialize_proving_key(pk: &ProvingKey<Bn254>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    pk.serialize_compressed(&mut buf)
        .context("failed to serialize proving key")?;
    Ok(buf)
}

pub fn deserialize_proving_key(bytes: &[u8]) -> Result<ProvingKey<Bn254>> {
    ProvingKey::deserialize_compressed(bytes).context("failed to deserialize proving key")
}

pub fn write_manifest(path: impl AsRef<Path>, manifest: &ArtifactManifest) -> Result<()> {
    let json = serde_json::to_vec_pretty(manifest).context("failed to serialize manifest")?;
    fs::write(path.as_ref(), json).context("failed to write manifest")
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<ArtifactManifest> {
    let bytes = fs::read(path.as_ref()).context("failed to read manifest file")?;
    serde_json::from_slice(&bytes).context("failed to parse manifest json")
}

pub fn load_prover_artifacts(path: impl AsRef<Path>) -> Result<ProverArtifacts> {
    let manifest_path = path.as_ref();
    let manifest = read_manifest(manifest_path)?;
    ensure_manifest_compat(&manifest)?;
    let base_dir = manifest_dir(manifest_path);

    let vk_bytes = read_artifact_file(&base_dir, &manifest.vk, "verifying key")?;
    let pk_bytes = read_artifact_file(&base_dir, &manifest.pk, "proving key")?;

    let vk = deserialize_verifying_key(&vk_bytes)?;
    let pk = deserialize_proving_key(&pk_bytes)?;

    Ok(ProverArtifacts {
        manifest,
        vk_bytes,
        pk_bytes,
        vk,
        pk,
    })
}

pub fn load_verifier_artifacts(path: impl AsRef<Path>) -> Result<VerifierArtifacts> {
    let manifest_path = path.as_ref();
    let manifest = read_manifest(manifest_path)?;
    ensure_manifest_compat(&manifest)?;
    let base_dir = manifest_dir(manifest_path);

    let vk_bytes = read_artifact_file(&base_dir, &manifest.vk, "verifying key")?;
    let vk = deserialize_verifying_key(&vk_bytes)?;
    let pvk = prepare_verifying_key(&vk);

    Ok(VerifierArtifacts {
        manifest,
        vk_bytes,
        vk,
        pvk,
    })
}

fn read_artifact_file(base_dir: &Path, entry: &ArtifactFile, label: &str) -> Result<Vec<u8>> {
    let path = entry.resolve_path(base_dir);
    let bytes = fs::read(&path)
        .with_context(|| format!("failed to read {} at {}", label, path.display()))?;
    ensure!(
        bytes.len() as u64 == entry.size,
        "{} size mismatch, manifest recorded {} bytes but found {}",
        label,
        entry.size,
        bytes.len(),
    );
    let actual = hash_bytes_hex(&bytes);
    ensure!(
        actual == entry.blake3,
        "{} hash mismatch, expected {} but computed {}",
        label,
        entry.blake3,
        actual
    );
    Ok(bytes)
}

fn manifest_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn ensure_manifest_compat(manifest: &ArtifactManifest) -> Result<()> {
    ensure!(
        manifest.manifest_version == MANIFEST_VERSION,
        "unsupported manifest version {}, expected {}",
        manifest.manifest_version,
        MANIFEST_VERSION
    );
    ensure!(
        manifest.protocol_version == PROTOCOL_VERSION,
        "protocol version mismatch: manifest {} vs crate {}",
        manifest.protocol_version,
        PROTOCOL_VERSION
    );
    Ok(())
}
