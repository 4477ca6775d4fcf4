// zkwarp/zkwarp-tools/src/main.rs

use std::{
    fmt, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use zkwarp_common::artifacts::{
    load_verifier_artifacts, serialize_proving_key, serialize_verifying_key, write_manifest,
    ArtifactFile, ArtifactManifest, VerifierArtifacts, MANIFEST_FILE, MANIFEST_VERSION,
};
use zkwarp_common::PROTOCOL_VERSION;
use zkwarp_prover::setup;

const DEFAULT_OUTPUT_DIR: &str = "artifacts/local";
const DEFAULT_MANIFEST_PATH: &str = "artifacts/local/manifest.json";
const VK_FILENAME: &str = "vk.bin";
const PK_FILENAME: &str = "pk.bin";

#[derive(Parser)]
#[command(
    name = "zkwarp-tools",
    about = "Utility commands for zkwarp proving artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run key generation and write vk/pk plus a manifest.
    GenParams(GenParamsArgs),
    /// Print metadata about vk.bin based on the manifest path.
    DumpVk(DumpArgs),
}

#[derive(Args)]
struct GenParamsArgs {
    /// Output directory for artifacts.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

#[derive(Args)]
struct DumpArgs {
    #[arg(long, default_value = DEFAULT_MANIFEST_PATH)]
    manifest: PathBuf,
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::GenParams(args) => gen_params(args),
        Commands::DumpVk(args) => dump_vk(args),
    }
}

fn gen_params(args: GenParamsArgs) -> Result<()> {
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    println!("Generating threshold circuit artifacts...");
    println!("This may take several minutes...");

    let params = setup().context("key generation failed")?;
    let vk_bytes = serialize_verifying_key(&params.vk)?;
    let pk_bytes = serialize_proving_key(&params.pk)?;

    write_binary(args.output_dir.join(VK_FILENAME), &vk_bytes)?;
    write_binary(args.output_dir.join(PK_FILENAME), &pk_bytes)?;

    let manifest = ArtifactManifest {
        manifest_version: MANIFEST_VERSION,
        protocol_version: PROTOCOL_VERSION,
        created_at_unix: current_unix_timestamp(),
        vk: ArtifactFile::from_bytes(VK_FILENAME, &vk_bytes),
        pk: ArtifactFile::from_bytes(PK_FILENAME, &pk_bytes),
    };

    let manifest_path = args.output_dir.join(MANIFEST_FILE);
    write_manifest(&manifest_path, &manifest)?;

    println!(
        "Generated artifacts for protocol v{} at {}",
        manifest.protocol_version,
        args.output_dir.display()
    );
    print_artifact_summary(&manifest);
    Ok(())
}

fn print_artifact_summary(manifest: &ArtifactManifest) {
    println!("\nArtifact Summary:");
    println!(
        "  vk.bin: {} bytes, blake3: {}",
        manifest.vk.size, manifest.vk.blake3
    );
    println!(
        "  pk.bin: {} bytes, blake3: {}",
        manifest.pk.size, manifest.pk.blake3
    );
}

fn dump_vk(args: DumpArgs) -> Result<()> {
    let artifacts = load_artifacts(&args.manifest)?;
    let summary = VkSummary {
        manifest_path: args.manifest.display().to_string(),
        protocol_version: artifacts.manifest.protocol_version,
        manifest_version: artifacts.manifest.manifest_version,
        vk_hash: artifacts.manifest.vk.blake3.clone(),
        vk_size: artifacts.manifest.vk.size,
        public_signals: artifacts.vk.gamma_abc_g1.len() - 1,
    };
    output_summary(&summary, args.json)
}

fn write_binary(path: PathBuf, bytes: &[u8]) -> Result<()> {
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn load_artifacts(path: &PathBuf) -> Result<VerifierArtifacts> {
    load_verifier_artifacts(path)
        .with_context(|| format!("failed to load manifest {}", path.display()))
}

fn output_summary<T>(summary: &T, json: bool) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

#[derive(Serialize)]
struct VkSummary {
    manifest_path: String,
    protocol_version: u32,
    manifest_version: u32,
    vk_hash: String,
    vk_size: u64,
    public_signals: usize,
}

impl fmt::Display for VkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "manifest: {}", self.manifest_path)?;
        writeln!(f, "protocol_version: {}", self.protocol_version)?;
        writeln!(f, "manifest_version: {}", self.manifest_version)?;
        writeln!(f, "vk_hash: {}", self.vk_hash)?;
        writeln!(f, "vk_size: {} bytes", self.vk_size)?;
        writeln!(f, "public signals: {}", self.public_signals)
    }
}
