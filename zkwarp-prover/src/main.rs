// zkwarp/zkwarp-prover/src/main.rs

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use zkwarp_common::artifacts::load_prover_artifacts;
use zkwarp_prover::{prove, PrivateWitness, ProofRequest};

#[derive(Deserialize)]
struct ProveInput {
    witness: PrivateWitness,
    request: ProofRequest,
}

#[derive(Parser)]
struct Args {
    /// JSON file holding the private witness and the public request.
    #[arg(long)]
    input_json: PathBuf,
    /// Where to write the proof bundle JSON.
    #[arg(long)]
    output_bundle: PathBuf,
    #[arg(long, default_value = "artifacts/manifest.json")]
    manifest: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let json = fs::read_to_string(&args.input_json)
        .with_context(|| format!("failed to read {}", args.input_json.display()))?;
    let input: ProveInput = serde_json::from_str(&json).context("failed to parse input json")?;

    let artifacts = load_prover_artifacts(&args.manifest)
        .with_context(|| format!("failed to load manifest {}", args.manifest.display()))?;

    let bundle =
        prove(&artifacts.pk, input.witness, &input.request).context("proof generation failed")?;

    let bundle_json =
        serde_json::to_vec_pretty(&bundle).context("failed to serialize proof bundle")?;
    fs::write(&args.output_bundle, bundle_json)
        .with_context(|| format!("failed to write {}", args.output_bundle.display()))?;

    println!(
        "wrote proof bundle (protocol v{}) to {}",
        bundle.protocol_version,
        args.output_bundle.display()
    );
    Ok(())
}
