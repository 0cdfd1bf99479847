//! CLI for fetching a deployment's function manifest.
//!
//! Reads the manifest from a local file (`--path`) or from the
//! deployment-introspection command (`--command`, repeat `--arg` for its
//! arguments), then writes it out as pretty JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use liveq_manifest::{load, ManifestSource};
use tracing::info;

#[derive(Parser)]
#[command(name = "liveq-manifest", about = "Fetch a deployment function manifest")]
struct Cli {
    /// Read the manifest from this file instead of running a command.
    #[arg(long, conflicts_with = "command")]
    path: Option<PathBuf>,

    /// Introspection command that prints the manifest to stdout.
    #[arg(long)]
    command: Option<String>,

    /// Argument for the introspection command (repeatable).
    #[arg(long = "arg", requires = "command")]
    args: Vec<String>,

    /// Where to write the manifest.
    #[arg(long, default_value = "functions.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match (cli.path, cli.command) {
        (Some(path), None) => ManifestSource::File(path),
        (None, Some(program)) => ManifestSource::Command {
            program,
            args: cli.args,
        },
        (None, None) => bail!("one of --path or --command is required"),
        (Some(_), Some(_)) => unreachable!("clap rejects conflicting sources"),
    };

    let manifest = load(&source).context("failed to load manifest")?;
    info!(functions = manifest.functions.len(), "loaded manifest");

    let text = serde_json::to_string_pretty(&manifest)?;
    fs::write(&cli.output, text)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "wrote manifest");

    Ok(())
}
