//! Manifest loading.
//!
//! Either reads the manifest from a given local file, or runs the
//! deployment-introspection command with stdout redirected into a named
//! temporary file, reads the manifest back from it, and lets the temp-file
//! guard delete it whether loading succeeded or failed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ManifestError;
use crate::manifest::Manifest;

/// Where to load the manifest from.
#[derive(Clone, Debug)]
pub enum ManifestSource {
    /// A manifest file already on disk.
    File(PathBuf),
    /// A deployment-introspection command that prints the manifest to
    /// stdout.
    Command { program: String, args: Vec<String> },
}

/// Loads the manifest from the given source.
pub fn load(source: &ManifestSource) -> Result<Manifest, ManifestError> {
    match source {
        ManifestSource::File(path) => load_from_file(path),
        ManifestSource::Command { program, args } => load_from_command(program, args),
    }
}

/// Reads a manifest from a local file.
pub fn load_from_file(path: &Path) -> Result<Manifest, ManifestError> {
    debug!(path = %path.display(), "reading manifest file");
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Runs the introspection command and reads the manifest it prints.
///
/// Stdout is redirected into a named temporary file which is deleted when
/// the guard drops, on every return path.
pub fn load_from_command(program: &str, args: &[String]) -> Result<Manifest, ManifestError> {
    let tmp = NamedTempFile::new().map_err(ManifestError::TempFile)?;
    let stdout = tmp.reopen().map_err(ManifestError::TempFile)?;

    debug!(%program, ?args, tmp = %tmp.path().display(), "running introspection command");
    let status = Command::new(program)
        .args(args)
        .stdout(Stdio::from(stdout))
        .status()
        .map_err(|source| ManifestError::Spawn {
            program: program.into(),
            source,
        })?;

    if !status.success() {
        return Err(ManifestError::CommandFailed {
            program: program.into(),
            status,
        });
    }

    load_from_file(tmp.path())
}
