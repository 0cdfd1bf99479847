//! Error types for manifest retrieval.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors from loading a function manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run introspection command `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("introspection command `{program}` exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },

    #[error("manifest is not valid JSON")]
    Parse(#[from] serde_json::Error),

    #[error("failed to create temporary file")]
    TempFile(#[source] std::io::Error),
}
