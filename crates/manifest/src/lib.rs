//! Liveq Manifest - Function manifest retrieval.
//!
//! A deployment exposes a static manifest describing its server query
//! functions. This crate reads that manifest either from a local file or by
//! running the deployment-introspection command and capturing its standard
//! output through a temporary file. Pure glue: no registry invariants live
//! here, and failures are ordinary `Result`s.

mod error;
mod fetch;
mod manifest;

pub use error::ManifestError;
pub use fetch::{load, load_from_command, load_from_file, ManifestSource};
pub use manifest::{FunctionKind, FunctionSpec, Manifest};
