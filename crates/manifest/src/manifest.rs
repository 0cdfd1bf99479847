//! Manifest data model.
//!
//! Static data describing the functions a deployment exposes. The shape is
//! fixed by the deployment tooling; this module only mirrors it.

use serde::{Deserialize, Serialize};

/// The kind of a server function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Query,
    Mutation,
    Action,
}

/// One exported server function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// `module:export` path, as used by `FunctionRef`.
    pub path: String,
    pub kind: FunctionKind,
    /// Visibility tag, absent for internal functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

/// The full function manifest of a deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub functions: Vec<FunctionSpec>,
}

impl Manifest {
    /// Returns the spec for `path` if the manifest contains it.
    pub fn function(&self, path: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.path == path)
    }

    /// Returns an iterator over the query functions only.
    pub fn queries(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions
            .iter()
            .filter(|f| f.kind == FunctionKind::Query)
    }
}
