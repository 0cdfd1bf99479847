//! Function references.
//!
//! A `FunctionRef` is a stable identifier for a server query function,
//! conventionally a `module:export` path such as `messages:list`.

use alloc::string::String;
use core::fmt;

/// A stable identifier for a server query function.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionRef(String);

impl FunctionRef {
    /// Creates a function reference from a `module:export` style path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the full path.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the module portion of the path.
    ///
    /// A path without a `:` separator is all module.
    pub fn module(&self) -> &str {
        match self.0.rfind(':') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Returns the exported function name, or `"default"` if the path has
    /// no `:` separator.
    pub fn name(&self) -> &str {
        match self.0.rfind(':') {
            Some(idx) => &self.0[idx + 1..],
            None => "default",
        }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FunctionRef {
    fn from(path: String) -> Self {
        Self(path)
    }
}
