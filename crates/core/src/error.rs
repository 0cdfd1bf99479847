//! Error-as-value types for result delivery.
//!
//! Failures reported by the transport or the server are *values*, not
//! propagated faults: they flow through the same notify channel as
//! successful results so callers have one failure channel, not two.

use alloc::string::String;
use core::fmt;

/// A failure reported for a query, delivered through the notify channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryError {
    message: String,
}

impl QueryError {
    /// Creates a query error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query failed: {}", self.message)
    }
}

/// The single value-or-error channel for query result delivery.
pub type QueryResult = core::result::Result<crate::Value, QueryError>;
