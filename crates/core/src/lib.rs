//! Liveq Core - Value domain and function references for liveq.
//!
//! This crate provides the foundational types shared by the key deriver and
//! the subscription cache:
//!
//! - `Value`: the restricted serializable value domain for query arguments
//!   and server-pushed results (primitives, arrays, nested objects)
//! - `ValueObject`: a string-keyed mapping with entries kept sorted by key
//! - `FunctionRef`: a stable identifier for a server query function
//! - `QueryError` / `QueryResult`: the single value-or-error channel used
//!   for all result delivery
//!
//! # Example
//!
//! ```rust
//! use liveq_core::{FunctionRef, Value, ValueObject};
//!
//! let fun = FunctionRef::new("messages:list");
//! assert_eq!(fun.module(), "messages");
//! assert_eq!(fun.name(), "list");
//!
//! let mut args = ValueObject::new();
//! args.insert("channel".into(), Value::from("general"));
//! assert_eq!(args.get("channel").and_then(Value::as_str), Some("general"));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod function;
mod object;
mod value;

pub use error::{QueryError, QueryResult};
pub use function::FunctionRef;
pub use object::ValueObject;
pub use value::{Value, ValueKind};
