//! Liveq Key - Query key derivation.
//!
//! This crate turns a query identity (function reference + argument mapping)
//! into a stable, order-insensitive, collision-resistant string key used for
//! subscription deduplication.
//!
//! # Core Concepts
//!
//! - `QueryArgs`: an argument mapping, or the explicit `Skip` sentinel that
//!   signals "do not load this query"
//! - `QueryKey`: the derived deduplication key
//! - `derive_key()`: total derivation; `None` means "do not cache or
//!   subscribe this request"
//!
//! # Example
//!
//! ```rust
//! use liveq_core::{FunctionRef, Value, ValueObject};
//! use liveq_key::{derive_key, QueryArgs};
//!
//! let fun = FunctionRef::new("messages:list");
//! let mut args = ValueObject::new();
//! args.insert("channel".into(), Value::from("general"));
//!
//! let key = derive_key(&fun, &QueryArgs::from(args)).unwrap();
//! assert_eq!(key.as_str(), r#"messages:list({"channel":"general"})"#);
//!
//! assert!(derive_key(&fun, &QueryArgs::Skip).is_none());
//! ```

#![no_std]

extern crate alloc;

mod args;
mod canonical;
mod derive;

pub use args::QueryArgs;
pub use derive::{derive_key, QueryKey};
