//! Liveq Cache - Subscription deduplication and lifecycle registry.
//!
//! This crate implements the query cache that lets many independent UI
//! components depend on the same live query result without redundant
//! subscriptions. For each distinct query key the cache opens exactly one
//! transport subscription, fans every pushed value out to all attached
//! listeners, and closes the subscription when the last listener detaches.
//!
//! # Core Concepts
//!
//! - `Transport`: the external reactive subscription mechanism, consumed
//!   through `open`/`close`
//! - `ListenerId`: an opaque handle representing one attachment of interest
//! - `QueryCache`: the registry exposing `probe`, `start`, and `end`
//!
//! # Example
//!
//! ```ignore
//! use liveq_cache::QueryCache;
//! use liveq_key::{derive_key, QueryArgs};
//!
//! let cache = QueryCache::new(transport);
//!
//! let key = derive_key(&fun, &args).expect("skipped queries are never started");
//! let listener = cache.listener_id();
//!
//! // Paint an initial state if a live entry already has a value.
//! let initial = cache.probe(&key);
//!
//! cache.start(listener, key, &fun, args.object().unwrap(), move |result| {
//!     // re-render with the new value or error
//! });
//!
//! // ... later, when the component unmounts:
//! cache.end(listener);
//! ```

#![no_std]

extern crate alloc;

mod cache;
mod transport;

pub use cache::{ListenerId, QueryCache};
pub use transport::{Transport, TransportSubId, UpdateCallback};
