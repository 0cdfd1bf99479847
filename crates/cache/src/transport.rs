//! Transport contract.
//!
//! The transport is the external mechanism that actually talks to the
//! server: it opens a reactive subscription for a query identity and pushes
//! a new value (or a failure) whenever the server-side result changes. The
//! cache consumes it exclusively through this trait.

use alloc::boxed::Box;
use liveq_core::{FunctionRef, QueryResult, ValueObject};

/// Handle for one open transport subscription.
pub type TransportSubId = u64;

/// Callback invoked by the transport on every pushed value or failure.
pub type UpdateCallback = Box<dyn Fn(QueryResult)>;

/// The reactive subscription mechanism consumed by the cache.
pub trait Transport {
    /// Opens a subscription for `(fun, args)` and returns its handle.
    ///
    /// `open` must not fail synchronously: a transport that cannot establish
    /// the subscription reports the failure as a `QueryError` through
    /// `on_update`, keeping one failure channel for callers. `on_update` may
    /// be invoked synchronously from inside `open` when an initial value is
    /// already known.
    fn open(&self, fun: &FunctionRef, args: &ValueObject, on_update: UpdateCallback)
        -> TransportSubId;

    /// Closes a subscription. Closing an already-closed or otherwise defunct
    /// subscription must be a no-op.
    fn close(&self, sub: TransportSubId);
}
