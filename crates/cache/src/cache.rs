//! Query cache implementation.
//!
//! The cache maps each query key to a single `CacheEntry` holding the one
//! transport subscription for that key, the latest observed value or error,
//! and the attached listeners. Entries are created by the first `start` for
//! a key and destroyed by the `end` that removes the last listener; the
//! entry's lifetime is driven purely by the listener count.
//!
//! All state lives behind one `RefCell` owned by the cache's single logical
//! control thread. Every borrow is released before any listener or
//! transport callback is invoked, so callbacks may re-enter `probe`,
//! `start`, and `end` freely.

use crate::transport::{Transport, TransportSubId};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;
use liveq_core::{FunctionRef, QueryResult, ValueObject};
use liveq_key::QueryKey;

/// Opaque handle representing one attachment of interest in a query key.
///
/// Minted by [`QueryCache::listener_id`], unique for the lifetime of the
/// cache, owned by the caller and passed back unchanged to
/// [`QueryCache::end`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked with the latest value or error for a key.
type NotifyFn = Rc<dyn Fn(&QueryResult)>;

/// Per-key bookkeeping record.
struct CacheEntry {
    /// The one transport subscription for this key. None only during the
    /// `open` window of the creating `start` call.
    sub: Option<TransportSubId>,
    /// Latest observed value or error, None until the first push.
    latest: Option<QueryResult>,
    /// Attached listeners, in attachment order.
    listeners: Vec<(ListenerId, NotifyFn)>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            sub: None,
            latest: None,
            listeners: Vec::new(),
        }
    }
}

struct CacheInner {
    /// Live entries, one per key with a non-empty listener set.
    entries: HashMap<QueryKey, CacheEntry>,
    /// Reverse map so `end` can find the key from the handle alone.
    attachments: HashMap<ListenerId, QueryKey>,
    /// Next listener id to assign.
    next_listener: u64,
}

/// Reference-counted subscription registry.
///
/// An explicitly constructed service object: create one per transport
/// connection and pass it by reference (or clone the handle) to whatever
/// owns the UI-binding lifecycle. Clones share the same registry.
#[derive(Clone)]
pub struct QueryCache {
    inner: Rc<RefCell<CacheInner>>,
    transport: Rc<dyn Transport>,
}

impl QueryCache {
    /// Creates a cache over the given transport.
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                entries: HashMap::new(),
                attachments: HashMap::new(),
                next_listener: 1,
            })),
            transport,
        }
    }

    /// Mints a fresh listener handle, unique for this cache's lifetime.
    pub fn listener_id(&self) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener;
        inner.next_listener += 1;
        ListenerId(id)
    }

    /// Synchronous best-effort read of the latest value or error for `key`.
    ///
    /// Returns None when no entry exists or no value has arrived yet. Never
    /// blocks, never touches the transport, has no side effects.
    pub fn probe(&self, key: &QueryKey) -> Option<QueryResult> {
        self.inner
            .borrow()
            .entries
            .get(key)
            .and_then(|entry| entry.latest.clone())
    }

    /// Attaches `listener` to `key`, lazily opening the transport
    /// subscription.
    ///
    /// The first `start` for a key creates its entry and opens the one
    /// underlying subscription; later `start`s for the same key only attach.
    /// If the entry already holds a value or error, the new listener is
    /// notified with it synchronously before `start` returns, so its state
    /// converges without a transport round-trip.
    ///
    /// A listener that is already attached somewhere is ignored, mirroring
    /// the defensive treatment of detach races in [`end`](Self::end).
    /// Failure to establish the subscription is not reported here: the
    /// transport delivers it as an error value through `notify`.
    pub fn start<F>(
        &self,
        listener: ListenerId,
        key: QueryKey,
        fun: &FunctionRef,
        args: &ValueObject,
        notify: F,
    ) where
        F: Fn(&QueryResult) + 'static,
    {
        let notify: NotifyFn = Rc::new(notify);

        let replay = {
            let mut inner = self.inner.borrow_mut();
            if inner.attachments.contains_key(&listener) {
                return;
            }
            inner.attachments.insert(listener, key.clone());
            match inner.entries.get_mut(&key) {
                Some(entry) => {
                    entry.listeners.push((listener, notify.clone()));
                    Some(entry.latest.clone())
                }
                None => {
                    let mut entry = CacheEntry::new();
                    entry.listeners.push((listener, notify.clone()));
                    inner.entries.insert(key.clone(), entry);
                    None
                }
            }
        };

        match replay {
            Some(latest) => {
                // Entry pre-existed: converge the late attacher on the
                // cached value, if any. No transport call is made.
                if let Some(result) = latest {
                    notify(&result);
                }
            }
            None => {
                // Entry was just created: open the one subscription for
                // this key. The push callback holds only a weak reference,
                // so the transport never keeps a dropped cache alive.
                let weak = Rc::downgrade(&self.inner);
                let push_key = key.clone();
                let sub = self.transport.open(
                    fun,
                    args,
                    Box::new(move |result| Self::apply_push(&weak, &push_key, result)),
                );

                // A synchronous push inside `open` may have re-entered `end`
                // and torn the entry down already; close the orphaned
                // subscription instead of recording it.
                let mut inner = self.inner.borrow_mut();
                match inner.entries.get_mut(&key) {
                    Some(entry) => entry.sub = Some(sub),
                    None => {
                        drop(inner);
                        self.transport.close(sub);
                    }
                }
            }
        }
    }

    /// Detaches `listener` from whichever key it is attached to.
    ///
    /// Removing the last listener for a key synchronously closes the
    /// transport subscription and discards the entry. Unknown and
    /// already-detached handles are no-ops: detach races are expected under
    /// UI mount/unmount churn and are never faults.
    pub fn end(&self, listener: ListenerId) {
        let closed = {
            let mut inner = self.inner.borrow_mut();
            let key = match inner.attachments.remove(&listener) {
                Some(key) => key,
                None => return,
            };
            let emptied = match inner.entries.get_mut(&key) {
                Some(entry) => {
                    entry.listeners.retain(|(id, _)| *id != listener);
                    entry.listeners.is_empty()
                }
                None => false,
            };
            if emptied {
                inner.entries.remove(&key).and_then(|entry| entry.sub)
            } else {
                None
            }
        };

        if let Some(sub) = closed {
            self.transport.close(sub);
        }
    }

    /// Returns the number of live entries.
    pub fn entry_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns the number of listeners attached to `key`.
    pub fn listener_count(&self, key: &QueryKey) -> usize {
        self.inner
            .borrow()
            .entries
            .get(key)
            .map(|entry| entry.listeners.len())
            .unwrap_or(0)
    }

    /// Returns true if a live entry exists for `key`.
    pub fn has_entry(&self, key: &QueryKey) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// Returns true if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Applies one transport push: updates the cached value, then fans it
    /// out to every currently attached listener in attachment order.
    ///
    /// Pushes arriving for a torn-down entry (a close raced with an
    /// in-flight update) are dropped. The borrow is released before any
    /// callback runs.
    fn apply_push(weak: &Weak<RefCell<CacheInner>>, key: &QueryKey, result: QueryResult) {
        let cell = match weak.upgrade() {
            Some(cell) => cell,
            None => return,
        };

        let notifies: Vec<NotifyFn> = {
            let mut inner = cell.borrow_mut();
            let entry = match inner.entries.get_mut(key) {
                Some(entry) => entry,
                None => return,
            };
            entry.latest = Some(result.clone());
            entry.listeners.iter().map(|(_, n)| n.clone()).collect()
        };

        for notify in &notifies {
            notify(&result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::{Cell, RefCell};
    use liveq_core::{QueryError, Value};
    use liveq_key::{derive_key, QueryArgs};

    /// Transport double that records opens/closes and lets tests drive
    /// pushes through the retained callbacks.
    struct FakeTransport {
        next_sub: Cell<TransportSubId>,
        opens: Cell<usize>,
        closes: RefCell<Vec<TransportSubId>>,
        callbacks: RefCell<HashMap<TransportSubId, Rc<dyn Fn(QueryResult)>>>,
        /// When set, `open` pushes this value synchronously before returning.
        immediate: RefCell<Option<QueryResult>>,
    }

    impl FakeTransport {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                next_sub: Cell::new(1),
                opens: Cell::new(0),
                closes: RefCell::new(Vec::new()),
                callbacks: RefCell::new(HashMap::new()),
                immediate: RefCell::new(None),
            })
        }

        fn with_immediate(result: QueryResult) -> Rc<Self> {
            let t = Self::new();
            *t.immediate.borrow_mut() = Some(result);
            t
        }

        fn push(&self, sub: TransportSubId, result: QueryResult) {
            let callback = self.callbacks.borrow().get(&sub).cloned();
            if let Some(callback) = callback {
                callback(result);
            }
        }

        fn open_count(&self) -> usize {
            self.opens.get()
        }

        fn close_count(&self) -> usize {
            self.closes.borrow().len()
        }
    }

    impl Transport for FakeTransport {
        fn open(
            &self,
            _fun: &FunctionRef,
            _args: &ValueObject,
            on_update: crate::UpdateCallback,
        ) -> TransportSubId {
            let sub = self.next_sub.get();
            self.next_sub.set(sub + 1);
            self.opens.set(self.opens.get() + 1);
            let on_update: Rc<dyn Fn(QueryResult)> = Rc::from(on_update);
            self.callbacks.borrow_mut().insert(sub, on_update.clone());

            let immediate = self.immediate.borrow().clone();
            if let Some(result) = immediate {
                on_update(result);
            }
            sub
        }

        fn close(&self, sub: TransportSubId) {
            self.closes.borrow_mut().push(sub);
            self.callbacks.borrow_mut().remove(&sub);
        }
    }

    fn message_key() -> (FunctionRef, ValueObject, QueryKey) {
        let fun = FunctionRef::new("messages:list");
        let mut args = ValueObject::new();
        args.insert("channel".into(), Value::from("general"));
        let key = derive_key(&fun, &QueryArgs::Object(args.clone())).unwrap();
        (fun, args, key)
    }

    fn value(s: &str) -> QueryResult {
        Ok(Value::Array(vec![Value::from(s)]))
    }

    #[test]
    fn test_probe_absent_no_side_effect() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (_, _, key) = message_key();

        assert_eq!(cache.probe(&key), None);
        assert_eq!(transport.open_count(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_start_opens_exactly_once() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let a = cache.listener_id();
        let b = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, |_| {});
        cache.start(b, key.clone(), &fun, &args, |_| {});

        assert_eq!(transport.open_count(), 1);
        assert_eq!(cache.entry_count(), 1);
        assert_eq!(cache.listener_count(&key), 2);
    }

    #[test]
    fn test_push_updates_cache_and_fans_out() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_a = seen.clone();
        let seen_b = seen.clone();

        let a = cache.listener_id();
        let b = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, move |r| {
            seen_a.borrow_mut().push(("a", r.clone()));
        });
        cache.start(b, key.clone(), &fun, &args, move |r| {
            seen_b.borrow_mut().push(("b", r.clone()));
        });

        transport.push(1, value("hello"));

        assert_eq!(cache.probe(&key), Some(value("hello")));
        // Fan-out reaches every listener, in attachment order.
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("a", value("hello")));
        assert_eq!(seen[1], ("b", value("hello")));
    }

    #[test]
    fn test_late_attach_replays_without_reopen() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, |_| {});
        transport.push(1, value("hello"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_b = seen.clone();
        let b = cache.listener_id();
        cache.start(b, key.clone(), &fun, &args, move |r| {
            seen_b.borrow_mut().push(r.clone());
        });

        // The late attacher observed the cached value synchronously and no
        // second subscription was opened.
        assert_eq!(&*seen.borrow(), &[value("hello")]);
        assert_eq!(transport.open_count(), 1);
    }

    #[test]
    fn test_reference_count_lifecycle() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let handles: Vec<ListenerId> = (0..3).map(|_| cache.listener_id()).collect();
        for &h in &handles {
            cache.start(h, key.clone(), &fun, &args, |_| {});
        }

        cache.end(handles[0]);
        cache.end(handles[1]);
        assert_eq!(transport.close_count(), 0);
        assert!(cache.has_entry(&key));

        cache.end(handles[2]);
        assert_eq!(transport.close_count(), 1);
        assert!(!cache.has_entry(&key));
        assert_eq!(cache.probe(&key), None);
    }

    #[test]
    fn test_end_is_idempotent() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let a = cache.listener_id();
        let b = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, |_| {});
        cache.start(b, key.clone(), &fun, &args, |_| {});

        cache.end(a);
        cache.end(a); // double detach
        cache.end(ListenerId(999)); // never attached

        // B's subscription is unaffected.
        assert_eq!(transport.close_count(), 0);
        assert_eq!(cache.listener_count(&key), 1);

        cache.end(b);
        assert_eq!(transport.close_count(), 1);
    }

    #[test]
    fn test_teardown_then_recreate_reopens() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, |_| {});
        cache.end(a);

        let b = cache.listener_id();
        cache.start(b, key.clone(), &fun, &args, |_| {});

        assert_eq!(transport.open_count(), 2);
        assert_eq!(transport.close_count(), 1);
        // The recreated entry has no value until the transport pushes again.
        assert_eq!(cache.probe(&key), None);
    }

    #[test]
    fn test_error_flows_through_notify_channel() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_a = seen.clone();
        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, move |r| {
            seen_a.borrow_mut().push(r.clone());
        });

        let err: QueryResult = Err(QueryError::new("permission denied"));
        transport.push(1, err.clone());

        assert_eq!(&*seen.borrow(), &[err.clone()]);
        assert_eq!(cache.probe(&key), Some(err));
    }

    #[test]
    fn test_stale_push_after_teardown_is_dropped() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let notified = Rc::new(Cell::new(0));
        let notified_a = notified.clone();
        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, move |_| {
            notified_a.set(notified_a.get() + 1);
        });

        // Retain the callback past the close so the stale push can be
        // simulated.
        let stale = transport.callbacks.borrow().get(&1).cloned().unwrap();
        cache.end(a);

        stale(value("late"));
        assert_eq!(notified.get(), 0);
        assert_eq!(cache.probe(&key), None);
    }

    #[test]
    fn test_immediate_push_inside_open() {
        let transport = FakeTransport::with_immediate(value("warm"));
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_a = seen.clone();
        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, move |r| {
            seen_a.borrow_mut().push(r.clone());
        });

        assert_eq!(&*seen.borrow(), &[value("warm")]);
        assert_eq!(cache.probe(&key), Some(value("warm")));
    }

    #[test]
    fn test_notify_may_reenter_end() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let a = cache.listener_id();
        let b = cache.listener_id();

        // A's notify detaches B on the first push.
        let cache_handle = cache.clone();
        cache.start(a, key.clone(), &fun, &args, move |_| {
            cache_handle.end(b);
        });
        cache.start(b, key.clone(), &fun, &args, |_| {});
        assert_eq!(cache.listener_count(&key), 2);

        transport.push(1, value("hello"));

        assert_eq!(cache.listener_count(&key), 1);
        // A is still attached, so the subscription stays open.
        assert_eq!(transport.close_count(), 0);
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let fun = FunctionRef::new("messages:list");

        let mut general = ValueObject::new();
        general.insert("channel".into(), Value::from("general"));
        let mut random = ValueObject::new();
        random.insert("channel".into(), Value::from("random"));

        let key_g = derive_key(&fun, &QueryArgs::Object(general.clone())).unwrap();
        let key_r = derive_key(&fun, &QueryArgs::Object(random.clone())).unwrap();
        assert_ne!(key_g, key_r);

        let a = cache.listener_id();
        let b = cache.listener_id();
        cache.start(a, key_g.clone(), &fun, &general, |_| {});
        cache.start(b, key_r.clone(), &fun, &random, |_| {});
        assert_eq!(transport.open_count(), 2);

        cache.end(a);
        assert_eq!(&*transport.closes.borrow(), &[1]);
        assert!(cache.has_entry(&key_r));
    }

    #[test]
    fn test_listener_ids_unique() {
        let cache = QueryCache::new(FakeTransport::new());
        let a = cache.listener_id();
        let b = cache.listener_id();
        let c = cache.listener_id();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_start_with_attached_listener_is_noop() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, |_| {});
        cache.start(a, key.clone(), &fun, &args, |_| {});

        assert_eq!(cache.listener_count(&key), 1);
        assert_eq!(transport.open_count(), 1);
    }

    #[test]
    fn test_pushes_preserve_order() {
        let transport = FakeTransport::new();
        let cache = QueryCache::new(transport.clone());
        let (fun, args, key) = message_key();

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_a = seen.clone();
        let a = cache.listener_id();
        cache.start(a, key.clone(), &fun, &args, move |r| {
            if let Ok(Value::Array(items)) = r {
                if let Some(s) = items.first().and_then(Value::as_str) {
                    seen_a.borrow_mut().push(s.into());
                }
            }
        });

        transport.push(1, value("first"));
        transport.push(1, value("second"));
        transport.push(1, value("third"));

        assert_eq!(&*seen.borrow(), &["first", "second", "third"]);
        assert_eq!(cache.probe(&key), Some(value("third")));
    }
}
