//! Query key derivation.

use crate::args::QueryArgs;
use crate::canonical;
use alloc::string::String;
use core::fmt;
use liveq_core::FunctionRef;

/// A deterministic string key identifying one logical query.
///
/// Keys are only produced by [`derive_key`]; two keys are equal iff their
/// query identities are equivalent (same function reference, deeply equal
/// argument mappings irrespective of insertion order).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// Returns the key text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the deduplication key for a query identity.
///
/// Returns `None` for the `Skip` sentinel and for argument mappings that
/// contain a value outside the encodable domain (a non-finite float).
/// `None` means "do not cache or subscribe this request". Derivation never
/// fails in any other way.
pub fn derive_key(fun: &FunctionRef, args: &QueryArgs) -> Option<QueryKey> {
    let obj = match args {
        QueryArgs::Object(obj) => obj,
        QueryArgs::Skip => return None,
    };

    let mut out = String::with_capacity(fun.as_str().len() + 16 * obj.len() + 4);
    out.push_str(fun.as_str());
    out.push('(');
    if !canonical::write_object(&mut out, obj) {
        return None;
    }
    out.push(')');
    Some(QueryKey(out))
}
