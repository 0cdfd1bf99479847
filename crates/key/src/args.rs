//! Query argument type with an explicit skip sentinel.

use liveq_core::ValueObject;

/// The arguments of a query request.
///
/// `Skip` is a dedicated variant rather than a magic argument value, so it
/// can never collide with a legitimate mapping. Callers that receive `None`
/// from [`derive_key`](crate::derive_key) must not probe or subscribe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryArgs {
    /// A real argument mapping.
    Object(ValueObject),
    /// Do not load this query.
    Skip,
}

impl QueryArgs {
    /// Returns true if this is the skip sentinel.
    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, QueryArgs::Skip)
    }

    /// Returns the argument mapping, None for `Skip`.
    pub fn object(&self) -> Option<&ValueObject> {
        match self {
            QueryArgs::Object(obj) => Some(obj),
            QueryArgs::Skip => None,
        }
    }
}

impl From<ValueObject> for QueryArgs {
    fn from(obj: ValueObject) -> Self {
        QueryArgs::Object(obj)
    }
}

impl Default for QueryArgs {
    fn default() -> Self {
        QueryArgs::Object(ValueObject::new())
    }
}
