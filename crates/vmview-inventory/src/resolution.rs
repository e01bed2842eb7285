//! Outcome of an enrichment lookup

/// Value produced by a soft-failing resolver
///
/// Enrichment lookups never raise. They either resolve to real upstream data or
/// fall back to a sentinel; both are cached alike for the full TTL, so a
/// transient failure sticks until the entry expires. Load-bearing failures are
/// `Err(InventoryError)` instead and never reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Upstream supplied the value
    Resolved(T),
    /// Upstream was unavailable or incomplete; the value is a sentinel/default
    Fallback(T),
}

impl<T> Resolution<T> {
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Resolution::Resolved(v) | Resolution::Fallback(v) => v,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Resolution::Resolved(v) | Resolution::Fallback(v) => v,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}
