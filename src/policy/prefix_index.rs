//! Per-decision set of URI prefixes.

use std::collections::HashSet;

/// URI prefixes seen so far within one admission decision.
///
/// Borrows the prefixes from the decoded routes, so building one costs no
/// string copies. Comparison is byte-exact and case-sensitive.
#[derive(Debug, Default)]
pub struct PrefixIndex<'a> {
    seen: HashSet<&'a str>,
}

impl<'a> PrefixIndex<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `prefix` has been inserted.
    pub fn contains(&self, prefix: &str) -> bool {
        self.seen.contains(prefix)
    }

    /// Record `prefix`. Returns false if it was already present.
    pub fn insert(&mut self, prefix: &'a str) -> bool {
        self.seen.insert(prefix)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
