//! Store module for the ridstore beacon buffer.
//!
//! This module provides the top-level container that ties sources, capacity
//! policy and ingest together. Query and export operations live in
//! [`query`](crate::query) and [`export`](crate::export) as further `impl`
//! blocks on [`Store`].
//!
//! # Design
//!
//! The Store acts as the central coordinator:
//! - Maps each source identifier to its own [`SourceBuffer`]
//! - Creates buffers lazily on first ingest, sized by the injected
//!   [`CapacityPolicy`]
//! - Never expires a source on its own; a buffer disappears only through
//!   [`Store::clear`] or [`Store::clear_all`]
//!
//! Sources are kept in a `BTreeMap`, so every "first match" scan walks
//! identifiers in ascending key order.
//!
//! # Memory Bound
//!
//! With a [`TargetPolicy`], total retained entries never exceed
//! `target_capacity + other_capacity * (distinct_sources - 1)`.
//!
//! # Example Usage
//!
//! ```rust
//! use ridstore::{Entry, Store};
//!
//! let mut store = Store::with_target("1581F5FJD228700A");
//!
//! store.ingest("1581F5FJD228700A", Entry {
//!     signal_strength: -48,
//!     observed_at: 1_700_000_000,
//!     source_clock: 123_456_789,
//!     channel: 6,
//!     registration: "JA-0001".to_string(),
//!     latitude: 35.6812,
//!     longitude: 139.7671,
//!     pressure_altitude: 120.0,
//!     gps_altitude: 118.5,
//! });
//!
//! assert!(store.contains("1581F5FJD228700A"));
//! assert_eq!(store.identifier_at_rank(0), Some("1581F5FJD228700A"));
//! ```

use std::collections::BTreeMap;

use crate::entry::Entry;
use crate::policy::{CapacityPolicy, TargetPolicy};
use crate::source::SourceBuffer;

/// Keyed collection of per-source beacon buffers.
///
/// # Thread Safety
///
/// The Store is designed for single-threaded access: ingest and clear take
/// `&mut self`. Use [`SharedStore`](crate::shared::SharedStore) when capture
/// and display run on different threads.
#[derive(Debug, Clone)]
pub struct Store<P = TargetPolicy> {
    /// Source buffers keyed by identifier.
    pub(crate) sources: BTreeMap<String, SourceBuffer>,
    /// Capacity policy consulted when a buffer is created.
    policy: P,
}

impl Store<TargetPolicy> {
    /// Creates a store whose target identifier keeps
    /// [`DEFAULT_TARGET_CAPACITY`](crate::policy::DEFAULT_TARGET_CAPACITY)
    /// entries and every other source
    /// [`DEFAULT_OTHER_CAPACITY`](crate::policy::DEFAULT_OTHER_CAPACITY).
    pub fn with_target(target_identifier: impl Into<String>) -> Self {
        Self::new(TargetPolicy::with_defaults(target_identifier))
    }
}

impl<P: CapacityPolicy> Store<P> {
    /// Creates an empty store using `policy` to size new source buffers.
    pub fn new(policy: P) -> Self {
        Self {
            sources: BTreeMap::new(),
            policy,
        }
    }

    /// Returns the capacity policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the identifier granted elevated capacity, if the policy has one.
    pub fn target_identifier(&self) -> Option<&str> {
        self.policy.target_identifier()
    }

    /// Records one decoded beacon for `identifier`.
    ///
    /// Creates the source's buffer on first sight, with the capacity the
    /// policy assigns to it, then appends the entry, evicting that source's
    /// oldest entry if its buffer is full. Ingest never fails.
    pub fn ingest(&mut self, identifier: &str, entry: Entry) {
        // Look up by &str first so the common path does not allocate a key.
        if let Some(source) = self.sources.get_mut(identifier) {
            if let Some(evicted) = source.push(entry) {
                tracing::trace!(identifier, evicted_at = evicted.observed_at, "evicted oldest entry");
            }
            return;
        }

        let capacity = self.policy.capacity_for(identifier);
        tracing::debug!(identifier, capacity = capacity.get(), "new source");

        let mut source = SourceBuffer::new(capacity);
        source.push(entry);
        self.sources.insert(identifier.to_owned(), source);
    }

    /// Returns the buffer for `identifier`, if one exists.
    pub fn source(&self, identifier: &str) -> Option<&SourceBuffer> {
        self.sources.get(identifier)
    }

    /// Iterates over all sources in ascending identifier order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &SourceBuffer)> {
        self.sources.iter().map(|(id, source)| (id.as_str(), source))
    }

    /// Returns whether a buffer exists for `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.sources.contains_key(identifier)
    }

    /// Returns the number of known sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns whether no source has been seen since creation or the last
    /// [`clear_all`](Self::clear_all).
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the total number of entries held across all sources.
    pub fn total_entries(&self) -> usize {
        self.sources.values().map(SourceBuffer::len).sum()
    }

    /// Removes every source.
    pub fn clear_all(&mut self) {
        let removed = self.sources.len();
        self.sources.clear();
        tracing::debug!(removed, "cleared all sources");
    }

    /// Removes `identifier`'s buffer entirely.
    ///
    /// A later ingest for the same identifier starts a fresh buffer sized by
    /// the policy again. Returns whether a buffer was removed.
    pub fn clear(&mut self, identifier: &str) -> bool {
        let removed = self.sources.remove(identifier).is_some();
        if removed {
            tracing::debug!(identifier, "cleared source");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::tests::sample_entry;
    use std::num::NonZeroUsize;

    fn small_store() -> Store {
        Store::new(TargetPolicy::new("target", 5, 2).unwrap())
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = small_store();

        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.total_entries(), 0);
        assert_eq!(store.target_identifier(), Some("target"));
    }

    #[test]
    fn test_ingest_creates_source_lazily() {
        let mut store = small_store();

        assert!(!store.contains("a"));
        store.ingest("a", sample_entry(-50, 1));

        assert!(store.contains("a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.source("a").map(SourceBuffer::len), Some(1));
    }

    #[test]
    fn test_capacity_chosen_by_policy() {
        let mut store = small_store();

        for ts in 0..20 {
            store.ingest("target", sample_entry(-50, ts));
            store.ingest("other", sample_entry(-60, ts));
        }

        let target = store.source("target").unwrap();
        let other = store.source("other").unwrap();
        assert_eq!(target.capacity().get(), 5);
        assert_eq!(target.len(), 5);
        assert_eq!(other.capacity().get(), 2);
        assert_eq!(other.len(), 2);
        assert_eq!(store.total_entries(), 7);
    }

    #[test]
    fn test_clear_single_source() {
        let mut store = small_store();
        store.ingest("a", sample_entry(-50, 1));
        store.ingest("b", sample_entry(-50, 1));

        assert!(store.clear("a"));
        assert!(!store.clear("a"));
        assert!(!store.contains("a"));
        assert!(store.contains("b"));
    }

    #[test]
    fn test_clear_all() {
        let mut store = small_store();
        store.ingest("a", sample_entry(-50, 1));
        store.ingest("target", sample_entry(-50, 1));

        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.total_entries(), 0);
    }

    #[test]
    fn test_sources_iterate_in_key_order() {
        let mut store = small_store();
        store.ingest("charlie", sample_entry(-50, 1));
        store.ingest("alpha", sample_entry(-50, 1));
        store.ingest("bravo", sample_entry(-50, 1));

        let ids: Vec<_> = store.sources().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_custom_policy_closure() {
        let mut store = Store::new(|id: &str| {
            if id.starts_with("long") {
                NonZeroUsize::new(4).unwrap_or(NonZeroUsize::MIN)
            } else {
                NonZeroUsize::MIN
            }
        });

        for ts in 0..10 {
            store.ingest("long-1", sample_entry(-50, ts));
            store.ingest("short", sample_entry(-50, ts));
        }

        assert_eq!(store.source("long-1").map(SourceBuffer::len), Some(4));
        assert_eq!(store.source("short").map(SourceBuffer::len), Some(1));
        assert_eq!(store.target_identifier(), None);
    }
}
