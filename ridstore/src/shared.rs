//! Mutex-guarded store for split capture / display threads.
//!
//! On a receiver the beacon callback and the screen refresh usually run in
//! different execution contexts. [`SharedStore`] serializes every operation
//! on one mutex so an ingest can never interleave with a ranking scan or an
//! export.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::entry::Entry;
use crate::error::Result;
use crate::policy::{CapacityPolicy, TargetPolicy};
use crate::store::Store;

/// Cloneable handle to a store behind a mutex.
///
/// Clones share the same store.
#[derive(Debug)]
pub struct SharedStore<P = TargetPolicy> {
    inner: Arc<Mutex<Store<P>>>,
}

impl<P> Clone for SharedStore<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: CapacityPolicy> SharedStore<P> {
    /// Wraps `store` for shared access.
    pub fn new(store: Store<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Records one beacon. See [`Store::ingest`].
    pub fn ingest(&self, identifier: &str, entry: Entry) {
        self.lock().ingest(identifier, entry);
    }

    /// Runs `f` with exclusive access to the store.
    ///
    /// Use this to combine several queries under one lock, so the results
    /// describe a single consistent snapshot.
    pub fn with<R>(&self, f: impl FnOnce(&mut Store<P>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Owned copy of the ranking. See [`Store::ranked_identifiers`].
    pub fn ranked_identifiers(&self) -> Vec<(i32, String)> {
        self.lock()
            .ranked_identifiers()
            .into_iter()
            .map(|ranked| (ranked.signal_strength, ranked.identifier.to_owned()))
            .collect()
    }

    /// Owned copy of the freshness list. See [`Store::active_since`].
    pub fn active_since(&self, now: i64, window_secs: i64) -> Vec<String> {
        self.lock()
            .active_since(now, window_secs)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Owned copy of a source's entries. See [`Store::entries_for`].
    pub fn entries_for(&self, identifier: &str, max_count: usize) -> Vec<Entry> {
        self.lock().entries_for(identifier, max_count).collect_all()
    }

    /// Newest entry for `identifier`. See [`Store::latest_entry`].
    pub fn latest_entry(&self, identifier: &str) -> Option<Entry> {
        self.lock().latest_entry(identifier).cloned()
    }

    /// Streams the strongest source. See [`Store::export_top_signal`].
    ///
    /// The lock is held while writing, so a slow sink delays ingest.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`](crate::error::ExportError) if writing fails.
    pub fn export_top_signal<W: Write>(&self, count: usize, max_entries: usize, sink: W) -> Result<()> {
        self.lock().export_top_signal(count, max_entries, sink)
    }

    /// Streams a source by registration. See [`Store::export_by_registration`].
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`](crate::error::ExportError) if writing fails.
    pub fn export_by_registration<W: Write>(
        &self,
        registration: &str,
        max_entries: usize,
        sink: W,
    ) -> Result<()> {
        self.lock().export_by_registration(registration, max_entries, sink)
    }

    /// Removes one source. See [`Store::clear`].
    pub fn clear(&self, identifier: &str) -> bool {
        self.lock().clear(identifier)
    }

    /// Removes every source. See [`Store::clear_all`].
    pub fn clear_all(&self) {
        self.lock().clear_all();
    }

    fn lock(&self) -> MutexGuard<'_, Store<P>> {
        // Every store mutation completes before returning, so a panic in
        // another holder cannot leave a half-applied update behind.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::tests::sample_entry;
    use std::thread;

    #[test]
    fn test_concurrent_ingest_and_query() {
        let shared = SharedStore::new(Store::new(TargetPolicy::new("target", 500, 2).unwrap()));

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for ts in 0..400 {
                    shared.ingest("target", sample_entry(-50, ts));
                    shared.ingest(&format!("other-{}", ts % 7), sample_entry(-60, ts));
                }
            })
        };

        let reader = {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    for (_, id) in shared.ranked_identifiers() {
                        assert!(shared.entries_for(&id, 0).len() <= 500);
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();

        assert_eq!(shared.entries_for("target", 0).len(), 400);
        assert_eq!(shared.with(|store| store.len()), 8);
        assert_eq!(shared.entries_for("other-3", 0).len(), 2);
    }

    #[test]
    fn test_with_gives_consistent_snapshot() {
        let shared = SharedStore::new(Store::with_target("t"));
        shared.ingest("t", sample_entry(-40, 10));
        shared.ingest("u", sample_entry(-70, 10));

        let (top, active) = shared.with(|store| {
            (
                store.identifier_at_rank(0).map(str::to_owned),
                store.active_since(10, 60).len(),
            )
        });
        assert_eq!(top.as_deref(), Some("t"));
        assert_eq!(active, 2);
    }

    #[test]
    fn test_export_and_clear_through_handle() {
        let shared = SharedStore::new(Store::with_target("t"));
        shared.ingest("t", sample_entry(-40, 10));

        let mut sink = Vec::new();
        shared.export_top_signal(1, 0, &mut sink).unwrap();
        assert!(sink.starts_with(b"{\"rid\":\"t\""));

        assert!(shared.clear("t"));
        assert!(shared.latest_entry("t").is_none());

        shared.ingest("t", sample_entry(-40, 11));
        shared.clear_all();
        let mut sink = Vec::new();
        shared.export_by_registration("x", 0, &mut sink).unwrap();
        assert_eq!(sink, b"{}");
    }
}
