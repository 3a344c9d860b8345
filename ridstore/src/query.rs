//! Read-side queries over a [`Store`].
//!
//! This module answers the questions a display loop asks every refresh:
//!
//! - **Freshness** - which sources were heard from in a trailing window
//! - **Ranking** - which sources are strongest right now
//! - **Retrieval** - the history of one source, by identifier or by rank
//!
//! Nothing here mutates the store and nothing fails: an unknown identifier or
//! an out-of-range rank simply yields an empty result.
//!
//! # Ranking Order
//!
//! Sources are ranked by the signal strength of their newest entry,
//! strongest first. Equal strengths are ordered by identifier, ascending, so
//! the ranking is deterministic. The ranking is rebuilt on every call.
//!
//! # Example Usage
//!
//! ```rust
//! # use ridstore::{Entry, Store};
//! # let entry = |rssi, ts| Entry {
//! #     signal_strength: rssi, observed_at: ts, source_clock: 0, channel: 1,
//! #     registration: String::new(), latitude: 0.0, longitude: 0.0,
//! #     pressure_altitude: 0.0, gps_altitude: 0.0,
//! # };
//! let mut store = Store::with_target("near");
//! store.ingest("near", entry(-40, 1_000));
//! store.ingest("far", entry(-85, 1_010));
//!
//! let ranked = store.ranked_identifiers();
//! assert_eq!(ranked[0].identifier, "near");
//!
//! let active = store.active_since(1_050, 60);
//! assert_eq!(active, vec!["far", "near"]);
//!
//! let history = store.entries_for("near", 0).collect_all();
//! assert_eq!(history.len(), 1);
//! ```

use crate::entry::Entry;
use crate::policy::CapacityPolicy;
use crate::ring::RingIter;
use crate::store::Store;

/// Default trailing window, in seconds, for freshness queries.
pub const DEFAULT_ACTIVE_WINDOW_SECS: i64 = 60;

/// One row of the signal-strength ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedSource<'a> {
    /// Signal strength of the source's newest entry.
    pub signal_strength: i32,
    /// The source identifier.
    pub identifier: &'a str,
}

/// Entries of one source, oldest first.
///
/// Borrowed from the store; yields nothing for an unknown identifier.
#[derive(Debug, Clone)]
pub struct SourceEntries<'a> {
    inner: Option<RingIter<'a, Entry>>,
}

impl<'a> SourceEntries<'a> {
    pub(crate) fn new(inner: Option<RingIter<'a, Entry>>) -> Self {
        Self { inner }
    }

    /// An iterator that yields nothing.
    pub(crate) fn empty() -> Self {
        Self { inner: None }
    }

    /// Clones every remaining entry into a vector.
    pub fn collect_all(self) -> Vec<Entry> {
        self.cloned().collect()
    }
}

impl<'a> Iterator for SourceEntries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.as_ref().map_or((0, Some(0)), Iterator::size_hint)
    }
}

impl ExactSizeIterator for SourceEntries<'_> {}

impl<P: CapacityPolicy> Store<P> {
    /// Returns every identifier with at least one entry observed in
    /// `[now - window_secs, now]`, in ascending identifier order.
    ///
    /// Sources whose newest entry is older than the window, or whose oldest
    /// entry is newer than `now` (receiver clock skew), are rejected without
    /// scanning their history.
    pub fn active_since(&self, now: i64, window_secs: i64) -> Vec<&str> {
        let start = now.saturating_sub(window_secs);
        self.sources
            .iter()
            .filter(|(_, source)| source.has_entry_within(start, now))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// [`active_since`](Self::active_since) with the default one-minute window.
    pub fn active_in_last_minute(&self, now: i64) -> Vec<&str> {
        self.active_since(now, DEFAULT_ACTIVE_WINDOW_SECS)
    }

    /// Ranks all non-empty sources by latest signal strength, strongest
    /// first, ties broken by identifier ascending.
    pub fn ranked_identifiers(&self) -> Vec<RankedSource<'_>> {
        let mut ranked: Vec<RankedSource<'_>> = self
            .sources
            .iter()
            .filter(|(_, source)| !source.is_empty())
            .map(|(id, source)| RankedSource {
                signal_strength: source.latest_signal_strength(),
                identifier: id.as_str(),
            })
            .collect();

        ranked.sort_unstable_by(|a, b| {
            b.signal_strength
                .cmp(&a.signal_strength)
                .then_with(|| a.identifier.cmp(b.identifier))
        });
        ranked
    }

    /// Returns `identifier`'s entries, oldest first.
    ///
    /// With `max_count > 0` only the newest `max_count` entries are returned
    /// (still oldest first). Unknown identifiers yield nothing.
    pub fn entries_for(&self, identifier: &str, max_count: usize) -> SourceEntries<'_> {
        SourceEntries::new(self.sources.get(identifier).map(|source| source.recent(max_count)))
    }

    /// Returns all entries of the source at `rank` (0 = strongest).
    pub fn entries_at_rank(&self, rank: usize) -> SourceEntries<'_> {
        match self.identifier_at_rank(rank) {
            Some(identifier) => self.entries_for(identifier, 0),
            None => SourceEntries::empty(),
        }
    }

    /// Returns the identifier at `rank` (0 = strongest), if in range.
    pub fn identifier_at_rank(&self, rank: usize) -> Option<&str> {
        self.ranked_identifiers()
            .get(rank)
            .map(|ranked| ranked.identifier)
    }

    /// Returns the newest entry for `identifier`.
    pub fn latest_entry(&self, identifier: &str) -> Option<&Entry> {
        self.sources.get(identifier)?.latest()
    }

    /// Returns the channel of the strongest source's newest entry.
    pub fn latest_channel_for_top_signal(&self) -> Option<i32> {
        let top = self.identifier_at_rank(0)?;
        self.latest_entry(top).map(|entry| entry.channel)
    }

    /// Returns the channel of the newest entry of the first source, in
    /// identifier order, whose newest entry carries `registration`.
    ///
    /// This is a key-order scan, not a ranking: with several sources sharing
    /// a registration the alphabetically first one wins. An empty
    /// registration never matches.
    pub fn latest_channel_for_registration(&self, registration: &str) -> Option<i32> {
        self.find_by_registration(registration)
            .and_then(|identifier| self.latest_entry(identifier))
            .map(|entry| entry.channel)
    }

    /// Returns the first identifier, in key order, whose newest entry
    /// carries `registration`.
    pub fn find_by_registration(&self, registration: &str) -> Option<&str> {
        if registration.is_empty() {
            return None;
        }
        self.sources
            .iter()
            .find(|(_, source)| {
                source
                    .latest()
                    .is_some_and(|entry| entry.registration == registration)
            })
            .map(|(id, _)| id.as_str())
    }
}
