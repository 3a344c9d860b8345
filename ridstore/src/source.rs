//! Per-source beacon history.
//!
//! A [`SourceBuffer`] holds the most recent entries for one source identifier
//! in a fixed-capacity [`RingBuffer`], together with cached copies of the
//! newest entry's signal strength and receive time. Ranking and freshness
//! queries read the cached fields instead of touching the ring.

use std::num::NonZeroUsize;

use crate::entry::Entry;
use crate::ring::{RingBuffer, RingIter};

/// Cached signal strength of a buffer that holds no entries.
///
/// Sorts below every real reading.
pub const NO_SIGNAL: i32 = i32::MIN;

/// Bounded history of one source plus cached "latest" fields.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    entries: RingBuffer<Entry>,
    /// Mirrors `entries.back().signal_strength`, or [`NO_SIGNAL`].
    latest_signal_strength: i32,
    /// Mirrors `entries.back().observed_at`, or 0.
    latest_observed_at: i64,
}

impl SourceBuffer {
    /// Creates an empty buffer retaining at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RingBuffer::new(capacity),
            latest_signal_strength: NO_SIGNAL,
            latest_observed_at: 0,
        }
    }

    /// Appends an entry, evicting the oldest one if the buffer is full.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: Entry) -> Option<Entry> {
        let evicted = self.entries.push(entry);
        self.refresh_latest();
        evicted
    }

    /// Returns the fixed capacity chosen when the buffer was created.
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.capacity()
    }

    /// Returns the number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signal strength of the newest entry, or [`NO_SIGNAL`] when empty.
    pub fn latest_signal_strength(&self) -> i32 {
        self.latest_signal_strength
    }

    /// Receive time of the newest entry, or 0 when empty.
    pub fn latest_observed_at(&self) -> i64 {
        self.latest_observed_at
    }

    /// Oldest entry held.
    pub fn oldest(&self) -> Option<&Entry> {
        self.entries.front()
    }

    /// Newest entry held.
    pub fn latest(&self) -> Option<&Entry> {
        self.entries.back()
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> RingIter<'_, Entry> {
        self.entries.iter()
    }

    /// The newest `max_count` entries, oldest first; `0` means all.
    pub fn recent(&self, max_count: usize) -> RingIter<'_, Entry> {
        if max_count == 0 {
            self.entries.iter()
        } else {
            self.entries.tail(max_count)
        }
    }

    /// Returns whether any entry was observed within `[start, end]`.
    ///
    /// Rejects without scanning when the newest entry is older than `start`
    /// or the oldest entry is newer than `end`.
    pub fn has_entry_within(&self, start: i64, end: i64) -> bool {
        let Some(oldest) = self.oldest() else {
            return false;
        };
        if self.latest_observed_at < start || oldest.observed_at > end {
            return false;
        }
        self.iter().any(|entry| entry.observed_within(start, end))
    }

    fn refresh_latest(&mut self) {
        match self.entries.back() {
            Some(back) => {
                self.latest_signal_strength = back.signal_strength;
                self.latest_observed_at = back.observed_at;
            }
            None => {
                self.latest_signal_strength = NO_SIGNAL;
                self.latest_observed_at = 0;
            }
        }
    }
}
