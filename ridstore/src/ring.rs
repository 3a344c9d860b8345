//! Fixed-capacity ring buffer for per-source beacon history.
//!
//! This module provides the storage primitive behind every source buffer: a
//! circular buffer whose slot vector is allocated once, at construction, and
//! never grows past its capacity. Pushing into a full buffer overwrites the
//! oldest slot in place.
//!
//! # Design
//!
//! - `slots` holds at most `capacity` values; it is filled by `push` until
//!   full and then reused in place
//! - `head` is the slot index of the oldest value once the buffer is full
//!   (it is always 0 before that)
//! - Reads always yield values oldest to newest, handling wraparound

use std::num::NonZeroUsize;

/// A bounded FIFO that evicts its oldest element on overflow.
///
/// # Thread Safety
///
/// `RingBuffer` is a plain owned value. Mutation requires `&mut self`, so the
/// usual borrow rules give single-writer semantics; wrap it in a mutex when
/// sharing across threads.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Backing storage, allocated with exactly `capacity` slots.
    slots: Vec<T>,
    /// Index of the oldest element when the buffer is full.
    head: usize,
    /// Maximum number of elements retained.
    capacity: NonZeroUsize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring buffer with room for `capacity` elements.
    ///
    /// The full slot vector is reserved up front so that no push ever
    /// reallocates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    /// use ridstore::ring::RingBuffer;
    ///
    /// let mut ring = RingBuffer::new(NonZeroUsize::new(2).unwrap());
    /// ring.push(1);
    /// ring.push(2);
    /// ring.push(3);
    /// assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    /// ```
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.get()),
            head: 0,
            capacity,
        }
    }

    /// Appends a value at the tail, evicting and returning the oldest value
    /// if the buffer was already full.
    ///
    /// At most one value is ever evicted per push.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.slots.len() < self.capacity.get() {
            self.slots.push(value);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.capacity.get();
        Some(evicted)
    }

    /// Returns the number of values currently held.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns whether the next push will evict a value.
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity.get()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Returns the oldest value, if any.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the newest value, if any.
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|last| self.get(last))
    }

    /// Returns the value at logical position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.slots.len() {
            return None;
        }
        self.slots.get(self.physical(index))
    }

    /// Drops every value while keeping the allocated slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    /// Returns an iterator over all values, oldest to newest.
    pub fn iter(&self) -> RingIter<'_, T> {
        RingIter {
            ring: self,
            front: 0,
            back: self.slots.len(),
        }
    }

    /// Returns an iterator over the newest `count` values, still oldest to
    /// newest within that window.
    ///
    /// A `count` larger than the current length yields everything.
    pub fn tail(&self, count: usize) -> RingIter<'_, T> {
        let len = self.slots.len();
        RingIter {
            ring: self,
            front: len.saturating_sub(count),
            back: len,
        }
    }

    /// Maps a logical position to a slot index.
    #[inline]
    fn physical(&self, index: usize) -> usize {
        // `head` stays 0 until the buffer is full, so this is the identity
        // mapping before the first wraparound.
        (self.head + index) % self.capacity.get()
    }
}

/// Iterator over a [`RingBuffer`] window, oldest to newest.
///
/// Handles wraparound transparently and supports iteration from both ends.
#[derive(Debug, Clone)]
pub struct RingIter<'a, T> {
    ring: &'a RingBuffer<T>,
    /// Next logical position to yield from the front.
    front: usize,
    /// One past the next logical position to yield from the back.
    back: usize,
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.ring.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for RingIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.ring.get(self.back)
    }
}

impl<T> ExactSizeIterator for RingIter<'_, T> {}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = RingIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
