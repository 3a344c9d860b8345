//! Capacity policies for source buffers.
//!
//! A policy decides, once per source, how many entries that source's buffer
//! may hold. The store consults it only when a buffer is first created, so a
//! source keeps the capacity it was born with until it is cleared.
//!
//! The usual policy is [`TargetPolicy`]: one distinguished identifier (the
//! drone being tracked) keeps a long history while every other source keeps
//! only a couple of recent beacons.
//!
//! # Example
//!
//! ```rust
//! use ridstore::policy::{CapacityPolicy, TargetPolicy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = TargetPolicy::new("1581F5FJD228700A", 3600, 2)?;
//!
//! assert_eq!(policy.capacity_for("1581F5FJD228700A").get(), 3600);
//! assert_eq!(policy.capacity_for("anything-else").get(), 2);
//! # Ok(())
//! # }
//! ```

use std::num::NonZeroUsize;

use crate::error::{PolicyError, Result};

/// Default history length kept for the target identifier.
pub const DEFAULT_TARGET_CAPACITY: usize = 3600;

/// Default history length kept for every other identifier.
pub const DEFAULT_OTHER_CAPACITY: usize = 2;

/// Chooses the capacity of a newly created source buffer.
///
/// Implementations must be pure: the same identifier always yields the same
/// capacity. Any `Fn(&str) -> NonZeroUsize` closure is a policy.
pub trait CapacityPolicy {
    /// Returns the capacity for a buffer holding `identifier`'s entries.
    fn capacity_for(&self, identifier: &str) -> NonZeroUsize;

    /// Returns the identifier granted elevated capacity, if the policy has one.
    fn target_identifier(&self) -> Option<&str> {
        None
    }
}

impl<F> CapacityPolicy for F
where
    F: Fn(&str) -> NonZeroUsize,
{
    fn capacity_for(&self, identifier: &str) -> NonZeroUsize {
        self(identifier)
    }
}

/// Grants one target identifier a larger capacity than all others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPolicy {
    target_identifier: String,
    target_capacity: NonZeroUsize,
    other_capacity: NonZeroUsize,
}

impl TargetPolicy {
    /// Creates a policy for `target_identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ZeroCapacity`] if either capacity is zero.
    pub fn new(
        target_identifier: impl Into<String>,
        target_capacity: usize,
        other_capacity: usize,
    ) -> Result<Self> {
        let target_capacity =
            NonZeroUsize::new(target_capacity).ok_or(PolicyError::ZeroCapacity { which: "target" })?;
        let other_capacity =
            NonZeroUsize::new(other_capacity).ok_or(PolicyError::ZeroCapacity { which: "other" })?;

        Ok(Self {
            target_identifier: target_identifier.into(),
            target_capacity,
            other_capacity,
        })
    }

    /// Creates a policy with the default capacities
    /// ([`DEFAULT_TARGET_CAPACITY`] / [`DEFAULT_OTHER_CAPACITY`]).
    pub fn with_defaults(target_identifier: impl Into<String>) -> Self {
        Self {
            target_identifier: target_identifier.into(),
            target_capacity: NonZeroUsize::new(DEFAULT_TARGET_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            other_capacity: NonZeroUsize::new(DEFAULT_OTHER_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Returns whether `identifier` is the target.
    pub fn is_target(&self, identifier: &str) -> bool {
        identifier == self.target_identifier
    }

    /// Capacity granted to the target identifier.
    pub fn target_capacity(&self) -> NonZeroUsize {
        self.target_capacity
    }

    /// Capacity granted to every other identifier.
    pub fn other_capacity(&self) -> NonZeroUsize {
        self.other_capacity
    }
}

impl CapacityPolicy for TargetPolicy {
    fn capacity_for(&self, identifier: &str) -> NonZeroUsize {
        if self.is_target(identifier) {
            self.target_capacity
        } else {
            self.other_capacity
        }
    }

    fn target_identifier(&self) -> Option<&str> {
        Some(&self.target_identifier)
    }
}
