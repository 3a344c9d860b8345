//! Store configuration.
//!
//! A [`StoreConfig`] describes how a receiver's store is set up: which
//! identifier is the tracked target, how much history each class of source
//! keeps, the freshness window and the default export length. It is plain
//! serde data so it can live in a JSON file next to the firmware image or
//! be assembled from command-line flags.
//!
//! Every field has a default, so `{}` is a valid configuration file.
//!
//! ```rust
//! use ridstore::config::StoreConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config: StoreConfig = serde_json::from_str(r#"{"target_identifier": "1581F5FJD228700A"}"#)?;
//! config.validate()?;
//!
//! let store = config.build_store()?;
//! assert_eq!(store.target_identifier(), Some("1581F5FJD228700A"));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::policy::{DEFAULT_OTHER_CAPACITY, DEFAULT_TARGET_CAPACITY, TargetPolicy};
use crate::query::DEFAULT_ACTIVE_WINDOW_SECS;
use crate::store::Store;

/// Default number of entries included in an export.
pub const DEFAULT_EXPORT_ENTRIES: usize = 60;

/// Configuration for a receiver's beacon store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Identifier granted the elevated target capacity.
    pub target_identifier: String,

    /// History length for the target identifier.
    pub target_capacity: usize,

    /// History length for every other identifier.
    pub other_capacity: usize,

    /// Trailing window, in seconds, used by freshness queries.
    pub active_window_secs: i64,

    /// Number of newest entries included in an export (`0` = all).
    pub default_export_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            target_identifier: String::new(),
            target_capacity: DEFAULT_TARGET_CAPACITY,
            other_capacity: DEFAULT_OTHER_CAPACITY,
            active_window_secs: DEFAULT_ACTIVE_WINDOW_SECS,
            default_export_entries: DEFAULT_EXPORT_ENTRIES,
        }
    }
}

impl StoreConfig {
    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid JSON
    /// for this shape, or fails [`validate`](Self::validate).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), target = %config.target_identifier, "loaded store config");
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.target_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "target_capacity",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if self.other_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "other_capacity",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if self.active_window_secs < 0 {
            return Err(ConfigError::Invalid {
                field: "active_window_secs",
                reason: format!("must not be negative (got {})", self.active_window_secs),
            }
            .into());
        }

        Ok(())
    }

    /// Builds the capacity policy described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`](crate::error::PolicyError) if a capacity is zero.
    pub fn policy(&self) -> Result<TargetPolicy> {
        TargetPolicy::new(
            self.target_identifier.clone(),
            self.target_capacity,
            self.other_capacity,
        )
    }

    /// Builds an empty store using this configuration's policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`](crate::error::PolicyError) if a capacity is zero.
    pub fn build_store(&self) -> Result<Store> {
        Ok(Store::new(self.policy()?))
    }
}
