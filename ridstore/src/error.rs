//! Error types for the ridstore beacon buffer.
//!
//! The store's ingest and query paths never fail: unknown identifiers and
//! out-of-range ranks degrade to empty results. Errors only exist at the
//! edges, where a capacity policy is configured, a configuration file is
//! read, or an export is written to a sink.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for all ridstore operations that can fail.
#[derive(Error, Debug)]
pub enum RidStoreError {
    /// Error while building a capacity policy.
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Error while loading or validating configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error while writing an export to a sink.
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors that can occur when constructing a capacity policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// A capacity of zero would make a source buffer unable to hold its
    /// own latest entry.
    #[error("{which} capacity must be greater than zero")]
    ZeroCapacity {
        /// Which capacity was zero (`"target"` or `"other"`).
        which: &'static str,
    },
}

/// Errors that can occur while loading a [`StoreConfig`](crate::config::StoreConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        /// The path that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why the value is rejected.
        reason: String,
    },
}

/// Errors that can occur while streaming an export to a sink.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing to or flushing the sink failed.
    #[error("failed to write export to sink: {source}")]
    Sink {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed (this includes I/O failures raised by the
    /// sink while serde_json was writing).
    #[error("failed to serialize export: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Export text could not be read back.
    #[error("failed to parse export: {source}")]
    Parse {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Type alias for `Result<T, RidStoreError>`.
pub type Result<T> = std::result::Result<T, RidStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_error_display() {
        let err: RidStoreError = PolicyError::ZeroCapacity { which: "target" }.into();
        assert_eq!(
            err.to_string(),
            "policy error: target capacity must be greater than zero"
        );
    }

    #[test]
    fn test_config_error_display_includes_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/nonexistent/ridstore.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nonexistent/ridstore.json"));
    }
}
