//! Bounded JSON export of one source's recent history.
//!
//! An export is a single compact JSON object naming one source and carrying
//! its newest entries, oldest first:
//!
//! ```text
//! {"rid":"1581F5FJD228700A","entries":[{"rssi":-48,"ts":1700000000,"bTs":"123456789","ch":6,"reg":"JA-0001","lat":35.6812,"lon":139.7671,"pAlt":120.0,"gAlt":118.5}]}
//! ```
//!
//! When nothing qualifies the export is exactly `{}`.
//!
//! # Design
//!
//! Streaming to a [`Write`] sink is the canonical form: entries are serialized
//! straight out of the ring buffer without first being copied into a list.
//! The `*_to_string` variants are thin wrappers that stream into a `Vec<u8>`
//! pre-sized with [`estimated_export_size`], so serialization of a typical
//! export never reallocates.
//!
//! Field encoding follows [`Entry`]'s serde representation: `bTs` is a
//! decimal string, `reg` is omitted when empty, and non-finite floats are
//! written as `null` (serde_json has no representation for them).
//!
//! # Example
//!
//! ```rust
//! # use ridstore::{Entry, Store};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = Store::with_target("1581F5FJD228700A");
//! assert_eq!(store.export_top_signal_to_string(1, 10)?, "{}");
//!
//! store.ingest("1581F5FJD228700A", Entry {
//!     signal_strength: -48,
//!     observed_at: 1_700_000_000,
//!     source_clock: 123_456_789,
//!     channel: 6,
//!     registration: String::new(),
//!     latitude: 35.5,
//!     longitude: 139.75,
//!     pressure_altitude: 120.0,
//!     gps_altitude: 118.5,
//! });
//!
//! let mut sink = Vec::new();
//! store.export_top_signal(1, 10, &mut sink)?;
//! assert!(sink.starts_with(br#"{"rid":"1581F5FJD228700A","entries":[{"rssi":-48"#));
//! # Ok(())
//! # }
//! ```

use std::io::{self, BufWriter, Write};

use serde::{Deserialize, Serialize, Serializer};

use crate::entry::Entry;
use crate::error::{ExportError, Result};
use crate::policy::CapacityPolicy;
use crate::query::SourceEntries;
use crate::store::Store;

/// The export written when no source or entry qualifies.
pub const EMPTY_EXPORT: &str = "{}";

/// Fixed bytes for the object envelope (`{"rid":"","entries":[]}` and slack).
pub const EXPORT_OVERHEAD_BYTES: usize = 48;

/// Upper estimate of one serialized entry, including a full-length
/// registration and four shortest-form doubles.
pub const EXPORT_ENTRY_BYTES: usize = 256;

/// Largest write buffer placed in front of a streaming sink.
const STREAM_BUFFER_BYTES: usize = 8 * 1024;

/// Estimates the serialized size of an export holding `entry_count` entries
/// for an identifier of `identifier_len` bytes.
pub fn estimated_export_size(entry_count: usize, identifier_len: usize) -> usize {
    EXPORT_OVERHEAD_BYTES
        .saturating_add(identifier_len)
        .saturating_add(entry_count.saturating_mul(EXPORT_ENTRY_BYTES))
}

/// Borrowed view of one source's export.
#[derive(Serialize)]
struct ExportView<'a> {
    rid: &'a str,
    entries: EntrySeq<'a>,
}

/// Serializes a ring window as a JSON array without collecting it.
struct EntrySeq<'a>(SourceEntries<'a>);

impl Serialize for EntrySeq<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.clone())
    }
}

/// An export read back into owned values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportedSource {
    /// Identifier of the exported source.
    pub rid: String,
    /// Exported entries, oldest first.
    pub entries: Vec<Entry>,
}

impl ExportedSource {
    /// Parses export text. Returns `Ok(None)` for the empty export `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Parse`] if the text is not a well-formed export.
    pub fn parse(text: &str) -> Result<Option<Self>> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|source| ExportError::Parse { source })?;

        if value.as_object().is_some_and(serde_json::Map::is_empty) {
            return Ok(None);
        }

        let exported = serde_json::from_value(value).map_err(|source| ExportError::Parse { source })?;
        Ok(Some(exported))
    }
}

impl<P: CapacityPolicy> Store<P> {
    /// Streams the strongest source's newest `max_entries` entries
    /// (`0` = all) to `sink`.
    ///
    /// Only `count >= 1` is meaningful and the export always covers exactly
    /// one source, the top of [`ranked_identifiers`](Self::ranked_identifiers);
    /// `count == 0` writes `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if writing to `sink` fails.
    pub fn export_top_signal<W: Write>(&self, count: usize, max_entries: usize, sink: W) -> Result<()> {
        let identifier = if count == 0 { None } else { self.identifier_at_rank(0) };
        self.export_identifier(identifier, max_entries, sink)
    }

    /// Streams the newest `max_entries` entries (`0` = all) of the first
    /// source, in identifier order, whose newest entry carries
    /// `registration`.
    ///
    /// Writes `{}` when no source matches or `registration` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if writing to `sink` fails.
    pub fn export_by_registration<W: Write>(
        &self,
        registration: &str,
        max_entries: usize,
        sink: W,
    ) -> Result<()> {
        self.export_identifier(self.find_by_registration(registration), max_entries, sink)
    }

    /// Streams the newest `max_entries` entries (`0` = all) of `identifier`.
    ///
    /// Writes `{}` for an unknown identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if writing to `sink` fails.
    pub fn export_source<W: Write>(&self, identifier: &str, max_entries: usize, sink: W) -> Result<()> {
        self.export_identifier(Some(identifier), max_entries, sink)
    }

    /// [`export_top_signal`](Self::export_top_signal) into a pre-sized string.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if serialization fails.
    pub fn export_top_signal_to_string(&self, count: usize, max_entries: usize) -> Result<String> {
        let identifier = if count == 0 { None } else { self.identifier_at_rank(0) };
        self.export_identifier_to_string(identifier, max_entries)
    }

    /// [`export_by_registration`](Self::export_by_registration) into a
    /// pre-sized string.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if serialization fails.
    pub fn export_by_registration_to_string(
        &self,
        registration: &str,
        max_entries: usize,
    ) -> Result<String> {
        self.export_identifier_to_string(self.find_by_registration(registration), max_entries)
    }

    fn export_size_hint(&self, identifier: Option<&str>, max_entries: usize) -> usize {
        identifier.map_or(EMPTY_EXPORT.len(), |id| {
            estimated_export_size(self.entries_for(id, max_entries).len(), id.len())
        })
    }

    fn export_identifier_to_string(&self, identifier: Option<&str>, max_entries: usize) -> Result<String> {
        let size = self.export_size_hint(identifier, max_entries);

        let mut buf = Vec::with_capacity(size);
        self.write_export(identifier, max_entries, &mut buf)?;

        String::from_utf8(buf).map_err(|e| {
            ExportError::Sink {
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            }
            .into()
        })
    }

    fn export_identifier<W: Write>(
        &self,
        identifier: Option<&str>,
        max_entries: usize,
        sink: W,
    ) -> Result<()> {
        let size = self.export_size_hint(identifier, max_entries);

        // serde_json issues many small writes; coalesce them for slow sinks
        // such as a serial port.
        let mut writer = BufWriter::with_capacity(size.min(STREAM_BUFFER_BYTES), sink);
        self.write_export(identifier, max_entries, &mut writer)?;
        writer.flush().map_err(|source| ExportError::Sink { source })?;
        Ok(())
    }

    fn write_export<W: Write>(
        &self,
        identifier: Option<&str>,
        max_entries: usize,
        mut sink: W,
    ) -> Result<()> {
        let entries = identifier.map_or_else(SourceEntries::empty, |id| self.entries_for(id, max_entries));

        let exported = entries.len();

        let rid = match identifier {
            Some(rid) if exported > 0 => rid,
            _ => {
                sink.write_all(EMPTY_EXPORT.as_bytes())
                    .map_err(|source| ExportError::Sink { source })?;
                return Ok(());
            }
        };

        serde_json::to_writer(
            &mut sink,
            &ExportView {
                rid,
                entries: EntrySeq(entries),
            },
        )
        .map_err(|source| ExportError::Serialize { source })?;

        tracing::debug!(rid, exported, max_entries, "exported source");
        Ok(())
    }
}
