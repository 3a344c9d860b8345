//! Beacon observation records.
//!
//! An [`Entry`] is one decoded Remote ID beacon as seen by the receiver: the
//! signal strength it arrived with, when it arrived, the source's own clock,
//! the Wi-Fi channel, the operator registration (if broadcast) and the
//! reported position.
//!
//! The serde representation of `Entry` is the compact export wire shape:
//!
//! ```text
//! {"rssi":-52,"ts":1700000000,"bTs":"18446744073709551615","ch":6,
//!  "reg":"JA-0001","lat":35.68,"lon":139.76,"pAlt":120.5,"gAlt":118.0}
//! ```
//!
//! `bTs` is written as a decimal string because a 64-bit clock does not fit
//! the exact-integer range of a double, and `reg` is omitted entirely when
//! empty.

use serde::{Deserialize, Serialize};

/// One observation of one source at one instant.
///
/// Entries are created by the decoding layer and never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Received signal strength indicator. Higher is stronger.
    #[serde(rename = "rssi")]
    pub signal_strength: i32,

    /// Local receive time in seconds since the Unix epoch.
    #[serde(rename = "ts")]
    pub observed_at: i64,

    /// Opaque high-resolution clock emitted by the source itself.
    ///
    /// Only monotonic within a single source; unrelated to `observed_at`.
    #[serde(rename = "bTs", with = "source_clock")]
    pub source_clock: u64,

    /// Wi-Fi channel the beacon was received on.
    #[serde(rename = "ch")]
    pub channel: i32,

    /// Operator registration number, or empty when not broadcast.
    #[serde(rename = "reg", default, skip_serializing_if = "String::is_empty")]
    pub registration: String,

    /// Latitude in degrees.
    #[serde(rename = "lat")]
    pub latitude: f64,

    /// Longitude in degrees.
    #[serde(rename = "lon")]
    pub longitude: f64,

    /// Barometric (pressure) altitude in meters.
    #[serde(rename = "pAlt")]
    pub pressure_altitude: f64,

    /// Geodetic (GPS) altitude in meters.
    #[serde(rename = "gAlt")]
    pub gps_altitude: f64,
}

impl Entry {
    /// Returns `true` if this entry was observed within `[start, end]`.
    #[inline]
    pub fn observed_within(&self, start: i64, end: i64) -> bool {
        self.observed_at >= start && self.observed_at <= end
    }

    /// Returns `true` if the source broadcast a registration number.
    pub fn has_registration(&self) -> bool {
        !self.registration.is_empty()
    }
}

/// Serde adapter writing the source clock as a decimal string.
///
/// Deserialization accepts either the string form or a bare unsigned integer,
/// so hand-written capture files do not need to quote the clock.
mod source_clock {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(clock: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(clock)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(ClockVisitor)
    }

    struct ClockVisitor;

    impl Visitor<'_> for ClockVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an unsigned 64-bit clock as a decimal string or integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}
