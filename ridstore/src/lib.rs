//! # ridstore
//!
//! Bounded per-source ring-buffer store for drone Remote ID beacon telemetry.
//!
//! ridstore keeps the recent history of every broadcasting source a receiver
//! hears, keyed by the source identifier, inside a fixed memory budget. One
//! distinguished target identifier keeps a long history; every other source
//! keeps only its last few beacons. The store answers the questions a small
//! display asks on every refresh: who was heard recently, who is strongest,
//! what did a given source report, and a compact JSON export of one source.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Fixed-capacity ring buffer per source; no reallocation per ingest
//! - Capacity chosen once per source by an injectable [`CapacityPolicy`]
//! - Bounded, predictable memory: `target + other * (sources - 1)` entries
//! - Infallible ingest and queries; unknown identifiers yield empty results
//! - Streaming JSON export to any `std::io::Write` sink
//!
//! ## Quick Start
//!
//! ```rust
//! use ridstore::{Entry, Store};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = Store::with_target("1581F5FJD228700A");
//!
//! // Called by the beacon decoder, once per received frame
//! store.ingest("1581F5FJD228700A", Entry {
//!     signal_strength: -48,
//!     observed_at: 1_700_000_000,
//!     source_clock: 98_765_432_100,
//!     channel: 6,
//!     registration: "JA-0001".to_string(),
//!     latitude: 35.6812,
//!     longitude: 139.7671,
//!     pressure_altitude: 120.0,
//!     gps_altitude: 118.5,
//! });
//!
//! // Called by the display, once per refresh
//! for ranked in store.ranked_identifiers() {
//!     println!("{} dBm  {}", ranked.signal_strength, ranked.identifier);
//! }
//! let mut out = Vec::new();
//! store.export_top_signal(1, 30, &mut out)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`Store`] — Top-level handle; owns the source map and capacity policy
//! - [`Entry`] — One decoded beacon observation
//! - [`TargetPolicy`] — Default policy favouring one target identifier
//! - [`SharedStore`] — Mutex-guarded handle for capture and display threads
//!
//! ## Modules
//!
//! - [`store`] — Store lifecycle, ingest, clear
//! - [`query`] — Freshness, ranking and retrieval queries
//! - [`export`] — Bounded JSON export
//! - [`source`] — Per-source buffer with cached latest fields
//! - [`ring`] — Fixed-capacity ring buffer
//! - [`policy`] — Capacity policies
//! - [`config`] — JSON configuration
//! - [`shared`] — Thread-safe wrapper
//! - [`entry`] — Observation record and its wire shape
//! - [`error`] — Error types

pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod policy;
pub mod query;
pub mod ring;
pub mod shared;
pub mod source;
pub mod store;

// Re-export primary API types at crate root for convenience.
pub use config::StoreConfig;
pub use entry::Entry;
pub use error::{Result, RidStoreError};
pub use export::ExportedSource;
pub use policy::{CapacityPolicy, TargetPolicy};
pub use query::{RankedSource, SourceEntries};
pub use shared::SharedStore;
pub use store::Store;
