//! Replay of recorded beacon captures into a store.
//!
//! A capture is a JSON-lines file with one decoded beacon per line: the
//! source identifier under `rid` plus the entry fields in their wire form.
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"rid":"1581F5FJD228700A","rssi":-48,"ts":1700000000,"bTs":"123","ch":6,"lat":35.68,"lon":139.76,"pAlt":120.0,"gAlt":118.5}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ridstore::{CapacityPolicy, Entry, Store};
use serde::Deserialize;

/// One line of a capture file.
#[derive(Debug, Deserialize)]
struct CapturedBeacon {
    rid: String,
    #[serde(flatten)]
    entry: Entry,
}

/// Feeds every beacon in `reader` into `store`, returning how many were
/// ingested.
pub fn replay_reader<R: BufRead, P: CapacityPolicy>(
    reader: R,
    store: &mut Store<P>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut ingested = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let beacon: CapturedBeacon = serde_json::from_str(trimmed)
            .map_err(|e| format!("line {}: {e}", index + 1))?;
        store.ingest(&beacon.rid, beacon.entry);
        ingested += 1;
    }

    Ok(ingested)
}

/// Opens `path` and replays it into `store`.
pub fn replay_file<P: CapacityPolicy>(
    path: &Path,
    store: &mut Store<P>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let file = File::open(path)
        .map_err(|e| format!("cannot open capture '{}': {e}", path.display()))?;
    let ingested = replay_reader(BufReader::new(file), store)?;

    tracing::info!(
        capture = %path.display(),
        ingested,
        sources = store.len(),
        "replayed capture"
    );
    Ok(ingested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CAPTURE: &str = r#"
# two sources
{"rid":"T","rssi":-40,"ts":100,"bTs":"18446744073709551615","ch":6,"reg":"JA-1","lat":1.5,"lon":2.5,"pAlt":3.5,"gAlt":4.5}
{"rid":"O","rssi":-70,"ts":101,"bTs":7,"ch":1,"lat":0.0,"lon":0.0,"pAlt":0.0,"gAlt":0.0}

{"rid":"T","rssi":-45,"ts":102,"bTs":"9","ch":11,"lat":1.5,"lon":2.5,"pAlt":3.5,"gAlt":4.5}
"#;

    #[test]
    fn test_replay_ingests_all_lines() {
        let mut store = Store::with_target("T");
        let n = replay_reader(Cursor::new(CAPTURE), &mut store).unwrap();

        assert_eq!(n, 3);
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries_for("T", 0).count(), 2);

        let first = store.entries_for("T", 0).next().unwrap();
        assert_eq!(first.source_clock, u64::MAX);
        assert_eq!(first.registration, "JA-1");
        assert_eq!(store.latest_entry("O").map(|e| e.source_clock), Some(7));
    }

    #[test]
    fn test_replay_reports_line_number() {
        let mut store = Store::with_target("T");
        let input = "{\"rid\":\"T\",\"rssi\":-40,\"ts\":1,\"bTs\":\"1\",\"ch\":6,\"lat\":0,\"lon\":0,\"pAlt\":0,\"gAlt\":0}\n{broken\n";

        let err = replay_reader(Cursor::new(input), &mut store).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
        assert_eq!(store.len(), 1);
    }
}
