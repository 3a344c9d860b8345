//! Integration tests for bounded JSON export.

use ridstore::export::ExportedSource;
use ridstore::policy::TargetPolicy;
use ridstore::store::Store;
use ridstore::Entry;

fn store() -> Store {
    Store::new(TargetPolicy::new("target", 100, 2).unwrap())
}

fn position_beacon(i: u32) -> Entry {
    let f = f64::from(i);
    Entry {
        signal_strength: -40 - i32::try_from(i).unwrap(),
        observed_at: 1_700_000_000 + i64::from(i),
        source_clock: u64::MAX - u64::from(i),
        channel: 1 + i32::try_from(i % 13).unwrap(),
        registration: if i % 2 == 0 { "JA-0001".to_string() } else { String::new() },
        latitude: 35.681_236_1 + f * 1e-7,
        longitude: 139.767_125_3 - f * 1e-7,
        pressure_altitude: 0.1 + f / 3.0,
        gps_altitude: -0.3 + f * 0.7,
    }
}

#[test]
fn test_empty_exports() {
    let mut store = store();
    assert_eq!(store.export_top_signal_to_string(1, 10).unwrap(), "{}");

    store.ingest("target", position_beacon(0));
    assert_eq!(store.export_by_registration_to_string("NO-MATCH", 10).unwrap(), "{}");
    assert_eq!(store.export_by_registration_to_string("", 10).unwrap(), "{}");
}

#[test]
fn test_round_trip_identity() {
    let mut store = store();
    let originals: Vec<_> = (0..20).map(position_beacon).collect();
    for entry in &originals {
        store.ingest("target", entry.clone());
    }

    let text = store.export_top_signal_to_string(1, 0).unwrap();
    let exported = ExportedSource::parse(&text).unwrap().unwrap();

    assert_eq!(exported.rid, "target");
    assert_eq!(exported.entries.len(), originals.len());

    for (back, original) in exported.entries.iter().zip(&originals) {
        assert_eq!(back.signal_strength, original.signal_strength);
        assert_eq!(back.channel, original.channel);
        assert_eq!(back.observed_at, original.observed_at);
        assert_eq!(back.source_clock, original.source_clock);
        assert_eq!(back.registration, original.registration);
        assert_eq!(back.latitude.to_bits(), original.latitude.to_bits());
        assert_eq!(back.longitude.to_bits(), original.longitude.to_bits());
        assert_eq!(back.pressure_altitude.to_bits(), original.pressure_altitude.to_bits());
        assert_eq!(back.gps_altitude.to_bits(), original.gps_altitude.to_bits());
    }
}

#[test]
fn test_wire_shape() {
    let mut store = store();
    store.ingest("target", position_beacon(0));
    store.ingest("target", position_beacon(1));

    let text = store.export_top_signal_to_string(1, 0).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(value["rid"], "target");

    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    // bTs is the only quoted number.
    assert_eq!(entries[0]["bTs"], serde_json::Value::String(u64::MAX.to_string()));
    assert!(entries[0]["rssi"].is_i64());
    assert!(entries[0]["ts"].is_i64());
    assert!(entries[0]["ch"].is_i64());
    assert!(entries[0]["lat"].is_f64());

    // reg present for the first, absent (not null, not "") for the second.
    assert_eq!(entries[0]["reg"], "JA-0001");
    assert!(entries[1].as_object().unwrap().get("reg").is_none());

    let keys: Vec<_> = entries[0].as_object().unwrap().keys().cloned().collect();
    for key in ["rssi", "ts", "bTs", "ch", "reg", "lat", "lon", "pAlt", "gAlt"] {
        assert!(keys.iter().any(|k| k == key), "missing {key}");
    }
}

#[test]
fn test_export_targets_strongest_only() {
    let mut store = store();
    store.ingest("weak", position_beacon(30));
    store.ingest("strong", position_beacon(1));
    store.ingest("mid", position_beacon(10));

    for count in [1, 2, 10] {
        let text = store.export_top_signal_to_string(count, 0).unwrap();
        let exported = ExportedSource::parse(&text).unwrap().unwrap();
        assert_eq!(exported.rid, "strong");
    }
}

#[test]
fn test_export_by_registration_uses_key_order() {
    let mut store = store();
    let mut b = position_beacon(0);
    b.signal_strength = -10;
    store.ingest("bravo", b);
    store.ingest("alpha", position_beacon(2));

    let text = store.export_by_registration_to_string("JA-0001", 0).unwrap();
    let exported = ExportedSource::parse(&text).unwrap().unwrap();
    assert_eq!(exported.rid, "alpha");
}

#[test]
fn test_export_respects_max_entries() {
    let mut store = store();
    for i in 0..50 {
        store.ingest("target", position_beacon(i));
    }

    let mut sink = Vec::new();
    store.export_by_registration("JA-0001", 5, &mut sink).unwrap();
    // Newest entry (i = 49) has no registration, so no match.
    assert_eq!(sink, b"{}");

    store.ingest("target", position_beacon(50));
    let mut sink = Vec::new();
    store.export_by_registration("JA-0001", 5, &mut sink).unwrap();

    let exported = ExportedSource::parse(std::str::from_utf8(&sink).unwrap())
        .unwrap()
        .unwrap();
    let ts: Vec<_> = exported.entries.iter().map(|e| e.observed_at - 1_700_000_000).collect();
    assert_eq!(ts, vec![46, 47, 48, 49, 50]);
}
