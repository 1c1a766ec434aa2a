//! Response cache persistence tests.
//!
//! Exercise the on-disk contract: `<namespace>_<key>.json` files with
//! `{ data, timestamp, expiry }` bodies, lazy expiry with removal on
//! read, and fail-soft handling of corruption.

use kisan::cache::{ResponseCache, WEATHER_CACHE_TIME_MS};
use serde_json::json;

#[test]
fn entry_file_carries_data_timestamp_expiry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ResponseCache::open(dir.path());

    cache
        .set("weather", "Ludhiana_en", json!({"temp": 31}), WEATHER_CACHE_TIME_MS)
        .expect("set");

    let raw = std::fs::read_to_string(dir.path().join("weather_Ludhiana_en.json")).expect("read");
    let entry: serde_json::Value = serde_json::from_str(&raw).expect("entry json");
    assert_eq!(entry["data"]["temp"], 31);
    assert!(entry["timestamp"].is_i64());
    assert_eq!(entry["expiry"], WEATHER_CACHE_TIME_MS);
}

#[test]
fn backdated_entry_expires_and_is_removed_on_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ResponseCache::open(dir.path());
    let path = dir.path().join("weather_Ludhiana_en.json");

    // Written "20 minutes ago" with a 15-minute TTL.
    let written = chrono::Utc::now().timestamp_millis() - 20 * 60 * 1000;
    std::fs::write(
        &path,
        json!({"data": {"temp": 31}, "timestamp": written, "expiry": WEATHER_CACHE_TIME_MS})
            .to_string(),
    )
    .expect("write entry");

    assert!(cache.get("weather", "Ludhiana_en").is_none());
    assert!(!path.exists(), "expired entry must be deleted on read");
}

#[test]
fn fresh_entry_survives_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ResponseCache::open(dir.path());

    cache
        .set("schemes", "en", json!([{"name": "KCC"}]), 60_000)
        .expect("set");
    assert!(cache.get("schemes", "en").is_some());
    // Reads do not consume fresh entries.
    assert!(cache.get("schemes", "en").is_some());
}

#[test]
fn corrupt_entry_is_discarded_as_a_miss() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ResponseCache::open(dir.path());
    let path = dir.path().join("alerts_Pune_en.json");
    std::fs::write(&path, "{\"data\": truncated").expect("write corrupt");

    assert!(cache.get("alerts", "Pune_en").is_none());
    assert!(!path.exists());
}
