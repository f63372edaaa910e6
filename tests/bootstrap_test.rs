//! Bootstrap supplier tests
//!
//! The stored build set is restored verbatim when valid and replaced by
//! an empty set when missing or corrupt; only the clock can stop startup.

use rocket_bridge::bootstrap::{self, SystemClock};
use rocket_bridge::builds::STORED_BUILDS_KEY;
use rocket_bridge::storage::{BuildStorage, MemoryStorage};
use rocket_bridge::{BridgeError, Result};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Storage whose reads always fail
struct BrokenStorage;

impl BuildStorage for BrokenStorage {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Err(BridgeError::Storage("disk on fire".to_string()))
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(BridgeError::Storage("disk on fire".to_string()))
    }
}

#[test]
fn test_first_run_is_empty() {
    let flags = bootstrap::supply(&MemoryStorage::new(), &SystemClock).unwrap();
    assert!(flags.stored_builds.is_empty());
}

#[test]
fn test_corrupt_snapshot_is_empty() {
    for corrupt in ["{\"rocket-1\": {", "[1,2,3]", "42", "\"text\"", ""] {
        let storage = MemoryStorage::new();
        storage.seed(STORED_BUILDS_KEY, corrupt);

        let flags = bootstrap::supply(&storage, &SystemClock).unwrap();
        assert!(flags.stored_builds.is_empty(), "{corrupt:?} was not discarded");
    }
}

#[test]
fn test_stored_null_is_empty() {
    let storage = MemoryStorage::new();
    storage.seed(STORED_BUILDS_KEY, "null");
    assert!(bootstrap::supply(&storage, &SystemClock)
        .unwrap()
        .stored_builds
        .is_empty());
}

#[test]
fn test_unreadable_storage_is_empty() {
    let flags = bootstrap::supply(&BrokenStorage, &SystemClock).unwrap();
    assert!(flags.stored_builds.is_empty());
}

#[test]
fn test_valid_snapshot_restored_in_order() {
    let storage = MemoryStorage::new();
    storage.seed(
        STORED_BUILDS_KEY,
        r#"{"b-2":{"stages":2},"a-1":{"stages":[1,{"fuel":"LOX"}]}}"#,
    );

    let flags = bootstrap::supply(&storage, &SystemClock).unwrap();
    let ids: Vec<_> = flags.stored_builds.ids().collect();
    assert_eq!(ids, vec!["b-2", "a-1"]);
}

#[test]
fn test_seed_comes_from_clock() {
    let clock = || UNIX_EPOCH + Duration::from_millis(1_234_567);
    let flags = bootstrap::supply(&MemoryStorage::new(), &clock).unwrap();
    assert_eq!(flags.seed_int, 1_234_567);
}

#[test]
fn test_broken_clock_is_fatal() {
    let clock = || UNIX_EPOCH - Duration::from_millis(1);
    let err = bootstrap::supply(&MemoryStorage::new(), &clock).unwrap_err();
    assert!(matches!(err, BridgeError::ClockUnavailable(_)));
}

#[test]
fn test_seed_tracks_wall_clock() {
    let before = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    let flags = bootstrap::supply(&MemoryStorage::new(), &SystemClock).unwrap();
    assert!(flags.seed_int >= before);
}
