//! Integration tests for progress tracking across sessions.

use watchspan_core::{
    CollectingSink, Database, Diagnostic, Interval, IntervalProgressTracker, ManualClock,
    MemoryStore, ProgressRecord, ProgressStore, StorageOp, TrackerBuilder,
};

fn iv(start: f64, end: f64) -> Interval {
    Interval { start, end }
}

#[test]
fn test_progress_survives_new_session() {
    let clock = ManualClock::new(0);
    let mut store = MemoryStore::new();

    {
        let mut first = TrackerBuilder::new("lecture-7")
            .clock(clock.clone())
            .build(&mut store);
        first.init(120.0);
        first.start_watching(0.0);
        clock.advance(1_000);
        first.update_watching(20.0);
        first.stop_watching();
        first.start_watching(15.0);
        clock.advance(1_000);
        first.update_watching(30.0);
        first.stop_watching();
    }

    let second = TrackerBuilder::new("lecture-7")
        .clock(clock.clone())
        .build(&mut store);
    assert_eq!(second.intervals(), &[iv(0.0, 30.0)]);
    assert_eq!(second.total_duration(), 120.0);
    assert_eq!(second.resume_position(), 30.0);
    assert_eq!(second.unique_seconds_watched(), 30);
    assert_eq!(second.progress_percentage(), 25);
}

#[test]
fn test_trackers_for_different_videos_do_not_share_state() {
    let clock = ManualClock::new(0);
    let mut store = MemoryStore::new();

    let mut a = TrackerBuilder::new("a").clock(clock.clone()).build(&mut store);
    a.start_watching(0.0);
    clock.advance(1_000);
    a.update_watching(10.0);
    a.stop_watching();
    drop(a);

    let b = TrackerBuilder::new("b").clock(clock.clone()).build(&mut store);
    assert!(b.intervals().is_empty());
    drop(b);
    assert!(store.contains_key("video-progress-a"));
    assert!(!store.contains_key("video-progress-b"));
}

#[test]
fn test_overlapping_stored_record_is_normalized_on_load() {
    let mut store = MemoryStore::new();
    store
        .set(
            "video-progress-legacy",
            r#"{"watchedIntervals":[{"start":30,"end":45},{"start":0,"end":10},{"start":5,"end":31}],"totalDuration":90,"lastPosition":45}"#,
        )
        .unwrap();

    let tracker = IntervalProgressTracker::new("legacy", store);
    assert_eq!(tracker.intervals(), &[iv(0.0, 45.0)]);
    assert_eq!(tracker.unique_seconds_watched(), 45);
    assert_eq!(tracker.progress_percentage(), 50);
    assert_eq!(tracker.resume_position(), 45.0);
}

#[test]
fn test_malformed_record_falls_back_to_empty_state() {
    let sink = CollectingSink::new();
    let mut store = MemoryStore::new();
    store.set("video-progress-broken", "{not json").unwrap();

    let tracker = TrackerBuilder::new("broken")
        .diagnostics(sink.clone())
        .build(store);

    assert!(tracker.intervals().is_empty());
    assert_eq!(tracker.resume_position(), 0.0);
    assert_eq!(tracker.total_duration(), 0.0);
    match sink.diagnostics().as_slice() {
        [Diagnostic::MalformedRecord { key, .. }] => assert_eq!(key, "video-progress-broken"),
        other => panic!("Expected one MalformedRecord, got {other:?}"),
    }
}

#[test]
fn test_schema_mismatch_is_treated_as_malformed() {
    let sink = CollectingSink::new();
    let mut store = MemoryStore::new();
    store
        .set("video-progress-old", r#"{"segments":[[0,10]]}"#)
        .unwrap();

    let tracker = TrackerBuilder::new("old").diagnostics(sink.clone()).build(store);
    assert!(tracker.intervals().is_empty());
    assert_eq!(sink.diagnostics().len(), 1);
}

#[test]
fn test_unreadable_store_reports_load_failure() {
    struct BrokenStore;

    impl ProgressStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, watchspan_core::StorageError> {
            Err(watchspan_core::StorageError::Locked)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), watchspan_core::StorageError> {
            Err(watchspan_core::StorageError::Locked)
        }
        fn remove(&mut self, _key: &str) -> Result<(), watchspan_core::StorageError> {
            Err(watchspan_core::StorageError::Locked)
        }
    }

    let sink = CollectingSink::new();
    let clock = ManualClock::new(0);
    let mut tracker = TrackerBuilder::new("offline")
        .clock(clock.clone())
        .diagnostics(sink.clone())
        .build(BrokenStore);
    tracker.init(60.0);
    tracker.start_watching(0.0);
    clock.advance(1_000);
    tracker.update_watching(30.0);
    tracker.stop_watching();

    assert_eq!(tracker.progress_percentage(), 50);
    let ops: Vec<StorageOp> = sink
        .diagnostics()
        .into_iter()
        .filter_map(|d| match d {
            Diagnostic::StorageUnavailable { op, .. } => Some(op),
            Diagnostic::MalformedRecord { .. } => None,
        })
        .collect();
    assert_eq!(ops, vec![StorageOp::Load, StorageOp::Save]);
}

#[test]
fn test_reset_then_reload_is_empty() {
    let clock = ManualClock::new(0);
    let db = Database::open_memory().unwrap();

    let mut tracker = TrackerBuilder::new("clip").clock(clock.clone()).build(db);
    tracker.init(50.0);
    tracker.start_watching(0.0);
    clock.advance(1_000);
    tracker.update_watching(25.0);
    tracker.stop_watching();
    assert_eq!(tracker.progress_percentage(), 50);

    tracker.reset_progress();
    let db = tracker.into_store();
    assert!(db.kv_get("video-progress-clip").unwrap().is_none());

    let reloaded = TrackerBuilder::new("clip").clock(clock).build(db);
    assert!(reloaded.intervals().is_empty());
    assert_eq!(reloaded.resume_position(), 0.0);
}

#[test]
fn test_database_file_holds_progress_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watchspan.db");
    let clock = ManualClock::new(0);

    {
        let db = Database::open_at(&path).unwrap();
        let mut tracker = TrackerBuilder::new("movie").clock(clock.clone()).build(db);
        tracker.init(6300.0);
        tracker.start_watching(600.0);
        clock.advance(1_000);
        tracker.update_watching(1800.0);
        tracker.handle_seek(3600.0);
        clock.advance(1_000);
        tracker.update_watching(3660.0);
        tracker.stop_watching();
    }

    let db = Database::open_at(&path).unwrap();
    let raw = db.kv_get("video-progress-movie").unwrap().unwrap();
    let record = ProgressRecord::from_json(&raw).unwrap();
    assert_eq!(
        record.watched_intervals,
        vec![iv(600.0, 1800.0), iv(3600.0, 3660.0)]
    );
    assert_eq!(record.last_position, 3660.0);

    let tracker = TrackerBuilder::new("movie").clock(clock).build(db);
    assert_eq!(tracker.resume_position(), 3660.0);
    assert_eq!(tracker.unique_seconds_watched(), 1260);
    assert_eq!(tracker.progress_percentage(), 20);
}

#[test]
fn test_custom_key_prefix() {
    let clock = ManualClock::new(0);
    let mut store = MemoryStore::new();
    let mut tracker = TrackerBuilder::new("x")
        .key_prefix("progress:")
        .clock(clock.clone())
        .build(&mut store);
    assert_eq!(tracker.storage_key(), "progress:x");
    tracker.start_watching(0.0);
    clock.advance(1_000);
    tracker.update_watching(5.0);
    tracker.stop_watching();
    drop(tracker);
    assert!(store.contains_key("progress:x"));
}
