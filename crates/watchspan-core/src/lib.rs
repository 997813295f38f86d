//! # Watchspan Core Library
//!
//! Tracks how much of a video has actually been watched. Playback reports
//! arrive as start/update/stop/seek notifications; the tracker folds them
//! into the minimal set of disjoint watched intervals and derives unique
//! seconds watched, a progress percentage and a resume position from it.
//!
//! ## Architecture
//!
//! - **Tracker**: An event-driven state machine over watching/idle. The host
//!   player calls into it; it never schedules work on its own
//! - **Intervals**: Sort-and-sweep merge keeping committed spans disjoint
//! - **Storage**: A key-value [`ProgressStore`] abstraction with in-memory and
//!   SQLite backends, plus TOML-based configuration
//! - **Diagnostics**: Recovered persistence failures are reported to an
//!   injected [`DiagnosticSink`] instead of being returned to the caller
//!
//! ## Key Components
//!
//! - [`IntervalProgressTracker`]: Per-video progress state machine
//! - [`merge_intervals`]: The interval union pass
//! - [`ProgressStore`]: Persistence contract
//! - [`Config`]: Application configuration management

pub mod diagnostics;
pub mod error;
pub mod events;
pub mod interval;
pub mod storage;
pub mod tracker;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink, StorageOp};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use interval::{merge_intervals, timeline_segments, total_seconds, Interval, TimelineSegment};
pub use storage::{
    storage_key, Config, Database, MemoryStore, ProgressRecord, ProgressStore, StorageConfig,
    TrackerConfig, DEFAULT_KEY_PREFIX,
};
pub use tracker::{Clock, IntervalProgressTracker, ManualClock, SystemClock, TrackerBuilder};
