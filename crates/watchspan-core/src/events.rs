use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Every state change in a tracker produces an Event.
/// Hosts can forward these to a UI or an analytics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DurationSet {
        total_duration: f64,
        at: DateTime<Utc>,
    },
    WatchingStarted {
        position: f64,
        at: DateTime<Utc>,
    },
    PositionUpdated {
        position: f64,
        at: DateTime<Utc>,
    },
    /// Watching stopped. `committed` is `None` when the open interval had
    /// zero width and was discarded.
    WatchingStopped {
        committed: Option<Interval>,
        at: DateTime<Utc>,
    },
    /// Playback jumped to `to`. Any interval open before the jump is reported
    /// in `committed`.
    Seeked {
        committed: Option<Interval>,
        to: f64,
        at: DateTime<Utc>,
    },
    ProgressReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        video_id: String,
        is_watching: bool,
        intervals: Vec<Interval>,
        current_interval: Option<Interval>,
        total_duration: f64,
        unique_seconds_watched: u64,
        progress_percentage: u8,
        resume_position: f64,
        at: DateTime<Utc>,
    },
}
