//! Wire format of a persisted progress record.
//!
//! ```json
//! { "watchedIntervals": [{"start": 0, "end": 30}],
//!   "totalDuration": 120,
//!   "lastPosition": 30 }
//! ```

use serde::{Deserialize, Serialize};

use super::ProgressStore;
use crate::error::{CoreError, Result};
use crate::interval::{merge_intervals, Interval};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub watched_intervals: Vec<Interval>,
    #[serde(default)]
    pub total_duration: f64,
    /// Redundant with the last interval's end; kept so a reader can resume
    /// without touching the interval list.
    #[serde(default)]
    pub last_position: f64,
}

impl ProgressRecord {
    pub fn new(watched_intervals: Vec<Interval>, total_duration: f64) -> Self {
        let last_position = watched_intervals.last().map(|i| i.end).unwrap_or(0.0);
        Self {
            watched_intervals,
            total_duration,
            last_position,
        }
    }

    pub fn from_json(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Read and normalize the record under `key`. `Ok(None)` when absent.
    pub fn load<S: ProgressStore + ?Sized>(store: &S, key: &str) -> Result<Option<Self>> {
        let Some(raw) = store.get(key)? else {
            return Ok(None);
        };
        let record = Self::from_json(&raw).map_err(|source| CoreError::MalformedRecord {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(record.normalized()))
    }

    /// Write the record under `key`.
    pub fn save<S: ProgressStore + ?Sized>(&self, store: &mut S, key: &str) -> Result<()> {
        let json = self.to_json()?;
        store.set(key, &json)?;
        Ok(())
    }

    /// Re-merge stored intervals. Older writers may have left overlaps.
    pub fn normalized(mut self) -> Self {
        if self.watched_intervals.len() > 1 {
            self.watched_intervals = merge_intervals(self.watched_intervals);
        } else {
            self.watched_intervals.retain(Interval::is_valid);
        }
        if !self.total_duration.is_finite() || self.total_duration < 0.0 {
            self.total_duration = 0.0;
        }
        self
    }
}
