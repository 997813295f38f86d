//! Interval progress tracker.
//!
//! The tracker is an event-driven state machine over watching/idle. It does
//! not use internal threads or timers - the host player forwards playback
//! notifications and the tracker folds them into a merged set of watched
//! intervals.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start_watching--> Watching --update_watching--> Watching
//! Watching --stop_watching--> Idle
//! any --handle_seek--> Watching   (commits the open interval first)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = IntervalProgressTracker::new("intro-101", MemoryStore::new());
//! tracker.init(600.0);
//! tracker.start_watching(0.0);
//! // On each playback time update:
//! tracker.update_watching(position);
//! // On pause / end:
//! tracker.stop_watching();
//! ```

use chrono::Utc;

use super::clock::{Clock, SystemClock};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink, StorageOp};
use crate::error::CoreError;
use crate::events::Event;
use crate::interval::{merge_intervals, timeline_segments, total_seconds, Interval, TimelineSegment};
use crate::storage::{storage_key, ProgressRecord, ProgressStore, TrackerConfig};

/// Configures and hydrates an [`IntervalProgressTracker`].
pub struct TrackerBuilder<C = SystemClock> {
    video_id: String,
    config: TrackerConfig,
    clock: C,
    sink: Box<dyn DiagnosticSink>,
}

impl TrackerBuilder<SystemClock> {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            config: TrackerConfig::default(),
            clock: SystemClock,
            sink: Box::new(LogSink),
        }
    }
}

impl<C: Clock> TrackerBuilder<C> {
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn throttle_ms(mut self, throttle_ms: u64) -> Self {
        self.config.throttle_ms = throttle_ms;
        self
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> TrackerBuilder<C2> {
        TrackerBuilder {
            video_id: self.video_id,
            config: self.config,
            clock,
            sink: self.sink,
        }
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Build the tracker, hydrating state from `store`.
    ///
    /// Never fails: a missing, unreadable or malformed record yields empty
    /// progress and, for the latter two, a diagnostic.
    pub fn build<S: ProgressStore>(self, store: S) -> IntervalProgressTracker<S, C> {
        let key = storage_key(&self.config.key_prefix, &self.video_id);
        let mut tracker = IntervalProgressTracker {
            video_id: self.video_id,
            key,
            store,
            clock: self.clock,
            sink: self.sink,
            throttle_ms: self.config.throttle_ms,
            intervals: Vec::new(),
            total_duration: 0.0,
            is_watching: false,
            current: None,
            last_update_ms: None,
            persisted_resume: 0.0,
        };
        tracker.hydrate();
        tracker
    }
}

/// Watched-interval tracker for a single video.
///
/// Committed intervals are always sorted and strictly gapped. Every change to
/// them is written back to the store; store failures are reported to the
/// diagnostic sink and never interrupt playback.
pub struct IntervalProgressTracker<S, C = SystemClock> {
    video_id: String,
    key: String,
    store: S,
    clock: C,
    sink: Box<dyn DiagnosticSink>,
    throttle_ms: u64,
    intervals: Vec<Interval>,
    total_duration: f64,
    is_watching: bool,
    current: Option<Interval>,
    /// Clock reading of the last accepted `update_watching`.
    last_update_ms: Option<u64>,
    /// End of the last interval known to be in the store.
    persisted_resume: f64,
}

impl<S: ProgressStore> IntervalProgressTracker<S, SystemClock> {
    /// Tracker with default config, the system clock and a `log` sink.
    pub fn new(video_id: impl Into<String>, store: S) -> Self {
        TrackerBuilder::new(video_id).build(store)
    }
}

impl<S: ProgressStore, C: Clock> IntervalProgressTracker<S, C> {
    // ── Queries ──────────────────────────────────────────────────────

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn is_watching(&self) -> bool {
        self.is_watching
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn current_interval(&self) -> Option<Interval> {
        self.current
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn throttle_ms(&self) -> u64 {
        self.throttle_ms
    }

    /// Whole seconds of distinct content watched, clamped to the duration.
    ///
    /// The open interval is not counted until it is committed.
    pub fn unique_seconds_watched(&self) -> u64 {
        self.unique_seconds().round() as u64
    }

    /// 0 ..= 100. Zero while the duration is unknown.
    pub fn progress_percentage(&self) -> u8 {
        if self.total_duration <= 0.0 {
            return 0;
        }
        let pct = self.unique_seconds() / self.total_duration * 100.0;
        pct.round().clamp(0.0, 100.0) as u8
    }

    /// Where a returning viewer should continue: the end of the last
    /// persisted interval, or 0.
    pub fn resume_position(&self) -> f64 {
        self.persisted_resume
    }

    /// Committed intervals laid out as fractions of the duration.
    pub fn timeline_segments(&self) -> Vec<TimelineSegment> {
        timeline_segments(&self.intervals, self.total_duration)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            video_id: self.video_id.clone(),
            is_watching: self.is_watching,
            intervals: self.intervals.clone(),
            current_interval: self.current,
            total_duration: self.total_duration,
            unique_seconds_watched: self.unique_seconds_watched(),
            progress_percentage: self.progress_percentage(),
            resume_position: self.resume_position(),
            at: Utc::now(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the media duration once metadata is known. Replaces any earlier
    /// value, including one loaded from storage.
    pub fn init(&mut self, duration: f64) -> Option<Event> {
        if !duration.is_finite() || duration < 0.0 {
            return None;
        }
        self.total_duration = duration;
        Some(Event::DurationSet {
            total_duration: duration,
            at: Utc::now(),
        })
    }

    pub fn start_watching(&mut self, position: f64) -> Option<Event> {
        if self.is_watching {
            return None; // Already watching.
        }
        let position = sanitize_position(position)?;
        self.is_watching = true;
        self.current = Some(Interval::at(position));
        self.last_update_ms = None;
        Some(Event::WatchingStarted {
            position,
            at: Utc::now(),
        })
    }

    /// Extend the open interval to `position`.
    ///
    /// Accepted at most once per throttle window; the first update after a
    /// start is always accepted. Returns `None` when idle or throttled.
    pub fn update_watching(&mut self, position: f64) -> Option<Event> {
        if !self.is_watching {
            return None;
        }
        let position = sanitize_position(position)?;
        let now = self.clock.now_ms();
        if let Some(last) = self.last_update_ms {
            if now.saturating_sub(last) < self.throttle_ms {
                return None;
            }
        }
        let current = self.current.get_or_insert(Interval::at(position));
        current.end = position;
        self.last_update_ms = Some(now);
        Some(Event::PositionUpdated {
            position,
            at: Utc::now(),
        })
    }

    pub fn stop_watching(&mut self) -> Option<Event> {
        if !self.is_watching {
            return None;
        }
        let committed = self.commit_current();
        Some(Event::WatchingStopped {
            committed,
            at: Utc::now(),
        })
    }

    /// Close the open interval (if any) and start a fresh one at `position`.
    ///
    /// The skipped span is never counted: the new interval starts exactly at
    /// the seek target with zero width.
    pub fn handle_seek(&mut self, position: f64) -> Option<Event> {
        let position = sanitize_position(position)?;
        let committed = if self.is_watching {
            self.commit_current()
        } else {
            None
        };
        self.start_watching(position);
        Some(Event::Seeked {
            committed,
            to: position,
            at: Utc::now(),
        })
    }

    /// Forget all progress for this video, in memory and in the store.
    /// The duration is kept.
    pub fn reset_progress(&mut self) -> Option<Event> {
        self.intervals.clear();
        self.current = None;
        self.is_watching = false;
        self.last_update_ms = None;
        match self.store.remove(&self.key) {
            Ok(()) => self.persisted_resume = 0.0,
            Err(e) => self.report(StorageOp::Remove, e.into()),
        }
        Some(Event::ProgressReset { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Rounded watched sum, clamped to `[0, total_duration]`. Not truncated,
    /// so a fractional duration watched in full still yields 100%.
    fn unique_seconds(&self) -> f64 {
        total_seconds(&self.intervals)
            .round()
            .min(self.total_duration)
            .max(0.0)
    }

    /// Move the open interval into the committed set. Zero-width intervals
    /// are dropped. Always leaves the tracker idle.
    fn commit_current(&mut self) -> Option<Interval> {
        let committed = self
            .current
            .take()
            .and_then(|open| Interval::new(open.start, open.end));
        self.is_watching = false;
        self.last_update_ms = None;

        let interval = committed?;
        self.intervals.push(interval);
        self.intervals = merge_intervals(std::mem::take(&mut self.intervals));
        log::debug!(
            "{}: committed {:.3}..{:.3}, {} interval(s) after merge",
            self.video_id,
            interval.start,
            interval.end,
            self.intervals.len()
        );
        self.persist();
        Some(interval)
    }

    fn hydrate(&mut self) {
        match ProgressRecord::load(&self.store, &self.key) {
            Ok(Some(record)) => {
                self.persisted_resume =
                    record.watched_intervals.last().map(|i| i.end).unwrap_or(0.0);
                self.intervals = record.watched_intervals;
                self.total_duration = record.total_duration;
            }
            Ok(None) => {}
            Err(e) => self.report(StorageOp::Load, e),
        }
    }

    fn persist(&mut self) {
        let record = ProgressRecord::new(self.intervals.clone(), self.total_duration);
        match record.save(&mut self.store, &self.key) {
            Ok(()) => self.persisted_resume = record.last_position,
            Err(e) => self.report(StorageOp::Save, e),
        }
    }

    fn report(&self, op: StorageOp, error: CoreError) {
        let key = self.key.clone();
        let diagnostic = match error {
            CoreError::MalformedRecord { source, .. } => Diagnostic::MalformedRecord {
                key,
                message: source.to_string(),
            },
            other => Diagnostic::StorageUnavailable {
                key,
                op,
                message: other.to_string(),
            },
        };
        self.sink.report(diagnostic);
    }
}

impl<S, C> std::fmt::Debug for IntervalProgressTracker<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalProgressTracker")
            .field("video_id", &self.video_id)
            .field("is_watching", &self.is_watching)
            .field("intervals", &self.intervals)
            .field("current", &self.current)
            .field("total_duration", &self.total_duration)
            .finish_non_exhaustive()
    }
}

/// Non-finite positions are rejected; negative ones clamp to the start.
fn sanitize_position(position: f64) -> Option<f64> {
    position.is_finite().then(|| position.max(0.0))
}
