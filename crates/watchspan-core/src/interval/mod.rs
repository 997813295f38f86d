//! Watched intervals and the merge pass that keeps them disjoint.

mod merge;
mod timeline;

pub use merge::{merge_intervals, total_seconds};
pub use timeline::{timeline_segments, TimelineSegment};

use serde::{Deserialize, Serialize};

/// A closed span `[start, end]` of media watched contiguously, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Create an interval with positive width.
    ///
    /// Returns `None` for non-finite bounds or when `end <= start`; zero-length
    /// spans are never stored.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        let interval = Self { start, end };
        interval.is_valid().then_some(interval)
    }

    /// A zero-width interval anchored at `position`, used for the open span
    /// while watching.
    pub(crate) fn at(position: f64) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// True when `other` begins at or before this interval's end.
    ///
    /// Assumes `self.start <= other.start`, which holds during the sorted sweep.
    pub fn touches_or_overlaps(&self, other: &Interval) -> bool {
        self.end >= other.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_and_negative_width() {
        assert!(Interval::new(5.0, 5.0).is_none());
        assert!(Interval::new(10.0, 4.0).is_none());
        assert!(Interval::new(f64::NAN, 4.0).is_none());
        assert!(Interval::new(0.0, f64::INFINITY).is_none());
        assert_eq!(
            Interval::new(1.0, 2.5),
            Some(Interval { start: 1.0, end: 2.5 })
        );
    }

    #[test]
    fn touching_counts_as_overlap() {
        let a = Interval { start: 0.0, end: 10.0 };
        let b = Interval { start: 10.0, end: 20.0 };
        let c = Interval { start: 10.5, end: 20.0 };
        assert!(a.touches_or_overlaps(&b));
        assert!(!a.touches_or_overlaps(&c));
    }

    #[test]
    fn serializes_as_plain_start_end_object() {
        let json = serde_json::to_string(&Interval { start: 1.5, end: 3.0 }).unwrap();
        assert_eq!(json, r#"{"start":1.5,"end":3.0}"#);
    }
}
