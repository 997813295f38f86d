//! Fractional layout of watched intervals for a progress bar.
//!
//! Drawing is left to the host; this only yields where each watched span sits
//! along the media's length.

use serde::{Deserialize, Serialize};

use super::Interval;

/// Placement of one watched span, as fractions of the total duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub offset_fraction: f64,
    pub width_fraction: f64,
}

/// Map intervals onto `[0, 1]` fractions of `total_duration`.
///
/// Returns nothing when the duration is unknown (`<= 0` or non-finite).
/// Spans running past the end are cut at `1.0`; spans lying wholly past the
/// end are dropped.
pub fn timeline_segments(intervals: &[Interval], total_duration: f64) -> Vec<TimelineSegment> {
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Vec::new();
    }

    intervals
        .iter()
        .filter_map(|interval| {
            let offset = (interval.start / total_duration).clamp(0.0, 1.0);
            let end = (interval.end / total_duration).clamp(0.0, 1.0);
            let width = end - offset;
            (width > 0.0).then_some(TimelineSegment {
                offset_fraction: offset,
                width_fraction: width,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_of_duration() {
        let segments = timeline_segments(
            &[Interval { start: 0.0, end: 25.0 }, Interval { start: 50.0, end: 100.0 }],
            100.0,
        );
        assert_eq!(
            segments,
            vec![
                TimelineSegment { offset_fraction: 0.0, width_fraction: 0.25 },
                TimelineSegment { offset_fraction: 0.5, width_fraction: 0.5 },
            ]
        );
    }

    #[test]
    fn unknown_duration_yields_nothing() {
        let intervals = [Interval { start: 0.0, end: 10.0 }];
        assert!(timeline_segments(&intervals, 0.0).is_empty());
        assert!(timeline_segments(&intervals, f64::NAN).is_empty());
    }

    #[test]
    fn overhang_is_cut_at_end() {
        let segments = timeline_segments(
            &[Interval { start: 80.0, end: 120.0 }, Interval { start: 130.0, end: 140.0 }],
            100.0,
        );
        assert_eq!(segments.len(), 1);
        assert!((segments[0].offset_fraction - 0.8).abs() < 1e-9);
        assert!((segments[0].width_fraction - 0.2).abs() < 1e-9);
    }
}
