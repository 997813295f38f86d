use super::Interval;

/// Union overlapping or touching intervals into maximal disjoint spans.
///
/// Invalid intervals (non-finite, zero or negative width) are dropped first.
/// The result is sorted by `start` and strictly gapped: `end[i] < start[i + 1]`.
/// Ties on `start` are ordered by larger `end` first so the sweep is
/// deterministic.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(Interval::is_valid);
    intervals.sort_by(|a, b| a.start.total_cmp(&b.start).then(b.end.total_cmp(&a.end)));

    let mut merged = Vec::with_capacity(intervals.len());
    let mut iter = intervals.into_iter();
    let Some(mut running) = iter.next() else {
        return merged;
    };

    for next in iter {
        if running.touches_or_overlaps(&next) {
            running.end = running.end.max(next.end);
        } else {
            merged.push(running);
            running = next;
        }
    }
    merged.push(running);

    merged
}

/// Sum of interval widths in seconds. No rounding or clamping.
pub fn total_seconds(intervals: &[Interval]) -> f64 {
    intervals.iter().map(Interval::duration).sum()
}
