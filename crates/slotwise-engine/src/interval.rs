//! Half-open interval primitives.
//!
//! Overlap test, merge of overlapping/touching intervals, and gap
//! computation against a query window. Merge and gaps are the building
//! blocks for availability: busy instances go in, free slots come out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` on the UTC instant line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
    /// Equal endpoints (`a.end == b.start`) are adjacency, not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whole minutes spanned by the interval (floor of the millisecond delta).
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A free interval within a query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Merge overlapping or touching intervals into a sorted, disjoint list.
///
/// Sorts by `(start, end)`, then left-folds: an interval is coalesced into
/// the previous one when `start <= last.end` — touching intervals merge,
/// so the output is usable for gap computation.
pub fn merge(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.to_vec();
    sorted.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        if let Some(last) = merged.last_mut() {
            if iv.start <= last.end {
                last.end = last.end.max(iv.end);
                continue;
            }
        }
        merged.push(iv);
    }
    merged
}

/// Compute the gaps a merged busy list leaves within `[window_start,
/// window_end)`, keeping only gaps of at least `min_minutes`.
///
/// `merged` must be sorted and disjoint (the output of [`merge`]).
/// An empty busy list yields the whole window, if it qualifies. Busy
/// intervals reaching outside the window are clamped by the cursor walk.
pub fn gaps(
    merged: &[Interval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    min_minutes: i64,
) -> Vec<Gap> {
    let mut out = Vec::new();
    let mut cursor = window_start;

    for busy in merged {
        if busy.start >= window_end {
            break;
        }
        if cursor < busy.start {
            push_gap(&mut out, cursor, busy.start.min(window_end), min_minutes);
        }
        cursor = cursor.max(busy.end);
    }

    if cursor < window_end {
        push_gap(&mut out, cursor, window_end, min_minutes);
    }

    out
}

fn push_gap(out: &mut Vec<Gap>, start: DateTime<Utc>, end: DateTime<Utc>, min_minutes: i64) {
    let duration_minutes = (end - start).num_minutes();
    if duration_minutes >= min_minutes {
        out.push(Gap {
            start,
            end,
            duration_minutes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iv(h1: u32, m1: u32, h2: u32, m2: u32) -> Interval {
        Interval::new(
            Utc.with_ymd_and_hms(2025, 12, 2, h1, m1, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 2, h2, m2, 0).unwrap(),
        )
    }

    #[test]
    fn adjacency_is_not_overlap() {
        let a = iv(10, 0, 11, 0);
        let b = iv(11, 0, 12, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn partial_overlap_detected() {
        let a = iv(10, 0, 11, 0);
        let b = iv(10, 30, 11, 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_intervals_merge() {
        let merged = merge(&[iv(10, 0, 11, 0), iv(11, 0, 12, 0)]);
        assert_eq!(merged, vec![iv(10, 0, 12, 0)]);
    }

    #[test]
    fn disjoint_intervals_stay_apart() {
        let merged = merge(&[iv(12, 0, 13, 0), iv(10, 0, 11, 0)]);
        assert_eq!(merged, vec![iv(10, 0, 11, 0), iv(12, 0, 13, 0)]);
    }
}
