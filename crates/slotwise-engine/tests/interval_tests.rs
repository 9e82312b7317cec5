//! Tests for interval merge and gap computation.

use chrono::{DateTime, TimeZone, Utc};
use slotwise_engine::{gaps, merge, Interval};

fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, hour, min, 0).unwrap()
}

fn iv(day: u32, h1: u32, m1: u32, h2: u32, m2: u32) -> Interval {
    Interval::new(at(day, h1, m1), at(day, h2, m2))
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[test]
fn merge_coalesces_overlapping_intervals() {
    let merged = merge(&[iv(1, 10, 0, 11, 0), iv(1, 10, 30, 11, 30)]);
    assert_eq!(merged, vec![iv(1, 10, 0, 11, 30)]);
}

#[test]
fn merge_coalesces_touching_intervals() {
    // [10:00, 10:30) + [10:30, 11:00) → one block for gap purposes.
    let merged = merge(&[iv(1, 10, 30, 11, 0), iv(1, 10, 0, 10, 30)]);
    assert_eq!(merged, vec![iv(1, 10, 0, 11, 0)]);
}

#[test]
fn merge_keeps_contained_interval_absorbed() {
    let merged = merge(&[iv(1, 9, 0, 17, 0), iv(1, 10, 0, 11, 0)]);
    assert_eq!(merged, vec![iv(1, 9, 0, 17, 0)]);
}

#[test]
fn merge_of_empty_list_is_empty() {
    assert!(merge(&[]).is_empty());
}

// ---------------------------------------------------------------------------
// Gaps
// ---------------------------------------------------------------------------

#[test]
fn empty_busy_list_yields_whole_window() {
    // A resource with no bookings over one day: a single 1440-minute slot.
    let slots = gaps(&[], at(1, 0, 0), at(2, 0, 0), 60);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(1, 0, 0));
    assert_eq!(slots[0].end, at(2, 0, 0));
    assert_eq!(slots[0].duration_minutes, 1440);
}

#[test]
fn minimum_slot_filters_short_gaps() {
    // Bookings [10:00,10:30) and [10:45,11:00), window [10:00,12:00),
    // minimum 60 → only [11:00,12:00) survives; the 15-minute gap is dropped.
    let merged = merge(&[iv(1, 10, 0, 10, 30), iv(1, 10, 45, 11, 0)]);
    let slots = gaps(&merged, at(1, 10, 0), at(1, 12, 0), 60);

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(1, 11, 0));
    assert_eq!(slots[0].end, at(1, 12, 0));
    assert_eq!(slots[0].duration_minutes, 60);
}

#[test]
fn leading_and_trailing_gaps_emitted() {
    let merged = merge(&[iv(1, 10, 0, 11, 0)]);
    let slots = gaps(&merged, at(1, 8, 0), at(1, 17, 0), 0);

    assert_eq!(slots.len(), 2);
    assert_eq!((slots[0].start, slots[0].end), (at(1, 8, 0), at(1, 10, 0)));
    assert_eq!((slots[1].start, slots[1].end), (at(1, 11, 0), at(1, 17, 0)));
}

#[test]
fn busy_interval_spilling_over_window_edges_is_clamped() {
    // Busy [day1 23:00, day2 01:00) against window [day2 00:00, day2 12:00):
    // the gap starts where the busy block ends, not at the window start.
    let busy = vec![Interval::new(at(1, 23, 0), at(2, 1, 0))];
    let slots = gaps(&busy, at(2, 0, 0), at(2, 12, 0), 0);

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(2, 1, 0));
    assert_eq!(slots[0].end, at(2, 12, 0));
}

#[test]
fn window_fully_covered_yields_no_gaps() {
    let busy = vec![iv(1, 8, 0, 18, 0)];
    assert!(gaps(&busy, at(1, 9, 0), at(1, 17, 0), 0).is_empty());
}

#[test]
fn zero_minimum_keeps_every_gap() {
    let merged = merge(&[iv(1, 10, 0, 10, 30), iv(1, 10, 45, 11, 0)]);
    let slots = gaps(&merged, at(1, 10, 0), at(1, 12, 0), 0);

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].duration_minutes, 15);
    assert_eq!(slots[1].duration_minutes, 60);
}
