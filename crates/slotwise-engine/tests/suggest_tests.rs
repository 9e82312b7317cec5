//! Tests for the next-available forward scan.

use chrono::{DateTime, TimeZone, Utc};
use slotwise_engine::{merge, next_available, Interval};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 2, hour, min, 0).unwrap()
}

fn iv(h1: u32, m1: u32, h2: u32, m2: u32) -> Interval {
    Interval::new(at(h1, m1), at(h2, m2))
}

#[test]
fn first_suggestion_starts_where_the_blocker_ends() {
    // Busy [10:00, 11:00); ask for an hour from 10:30.
    // The scan jumps to 11:00 and suggests [11:00, 12:00) first.
    let busy = merge(&[iv(10, 0, 11, 0)]);
    let scan = next_available(&busy, at(10, 30), 60, 720, 15, 5);

    assert_eq!(scan.suggestions.len(), 5);
    assert_eq!(scan.suggestions[0], iv(11, 0, 12, 0));
    // After the first hit the cursor steps by 15 minutes.
    assert_eq!(scan.suggestions[1], iv(11, 15, 12, 15));
    assert_eq!(scan.suggestions[2], iv(11, 30, 12, 30));
}

#[test]
fn adjacent_slot_is_not_a_conflict() {
    // Busy [10:00, 11:00); a request starting exactly at 11:00 fits.
    let busy = merge(&[iv(10, 0, 11, 0)]);
    let scan = next_available(&busy, at(11, 0), 60, 720, 15, 1);

    assert_eq!(scan.suggestions[0], iv(11, 0, 12, 0));
}

#[test]
fn scan_jumps_each_obstruction_in_turn() {
    // Two busy blocks with a 30-minute gap that cannot hold a 60-minute
    // candidate; the first fit is after the second block.
    let busy = merge(&[iv(9, 0, 10, 0), iv(10, 30, 12, 0)]);
    let scan = next_available(&busy, at(9, 0), 60, 720, 15, 1);

    assert_eq!(scan.suggestions[0], iv(12, 0, 13, 0));
}

#[test]
fn gap_wide_enough_is_taken_before_jumping() {
    // A 60-minute hole between blocks fits a 60-minute candidate exactly.
    let busy = merge(&[iv(9, 0, 10, 0), iv(11, 0, 12, 0)]);
    let scan = next_available(&busy, at(9, 0), 60, 720, 15, 1);

    assert_eq!(scan.suggestions[0], iv(10, 0, 11, 0));
}

#[test]
fn quota_limits_suggestions() {
    let scan = next_available(&[], at(10, 0), 30, 720, 15, 2);
    assert_eq!(scan.suggestions.len(), 2);
}

#[test]
fn horizon_bounds_the_scan() {
    // One-hour horizon fully occupied: no suggestions, cursor at the
    // blocker's end.
    let busy = merge(&[iv(10, 0, 12, 0)]);
    let scan = next_available(&busy, at(10, 0), 60, 1, 15, 5);

    assert!(scan.suggestions.is_empty());
    assert_eq!(scan.searched_until, at(12, 0));
}

#[test]
fn searched_until_reports_cursor_position() {
    let scan = next_available(&[], at(10, 0), 60, 720, 15, 3);
    // Three hits, cursor stepped 15 minutes past the last start.
    assert_eq!(scan.searched_until, at(10, 45));
}

#[test]
fn candidate_overlapping_window_tail_still_suggested() {
    // The scan constrains candidate starts, not ends; a candidate running
    // past the horizon is still emitted when its start precedes it.
    let scan = next_available(&[], at(10, 0), 120, 1, 30, 5);
    assert_eq!(scan.suggestions[0], Interval::new(at(10, 0), at(12, 0)));
}
