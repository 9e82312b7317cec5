//! Forward scan for the next available slots.
//!
//! Walks a cursor from the desired start, jumping past busy intervals,
//! collecting candidate slots of the requested duration until the horizon
//! or the suggestion quota is reached.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Result of a forward scan: the slots found and how far the cursor got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionScan {
    pub suggestions: Vec<Interval>,
    pub searched_until: DateTime<Utc>,
}

/// Scan forward from `desired_start` for up to `max_suggestions` free
/// slots of `duration_minutes`.
///
/// `busy` must be merged and sorted (the output of [`crate::merge`] over
/// the busy set covering `[desired_start, desired_start + horizon_hours)`).
///
/// The first suggestion is the earliest non-conflicting slot at or after
/// `desired_start`; after a hit the cursor advances by `step_minutes`, so
/// consecutive suggestions in open space are `step_minutes` apart. On a
/// collision the cursor jumps to the end of the obstruction rather than
/// stepping, which keeps the scan linear in `|busy|`.
pub fn next_available(
    busy: &[Interval],
    desired_start: DateTime<Utc>,
    duration_minutes: i64,
    horizon_hours: i64,
    step_minutes: i64,
    max_suggestions: usize,
) -> SuggestionScan {
    let search_end = desired_start + Duration::hours(horizon_hours);
    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(step_minutes);

    let mut suggestions = Vec::new();
    let mut cursor = desired_start;

    while cursor < search_end && suggestions.len() < max_suggestions {
        let candidate = Interval::new(cursor, cursor + duration);
        match busy.iter().find(|m| m.overlaps(&candidate)) {
            // Obstructed: jump past the blocker. Its end is strictly after
            // the cursor, so the loop always advances.
            Some(blocker) => cursor = blocker.end,
            None => {
                suggestions.push(candidate);
                cursor += step;
            }
        }
    }

    SuggestionScan {
        suggestions,
        searched_until: cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_busy_list_yields_stepped_slots() {
        let start = Utc.with_ymd_and_hms(2025, 12, 2, 10, 0, 0).unwrap();
        let scan = next_available(&[], start, 60, 24, 15, 3);

        assert_eq!(scan.suggestions.len(), 3);
        assert_eq!(scan.suggestions[0].start, start);
        assert_eq!(
            scan.suggestions[1].start,
            Utc.with_ymd_and_hms(2025, 12, 2, 10, 15, 0).unwrap()
        );
        assert_eq!(
            scan.suggestions[2].start,
            Utc.with_ymd_and_hms(2025, 12, 2, 10, 30, 0).unwrap()
        );
    }
}
