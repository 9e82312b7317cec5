//! RRULE expansion — turns a recurrence rule plus a base template into
//! concrete occurrences within a bounded window, applying per-date
//! exceptions.
//!
//! Wraps the `rrule` crate (v0.13). The booking's own `[start, end)` is
//! the first occurrence and supplies the duration for every generated
//! occurrence; exceptions skip or replace the occurrence falling on their
//! UTC calendar date.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rrule::{RRuleSet, Tz};

use crate::error::{Result, RuleError};

/// Backstop against pathological rules (e.g. minutely over a wide window).
/// Bounded caller windows stay far below this.
const MAX_OCCURRENCES_PER_WINDOW: u16 = 10_000;

/// One materialized interval produced by a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A per-date override on a recurring booking.
///
/// Replacement fields are both present (the occurrence on `date` is
/// rewritten to `[replace_start, replace_end)`) or both absent (the
/// occurrence is skipped). The storage layer enforces the pairing; the
/// expander treats a half-set pair as a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleException {
    pub date: NaiveDate,
    pub replace_start: Option<DateTime<Utc>>,
    pub replace_end: Option<DateTime<Utc>>,
}

/// Validate rule text at write time. Parse only; nothing is expanded.
///
/// # Errors
/// Returns `RuleError::InvalidRule` if the text is empty or unparseable.
pub fn validate_rule(rule: &str, base_start: DateTime<Utc>) -> Result<()> {
    parse_rule_set(rule, base_start).map(|_| ())
}

/// True iff the rule text carries neither COUNT nor UNTIL — the rule
/// generates occurrences forever. Flagged at write time for bookkeeping;
/// expansion is always against a bounded window, so infiniteness never
/// turns into unbounded work.
pub fn rule_is_infinite(rule: &str) -> bool {
    let upper = rule.to_uppercase();
    !upper.contains("COUNT=") && !upper.contains("UNTIL=")
}

/// Expand a recurrence rule into occurrences whose starts fall within
/// `[window_start, window_end]` (inclusive both ends), applying exceptions.
///
/// # Arguments
/// - `rule` — RFC 5545 rule text: a bare `FREQ=...` property value, an
///   `RRULE:` line, or a full block carrying its own `DTSTART`. When no
///   DTSTART is present, `base_start` is bound as the series origin.
/// - `base_start`, `base_end` — the template interval; `base_end -
///   base_start` is the duration of every generated occurrence.
/// - `window_start`, `window_end` — the expansion window. Callers must
///   pass a bounded window; infinite rules are expanded lazily against it.
/// - `exceptions` — per-date overrides, keyed by the occurrence start's
///   UTC calendar date. Duplicates on one date: the last wins.
///
/// Occurrences are returned in the order the rule produces them.
///
/// # Errors
/// Returns `RuleError::InvalidRule` if the text is empty or unparseable.
pub fn expand_occurrences(
    rule: &str,
    base_start: DateTime<Utc>,
    base_end: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    exceptions: &[RuleException],
) -> Result<Vec<Occurrence>> {
    let duration = base_end - base_start;
    let rule_set = parse_rule_set(rule, base_start)?
        .after(window_start.with_timezone(&Tz::UTC))
        .before(window_end.with_timezone(&Tz::UTC));

    let starts = rule_set.all(MAX_OCCURRENCES_PER_WINDOW);

    let overrides = exception_map(exceptions);

    let mut occurrences = Vec::with_capacity(starts.dates.len());
    for dt in starts.dates {
        let start = dt.with_timezone(&Utc);
        match overrides.get(&start.date_naive()) {
            Some(Some((replace_start, replace_end))) => occurrences.push(Occurrence {
                start: *replace_start,
                end: *replace_end,
            }),
            Some(None) => {}
            None => occurrences.push(Occurrence {
                start,
                end: start + duration,
            }),
        }
    }

    Ok(occurrences)
}

/// Key exceptions by date, last write winning on duplicates. A value of
/// `Some((s, e))` replaces the occurrence; `None` skips it.
fn exception_map(
    exceptions: &[RuleException],
) -> HashMap<NaiveDate, Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let mut map = HashMap::with_capacity(exceptions.len());
    for exc in exceptions {
        let replacement = match (exc.replace_start, exc.replace_end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        };
        map.insert(exc.date, replacement);
    }
    map
}

/// Build the iCalendar block and parse it.
///
/// Rule text without its own DTSTART gets `base_start` bound as the series
/// origin; a leading `RRULE:` tag is accepted either way.
fn parse_rule_set(rule: &str, base_start: DateTime<Utc>) -> Result<RRuleSet> {
    let trimmed = rule.trim();
    if trimmed.is_empty() {
        return Err(RuleError::InvalidRule("empty rule text".to_string()));
    }

    let upper = trimmed.to_uppercase();
    let block = if upper.contains("DTSTART") {
        trimmed.to_string()
    } else {
        let body = if upper.starts_with("RRULE:") {
            &trimmed["RRULE:".len()..]
        } else {
            trimmed
        };
        format!(
            "DTSTART:{}\nRRULE:{}",
            base_start.format("%Y%m%dT%H%M%SZ"),
            body
        )
    };

    block
        .parse::<RRuleSet>()
        .map_err(|e| RuleError::InvalidRule(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_rule_detection() {
        assert!(rule_is_infinite("FREQ=WEEKLY;BYDAY=MO"));
        assert!(!rule_is_infinite("FREQ=WEEKLY;BYDAY=MO;COUNT=4"));
        assert!(!rule_is_infinite("FREQ=DAILY;UNTIL=20260101T000000Z"));
    }

    #[test]
    fn half_set_replacement_is_a_skip() {
        let map = exception_map(&[RuleException {
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            replace_start: Some(Utc::now()),
            replace_end: None,
        }]);
        assert_eq!(map.values().next(), Some(&None));
    }
}
