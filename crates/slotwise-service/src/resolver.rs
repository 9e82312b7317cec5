//! Busy-set resolution.
//!
//! For a (resource, window) pair, produces every materialized interval
//! that overlaps the window: single bookings straight from storage, plus
//! recurring bookings expanded through the engine with their exceptions
//! applied.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgConnection;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use slotwise_engine::{expand_occurrences, Interval, RuleException};
use slotwise_store::repository;

use crate::cancel::race;
use crate::error::Result;

/// A materialized occupied interval on a resource — a single booking or
/// one expanded occurrence of a recurring booking.
#[derive(Debug, Clone, Serialize)]
pub struct BusyInstance {
    pub booking_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_recurring: bool,
}

impl BusyInstance {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Resolve every busy instance on `resource_id` overlapping
/// `[window_start, window_end)`, sorted by start.
///
/// Recurring bookings are expanded over `[window_start - D, window_end)`
/// (D = template duration) so an occurrence that starts before the window
/// but runs into it is still produced, then filtered to strict overlap
/// with the original window.
///
/// A persisted rule that no longer parses is logged and skipped — one bad
/// row never aborts the query.
pub async fn resolve_busy(
    conn: &mut PgConnection,
    resource_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<Vec<BusyInstance>> {
    let singles = race(
        cancel,
        repository::single_bookings_overlapping(&mut *conn, resource_id, window_start, window_end),
    )
    .await?;

    let mut busy: Vec<BusyInstance> = singles
        .into_iter()
        .map(|row| BusyInstance {
            booking_id: row.id,
            start: row.start_time,
            end: row.end_time,
            is_recurring: false,
        })
        .collect();

    let recurring = race(
        cancel,
        repository::recurring_bookings_starting_before(&mut *conn, resource_id, window_end),
    )
    .await?;

    for entry in recurring {
        let template_duration = entry.booking.end_time - entry.booking.start_time;
        let exceptions: Vec<RuleException> = entry
            .exceptions
            .iter()
            .map(|row| RuleException {
                date: row.except_date,
                replace_start: row.replace_start,
                replace_end: row.replace_end,
            })
            .collect();

        let expanded = expand_occurrences(
            &entry.rrule,
            entry.booking.start_time,
            entry.booking.end_time,
            window_start - template_duration,
            window_end,
            &exceptions,
        );

        match expanded {
            Ok(occurrences) => {
                for occ in occurrences {
                    if occ.start < window_end && occ.end > window_start {
                        busy.push(BusyInstance {
                            booking_id: entry.booking.id,
                            start: occ.start,
                            end: occ.end,
                            is_recurring: true,
                        });
                    }
                }
            }
            Err(err) => {
                warn!(
                    booking_id = %entry.booking.id,
                    error = %err,
                    "skipping recurring booking whose persisted rule fails to parse"
                );
            }
        }
    }

    busy.sort_by_key(|instance| instance.start);
    Ok(busy)
}
