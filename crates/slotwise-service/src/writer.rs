//! Conflict-checked booking creation.
//!
//! Two write paths share one entry point: single bookings lean on the
//! store's range-exclusion constraint as the authority for overlap, while
//! recurring bookings are expanded over a validation window and checked
//! occurrence by occurrence under a per-resource row lock.
//!
//! A rejected create is not an error: it returns
//! [`CreateOutcome::Conflict`] carrying the clashing busy instances and
//! up to five next-available suggestions of the requested duration.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use slotwise_engine::{expand_occurrences, rule_is_infinite, validate_rule, Interval, RuleException};
use slotwise_store::{repository, BookingRow, NewBooking, NewException, StoreError};

use crate::availability::{self, SuggestionParams};
use crate::cancel::{acquire, begin, commit, race};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::resolver::{resolve_busy, BusyInstance};

/// A booking create request, single or recurring.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub resource_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub recurrence_rule: Option<String>,
    pub exceptions: Vec<BookingException>,
}

/// A per-date override, both as request input and as part of the created
/// record. Replacement fields are both set or both absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingException {
    pub date: NaiveDate,
    pub replace_start: Option<DateTime<Utc>>,
    pub replace_end: Option<DateTime<Utc>>,
}

/// A created booking as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub exceptions: Vec<BookingException>,
}

/// One clashing busy instance. For recurring requests the entry also
/// names the candidate occurrence that clashed, so clients can tell which
/// instance of the series is the problem.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictEntry {
    pub booking_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_recurring: bool,
    pub occurrence_start: Option<DateTime<Utc>>,
    pub occurrence_end: Option<DateTime<Utc>>,
}

/// The structured rejection of a create: what clashed, and where the
/// caller could go instead. `next_available` may be empty when the search
/// horizon is fully booked.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub message: String,
    pub conflicts: Vec<ConflictEntry>,
    pub next_available: Vec<Interval>,
}

/// Result of a create attempt. Conflict is a success-typed value — the
/// request was well-formed and fully processed; the answer is "no".
#[derive(Debug)]
pub enum CreateOutcome {
    Created(BookingRecord),
    Conflict(ConflictReport),
}

/// Create a single or recurring booking on a resource.
///
/// Validation and rule parsing fail before any store work. The store's
/// exclusion constraint guards single inserts; recurring creates expand
/// over the configured validation window and check every occurrence under
/// the resource row lock.
pub async fn create_booking(
    pool: &PgPool,
    config: &ServiceConfig,
    request: BookingRequest,
    cancel: &CancellationToken,
) -> Result<CreateOutcome> {
    validate_request(&request)?;
    if let Some(rule) = &request.recurrence_rule {
        validate_rule(rule, request.start)?;
    }

    {
        let mut conn = acquire(pool, cancel).await?;
        race(
            cancel,
            repository::find_resource(&mut *conn, request.resource_id),
        )
        .await?
        .ok_or(ServiceError::ResourceNotFound(request.resource_id))?;
    }

    match request.recurrence_rule.clone() {
        None => create_single(pool, request, cancel).await,
        Some(rule) => create_recurring(pool, config, request, &rule, cancel).await,
    }
}

fn validate_request(request: &BookingRequest) -> Result<()> {
    if request.end <= request.start {
        return Err(ServiceError::validation(
            "end_time",
            "end_time must be after start_time",
        ));
    }
    if request.recurrence_rule.is_none() && !request.exceptions.is_empty() {
        return Err(ServiceError::validation(
            "exceptions",
            "exceptions are only valid on a recurring booking",
        ));
    }
    for (index, exc) in request.exceptions.iter().enumerate() {
        match (exc.replace_start, exc.replace_end) {
            (None, None) => {}
            (Some(start), Some(end)) if end > start => {}
            (Some(_), Some(_)) => {
                return Err(ServiceError::validation(
                    format!("exceptions[{index}].replace_end"),
                    "replace_end must be after replace_start",
                ));
            }
            _ => {
                return Err(ServiceError::validation(
                    format!("exceptions[{index}]"),
                    "replace_start and replace_end must both be set or both be absent",
                ));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Single bookings
// ---------------------------------------------------------------------------

async fn create_single(
    pool: &PgPool,
    request: BookingRequest,
    cancel: &CancellationToken,
) -> Result<CreateOutcome> {
    let candidate = Interval::new(request.start, request.end);

    let mut tx = begin(pool, cancel).await?;

    // Advisory pre-check so a plain overlap gets the structured conflict
    // answer without tripping the constraint. The exclusion constraint
    // stays the authority under concurrency.
    let busy = resolve_busy(
        &mut *tx,
        request.resource_id,
        request.start,
        request.end,
        cancel,
    )
    .await?;
    let conflicts = overlapping_entries(&busy, candidate, None);
    if !conflicts.is_empty() {
        drop(tx);
        let report = conflict_report(pool, &request, conflicts, cancel).await?;
        return Ok(CreateOutcome::Conflict(report));
    }

    let inserted = race(
        cancel,
        repository::insert_booking(&mut *tx, &new_booking_row(&request)),
    )
    .await;

    match inserted {
        Ok(row) => {
            commit(tx, cancel).await?;
            Ok(CreateOutcome::Created(record(row, None, Vec::new())))
        }
        Err(ServiceError::Storage(StoreError::Exclusion)) => {
            // Lost a race with a concurrent writer: recompute the busy set
            // on a fresh connection for the structured answer.
            drop(tx);
            let mut conn = acquire(pool, cancel).await?;
            let busy = resolve_busy(
                &mut *conn,
                request.resource_id,
                request.start,
                request.end,
                cancel,
            )
            .await?;
            drop(conn);
            let conflicts = overlapping_entries(&busy, candidate, None);
            let report = conflict_report(pool, &request, conflicts, cancel).await?;
            Ok(CreateOutcome::Conflict(report))
        }
        Err(other) => Err(other),
    }
}

// ---------------------------------------------------------------------------
// Recurring bookings
// ---------------------------------------------------------------------------

async fn create_recurring(
    pool: &PgPool,
    config: &ServiceConfig,
    request: BookingRequest,
    rule: &str,
    cancel: &CancellationToken,
) -> Result<CreateOutcome> {
    let validation_end = request.start + Duration::days(config.expansion_days);
    let rule_exceptions: Vec<RuleException> = request
        .exceptions
        .iter()
        .map(|exc| RuleException {
            date: exc.date,
            replace_start: exc.replace_start,
            replace_end: exc.replace_end,
        })
        .collect();

    let occurrences = expand_occurrences(
        rule,
        request.start,
        request.end,
        request.start,
        validation_end,
        &rule_exceptions,
    )?;

    let mut tx = begin(pool, cancel).await?;

    // Serialize recurring creates per resource for the whole
    // expand-check-insert span; the exclusion constraint only sees the
    // template row, not future occurrences.
    let locked = race(
        cancel,
        repository::lock_resource(&mut *tx, request.resource_id),
    )
    .await?;
    if !locked {
        return Err(ServiceError::ResourceNotFound(request.resource_id));
    }

    let enclosing = occurrences
        .iter()
        .map(|occ| occ.start)
        .min()
        .zip(occurrences.iter().map(|occ| occ.end).max());
    if let Some((check_start, check_end)) = enclosing {
        let busy = resolve_busy(&mut *tx, request.resource_id, check_start, check_end, cancel).await?;

        let mut conflicts = Vec::new();
        for occ in &occurrences {
            let candidate = Interval::new(occ.start, occ.end);
            conflicts.extend(overlapping_entries(&busy, candidate, Some((occ.start, occ.end))));
        }
        if !conflicts.is_empty() {
            drop(tx);
            let report = conflict_report(pool, &request, conflicts, cancel).await?;
            return Ok(CreateOutcome::Conflict(report));
        }
    }

    let inserted = race(
        cancel,
        repository::insert_booking(&mut *tx, &new_booking_row(&request)),
    )
    .await;
    let row = match inserted {
        Ok(row) => row,
        Err(ServiceError::Storage(StoreError::Exclusion)) => {
            // A concurrent single insert took the template slot after our
            // check; report it like any other occurrence clash.
            drop(tx);
            let mut conn = acquire(pool, cancel).await?;
            let busy = resolve_busy(
                &mut *conn,
                request.resource_id,
                request.start,
                request.end,
                cancel,
            )
            .await?;
            drop(conn);
            let candidate = Interval::new(request.start, request.end);
            let conflicts =
                overlapping_entries(&busy, candidate, Some((request.start, request.end)));
            let report = conflict_report(pool, &request, conflicts, cancel).await?;
            return Ok(CreateOutcome::Conflict(report));
        }
        Err(other) => return Err(other),
    };

    race(
        cancel,
        repository::insert_recurrence_rule(&mut *tx, row.id, rule, rule_is_infinite(rule)),
    )
    .await?;

    let new_exceptions: Vec<NewException> = request
        .exceptions
        .iter()
        .map(|exc| NewException {
            except_date: exc.date,
            replace_start: exc.replace_start,
            replace_end: exc.replace_end,
        })
        .collect();
    race(
        cancel,
        repository::insert_exceptions(&mut *tx, row.id, &new_exceptions),
    )
    .await?;

    commit(tx, cancel).await?;

    Ok(CreateOutcome::Created(record(
        row,
        Some(rule.to_string()),
        request.exceptions,
    )))
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn new_booking_row(request: &BookingRequest) -> NewBooking {
    NewBooking {
        resource_id: request.resource_id,
        start_time: request.start,
        end_time: request.end,
        metadata: request.metadata.clone(),
    }
}

fn record(
    row: BookingRow,
    recurrence_rule: Option<String>,
    exceptions: Vec<BookingException>,
) -> BookingRecord {
    BookingRecord {
        id: row.id,
        resource_id: row.resource_id,
        start: row.start_time,
        end: row.end_time,
        metadata: row.metadata,
        created_at: row.created_at,
        is_recurring: recurrence_rule.is_some(),
        recurrence_rule,
        exceptions,
    }
}

fn overlapping_entries(
    busy: &[BusyInstance],
    candidate: Interval,
    occurrence: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Vec<ConflictEntry> {
    busy.iter()
        .filter(|instance| instance.interval().overlaps(&candidate))
        .map(|instance| ConflictEntry {
            booking_id: instance.booking_id,
            start: instance.start,
            end: instance.end,
            is_recurring: instance.is_recurring,
            occurrence_start: occurrence.map(|(start, _)| start),
            occurrence_end: occurrence.map(|(_, end)| end),
        })
        .collect()
}

async fn conflict_report(
    pool: &PgPool,
    request: &BookingRequest,
    conflicts: Vec<ConflictEntry>,
    cancel: &CancellationToken,
) -> Result<ConflictReport> {
    let duration_minutes = (request.end - request.start).num_minutes();
    let scan = availability::next_available(
        pool,
        request.resource_id,
        request.start,
        duration_minutes,
        SuggestionParams::default(),
        cancel,
    )
    .await?;

    Ok(ConflictReport {
        message: "requested time conflicts with existing bookings".to_string(),
        conflicts,
        next_available: scan.suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(start_h: u32, end_h: u32) -> BookingRequest {
        BookingRequest {
            resource_id: Uuid::new_v4(),
            start: Utc.with_ymd_and_hms(2026, 1, 1, start_h, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, 1, end_h, 0, 0).unwrap(),
            metadata: serde_json::json!({}),
            recurrence_rule: None,
            exceptions: Vec::new(),
        }
    }

    #[test]
    fn rejects_inverted_interval() {
        let req = request(12, 10);
        assert!(matches!(
            validate_request(&req),
            Err(ServiceError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_exceptions_without_rule() {
        let mut req = request(10, 11);
        req.exceptions.push(BookingException {
            date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            replace_start: None,
            replace_end: None,
        });
        assert!(matches!(
            validate_request(&req),
            Err(ServiceError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_half_set_replacement() {
        let mut req = request(10, 11);
        req.recurrence_rule = Some("FREQ=WEEKLY".to_string());
        req.exceptions.push(BookingException {
            date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            replace_start: Some(Utc.with_ymd_and_hms(2026, 1, 8, 14, 0, 0).unwrap()),
            replace_end: None,
        });
        assert!(matches!(
            validate_request(&req),
            Err(ServiceError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_inverted_replacement() {
        let mut req = request(10, 11);
        req.recurrence_rule = Some("FREQ=WEEKLY".to_string());
        req.exceptions.push(BookingException {
            date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            replace_start: Some(Utc.with_ymd_and_hms(2026, 1, 8, 15, 0, 0).unwrap()),
            replace_end: Some(Utc.with_ymd_and_hms(2026, 1, 8, 14, 0, 0).unwrap()),
        });
        assert!(matches!(
            validate_request(&req),
            Err(ServiceError::Validation { .. })
        ));
    }

    #[test]
    fn accepts_well_formed_recurring_request() {
        let mut req = request(10, 11);
        req.recurrence_rule = Some("FREQ=WEEKLY;COUNT=4".to_string());
        req.exceptions.push(BookingException {
            date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            replace_start: Some(Utc.with_ymd_and_hms(2026, 1, 8, 14, 0, 0).unwrap()),
            replace_end: Some(Utc.with_ymd_and_hms(2026, 1, 8, 15, 0, 0).unwrap()),
        });
        assert!(validate_request(&req).is_ok());
    }
}
