//! Availability queries and next-slot search.
//!
//! Read-only paths: resolve the busy set, merge it, then either enumerate
//! the gaps that clear a minimum duration or scan forward for the next
//! free slots.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use slotwise_engine::{gaps, merge, suggest, Gap, SuggestionScan};
use slotwise_store::{repository, Resource};

use crate::cancel::{acquire, race};
use crate::error::{Result, ServiceError};
use crate::resolver::resolve_busy;

/// Gap enumeration result for one resource and window.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub resource: Resource,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub slot_duration_minutes: i64,
    pub available_slots: Vec<Gap>,
    /// Busy instances found in the window, counted before merging.
    pub busy_slots_count: usize,
}

/// Knobs for the forward next-slot scan.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionParams {
    pub horizon_hours: i64,
    pub step_minutes: i64,
    pub max_suggestions: usize,
}

impl Default for SuggestionParams {
    fn default() -> Self {
        Self {
            horizon_hours: 720,
            step_minutes: 15,
            max_suggestions: 5,
        }
    }
}

/// Enumerate the free slots of at least `min_slot_minutes` on a resource
/// within `[from, to)`.
pub async fn availability(
    pool: &PgPool,
    resource_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    min_slot_minutes: i64,
    cancel: &CancellationToken,
) -> Result<AvailabilityReport> {
    if to <= from {
        return Err(ServiceError::validation("to", "to must be after from"));
    }
    if min_slot_minutes < 0 {
        return Err(ServiceError::validation(
            "slot",
            "slot duration must not be negative",
        ));
    }

    let mut conn = acquire(pool, cancel).await?;
    let resource = race(cancel, repository::find_resource(&mut *conn, resource_id))
        .await?
        .ok_or(ServiceError::ResourceNotFound(resource_id))?;

    let busy = resolve_busy(&mut *conn, resource_id, from, to, cancel).await?;
    let merged = merge(&busy.iter().map(|b| b.interval()).collect::<Vec<_>>());
    let available_slots = gaps(&merged, from, to, min_slot_minutes);

    Ok(AvailabilityReport {
        resource,
        from,
        to,
        slot_duration_minutes: min_slot_minutes,
        available_slots,
        busy_slots_count: busy.len(),
    })
}

/// Scan forward from `desired_start` for the next free slots of
/// `duration_minutes` on a resource.
pub async fn next_available(
    pool: &PgPool,
    resource_id: Uuid,
    desired_start: DateTime<Utc>,
    duration_minutes: i64,
    params: SuggestionParams,
    cancel: &CancellationToken,
) -> Result<SuggestionScan> {
    let search_end = desired_start + Duration::hours(params.horizon_hours);

    let mut conn = acquire(pool, cancel).await?;
    let busy = resolve_busy(&mut *conn, resource_id, desired_start, search_end, cancel).await?;
    let merged = merge(&busy.iter().map(|b| b.interval()).collect::<Vec<_>>());

    Ok(suggest::next_available(
        &merged,
        desired_start,
        duration_minutes,
        params.horizon_hours,
        params.step_minutes,
        params.max_suggestions,
    ))
}
