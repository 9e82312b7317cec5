//! Row models for the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookable resource. Provisioned out-of-band; the core only reads it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
}

/// One row of `bookings`. `[start_time, end_time)` is half-open; for a
/// recurring booking it is the first occurrence and the duration template.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A per-date override row. Replacement fields are both set or both null
/// (CHECK-enforced).
#[derive(Debug, Clone, FromRow)]
pub struct ExceptionRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub except_date: NaiveDate,
    pub replace_start: Option<DateTime<Utc>>,
    pub replace_end: Option<DateTime<Utc>>,
}

/// A recurring booking assembled with its rule and exception list.
#[derive(Debug, Clone)]
pub struct RecurringBooking {
    pub booking: BookingRow,
    pub rrule: String,
    pub is_infinite: bool,
    pub exceptions: Vec<ExceptionRow>,
}

/// Input for a booking insert. The id and creation instant are assigned
/// by the repository.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub resource_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// Input for an exception insert.
#[derive(Debug, Clone)]
pub struct NewException {
    pub except_date: NaiveDate,
    pub replace_start: Option<DateTime<Utc>>,
    pub replace_end: Option<DateTime<Utc>>,
}
