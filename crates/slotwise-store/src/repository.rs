//! Booking repository.
//!
//! Query functions over `&mut PgConnection` so they run equally on a
//! pool-acquired connection (read paths) or inside a service-owned
//! transaction (write paths).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{
    BookingRow, ExceptionRow, NewBooking, NewException, RecurringBooking, Resource,
};

/// PostgreSQL SQLSTATE for an exclusion constraint violation.
const EXCLUSION_VIOLATION: &str = "23P01";

pub async fn find_resource(conn: &mut PgConnection, id: Uuid) -> Result<Option<Resource>> {
    let resource = sqlx::query_as("SELECT id, name FROM resources WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(resource)
}

/// Provisioning helper; resources are otherwise managed out-of-band.
pub async fn insert_resource(conn: &mut PgConnection, name: &str) -> Result<Resource> {
    let resource = sqlx::query_as("INSERT INTO resources (id, name) VALUES ($1, $2) RETURNING id, name")
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(resource)
}

/// Lock the resource row for the rest of the enclosing transaction.
/// Serializes recurring creates per resource; returns false when the
/// resource does not exist.
pub async fn lock_resource(conn: &mut PgConnection, id: Uuid) -> Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM resources WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

/// Single (non-recurring) bookings whose stored range intersects
/// `[from, to)`. Uses the native range-overlap operator so the GiST index
/// applies.
pub async fn single_bookings_overlapping(
    conn: &mut PgConnection,
    resource_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<BookingRow>> {
    let rows = sqlx::query_as(
        "SELECT b.id, b.resource_id, b.start_time, b.end_time, b.metadata, b.created_at
         FROM bookings b
         LEFT JOIN recurrence_rules r ON r.booking_id = b.id
         WHERE b.resource_id = $1
           AND r.booking_id IS NULL
           AND b.time_range && tstzrange($2, $3, '[)')
         ORDER BY b.start_time",
    )
        .bind(resource_id)
        .bind(from)
        .bind(to)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

#[derive(FromRow)]
struct RecurringJoinRow {
    id: Uuid,
    resource_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    rrule: String,
    is_infinite: bool,
}

/// Recurring bookings whose template starts before `before` (the template
/// start is a lower bound — occurrences may land far later), assembled
/// with their rules and exception lists in the same read.
pub async fn recurring_bookings_starting_before(
    conn: &mut PgConnection,
    resource_id: Uuid,
    before: DateTime<Utc>,
) -> Result<Vec<RecurringBooking>> {
    let joined: Vec<RecurringJoinRow> = sqlx::query_as(
        "SELECT b.id, b.resource_id, b.start_time, b.end_time, b.metadata, b.created_at,
                r.rrule, r.is_infinite
         FROM bookings b
         JOIN recurrence_rules r ON r.booking_id = b.id
         WHERE b.resource_id = $1 AND b.start_time < $2
         ORDER BY b.start_time",
    )
    .bind(resource_id)
    .bind(before)
    .fetch_all(&mut *conn)
    .await?;

    if joined.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = joined.iter().map(|row| row.id).collect();
    let mut exceptions = exceptions_for_bookings(conn, &ids).await?;

    Ok(joined
        .into_iter()
        .map(|row| {
            let booking_exceptions = exceptions.remove(&row.id).unwrap_or_default();
            RecurringBooking {
                booking: BookingRow {
                    id: row.id,
                    resource_id: row.resource_id,
                    start_time: row.start_time,
                    end_time: row.end_time,
                    metadata: row.metadata,
                    created_at: row.created_at,
                },
                rrule: row.rrule,
                is_infinite: row.is_infinite,
                exceptions: booking_exceptions,
            }
        })
        .collect())
}

/// Exceptions for a set of bookings, grouped by booking id. Rows come out
/// in `(except_date, id)` order, which fixes the last-write-wins order for
/// duplicate dates.
async fn exceptions_for_bookings(
    conn: &mut PgConnection,
    booking_ids: &[Uuid],
) -> Result<std::collections::HashMap<Uuid, Vec<ExceptionRow>>> {
    let rows: Vec<ExceptionRow> = sqlx::query_as(
        "SELECT id, booking_id, except_date, replace_start, replace_end
         FROM exceptions
         WHERE booking_id = ANY($1)
         ORDER BY booking_id, except_date, id",
    )
    .bind(booking_ids)
    .fetch_all(conn)
    .await?;

    let mut grouped: std::collections::HashMap<Uuid, Vec<ExceptionRow>> =
        std::collections::HashMap::new();
    for row in rows {
        grouped.entry(row.booking_id).or_default().push(row);
    }
    Ok(grouped)
}

/// Insert a booking row. An exclusion-constraint rejection maps to
/// [`StoreError::Exclusion`]; everything else is a database error.
pub async fn insert_booking(conn: &mut PgConnection, new: &NewBooking) -> Result<BookingRow> {
    sqlx::query_as(
        "INSERT INTO bookings (id, resource_id, start_time, end_time, metadata)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, resource_id, start_time, end_time, metadata, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(new.resource_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(&new.metadata)
    .fetch_one(conn)
    .await
    .map_err(map_insert_error)
}

pub async fn insert_recurrence_rule(
    conn: &mut PgConnection,
    booking_id: Uuid,
    rrule: &str,
    is_infinite: bool,
) -> Result<()> {
    sqlx::query("INSERT INTO recurrence_rules (booking_id, rrule, is_infinite) VALUES ($1, $2, $3)")
        .bind(booking_id)
        .bind(rrule)
        .bind(is_infinite)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_exceptions(
    conn: &mut PgConnection,
    booking_id: Uuid,
    exceptions: &[NewException],
) -> Result<Vec<ExceptionRow>> {
    let mut rows = Vec::with_capacity(exceptions.len());
    for exc in exceptions {
        let row = sqlx::query_as(
            "INSERT INTO exceptions (id, booking_id, except_date, replace_start, replace_end)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, booking_id, except_date, replace_start, replace_end",
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(exc.except_date)
        .bind(exc.replace_start)
        .bind(exc.replace_end)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            StoreError::Exclusion
        }
        _ => StoreError::Database(e),
    }
}
