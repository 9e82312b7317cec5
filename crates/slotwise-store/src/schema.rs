//! Schema definitions and migration runner.
//!
//! Versioned DDL constants applied at startup. Each migration runs once,
//! inside its own transaction, and is recorded in `_slotwise_migration`.

use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

const MIGRATION_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS _slotwise_migration (
    version integer PRIMARY KEY,
    name text NOT NULL,
    applied_at timestamptz NOT NULL DEFAULT now()
);";

struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// ---------------------------------------------------------------------------
// Schema v1 — resources, bookings, recurrence rules, exceptions
// ---------------------------------------------------------------------------

const SCHEMA_V1: &str = "\
CREATE EXTENSION IF NOT EXISTS btree_gist;

CREATE TABLE IF NOT EXISTS resources (
    id uuid PRIMARY KEY,
    name text NOT NULL
);

CREATE TABLE IF NOT EXISTS bookings (
    id uuid PRIMARY KEY,
    resource_id uuid NOT NULL REFERENCES resources(id),
    start_time timestamptz NOT NULL,
    end_time timestamptz NOT NULL,
    time_range tstzrange GENERATED ALWAYS AS
        (tstzrange(start_time, end_time, '[)')) STORED,
    metadata jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now(),
    CONSTRAINT bookings_end_after_start CHECK (end_time > start_time),
    CONSTRAINT bookings_no_overlap
        EXCLUDE USING gist (resource_id WITH =, time_range WITH &&)
);

CREATE INDEX IF NOT EXISTS idx_bookings_time_range
    ON bookings USING gist (time_range);
CREATE INDEX IF NOT EXISTS idx_bookings_resource_window
    ON bookings (resource_id, start_time, end_time);

CREATE TABLE IF NOT EXISTS recurrence_rules (
    booking_id uuid PRIMARY KEY REFERENCES bookings(id) ON DELETE CASCADE,
    rrule text NOT NULL,
    is_infinite boolean NOT NULL DEFAULT false
);

CREATE TABLE IF NOT EXISTS exceptions (
    id uuid PRIMARY KEY,
    booking_id uuid NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    except_date date NOT NULL,
    replace_start timestamptz,
    replace_end timestamptz,
    CONSTRAINT exceptions_replacement_pair CHECK (
        (replace_start IS NULL AND replace_end IS NULL)
        OR (replace_start IS NOT NULL AND replace_end IS NOT NULL
            AND replace_end > replace_start)
    )
);

CREATE INDEX IF NOT EXISTS idx_exceptions_booking_date
    ON exceptions (booking_id, except_date);
";

/// Apply any unapplied migrations. Safe to run on every startup.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(MIGRATION_TABLE_DDL).execute(pool).await?;

    for migration in MIGRATIONS {
        let applied: Option<(i32,)> =
            sqlx::query_as("SELECT version FROM _slotwise_migration WHERE version = $1")
                .bind(migration.version)
                .fetch_optional(pool)
                .await?;
        if applied.is_some() {
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO _slotwise_migration (version, name) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            version = migration.version,
            name = migration.name,
            "applied schema migration"
        );
    }

    Ok(())
}
