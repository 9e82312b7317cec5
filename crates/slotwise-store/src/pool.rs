//! Connection pool bootstrap.
//!
//! The pool is created once at process start and closed at graceful
//! shutdown; everything else is request-scoped. Pool exhaustion surfaces
//! as a timeout error from `acquire`, which callers map to their storage
//! error.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

const MAX_CONNECTIONS: u32 = 16;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect to PostgreSQL and return the process-wide pool.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    info!(
        max_connections = MAX_CONNECTIONS,
        "connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    info!("connected to PostgreSQL");
    Ok(pool)
}
