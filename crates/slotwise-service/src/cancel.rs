//! Cancellation plumbing.
//!
//! Every store await is raced against the request's token. Dropping an
//! in-flight transaction rolls it back, so cancellation never leaves
//! partial state behind.

use std::future::Future;

use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres, Transaction};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, ServiceError};
use slotwise_store::StoreError;

/// Run a store future to completion unless the token fires first.
pub(crate) async fn race<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, StoreError>>,
{
    tokio::select! {
        // Biased so a token cancelled before the call wins over a store
        // future that is already ready.
        biased;
        _ = cancel.cancelled() => Err(ServiceError::Cancelled),
        res = fut => res.map_err(ServiceError::from),
    }
}

pub(crate) async fn acquire(
    pool: &PgPool,
    cancel: &CancellationToken,
) -> Result<PoolConnection<Postgres>> {
    race(cancel, async { pool.acquire().await.map_err(StoreError::from) }).await
}

pub(crate) async fn begin<'p>(
    pool: &'p PgPool,
    cancel: &CancellationToken,
) -> Result<Transaction<'p, Postgres>> {
    race(cancel, async { pool.begin().await.map_err(StoreError::from) }).await
}

pub(crate) async fn commit(
    tx: Transaction<'_, Postgres>,
    cancel: &CancellationToken,
) -> Result<()> {
    race(cancel, async { tx.commit().await.map_err(StoreError::from) }).await
}
