//! Transactional units of work with retry

use crate::error::{AppError, Result};
use futures::future::BoxFuture;
use resilience::{with_retry, RetryPolicy};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// Run `unit` inside a fresh transaction, retrying the whole attempt under `policy`.
///
/// Every attempt begins its own transaction and commits only when the unit
/// succeeds. A failed attempt rolls back when its transaction is dropped.
/// Errors are reported against `op`.
///
/// ```ignore
/// let post = run_in_transaction(&pool, &policy, "store.create_post", move |tx| {
///     let title = title.clone();
///     Box::pin(async move {
///         let post = sqlx::query_as::<_, Post>("INSERT ... RETURNING *")
///             .bind(&title)
///             .fetch_one(&mut **tx)
///             .await?;
///         Ok(post)
///     })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<T, F>(
    pool: &PgPool,
    policy: &RetryPolicy,
    op: &'static str,
    unit: F,
) -> Result<T>
where
    T: Send,
    F: for<'c> Fn(&'c mut Transaction<'static, Postgres>) -> BoxFuture<'c, Result<T>> + Send + Sync,
{
    let unit = &unit;
    with_retry(policy, |attempt| async move {
        debug!(op, attempt, "starting transaction");
        let mut tx = pool.begin().await?;
        let value = unit(&mut tx).await?;
        tx.commit().await?;
        Ok::<T, AppError>(value)
    })
    .await
    .map_err(|err| AppError::from_retry(op, err))
}
