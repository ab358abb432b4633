use ach_schemas::{QueueItem, QueueStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// Rows stuck in `processing` longer than this are treated as abandoned by
/// a crashed worker and folded back into the claimable set.
const DEFAULT_LEASE_TTL_SECONDS: i64 = 300;

/// Atomically claim up to `limit` queued rows (or rows whose processing
/// lease has expired), transitioning them to `processing`.
///
/// A single `FOR UPDATE SKIP LOCKED` CTE so concurrent workers never claim
/// overlapping rows. The reclaim branch is folded into the same CTE rather
/// than a separate sweeper, per the lease-recovery resolution recorded in
/// DESIGN.md.
pub async fn claim_batch(pool: &PgPool, limit: i64) -> Result<Vec<QueueItem>> {
    claim_batch_with_lease_ttl(pool, limit, DEFAULT_LEASE_TTL_SECONDS).await
}

async fn claim_batch_with_lease_ttl(
    pool: &PgPool,
    limit: i64,
    lease_ttl_seconds: i64,
) -> Result<Vec<QueueItem>> {
    let rows = sqlx::query(
        r#"
        with to_claim as (
            select queue_id
            from event_queue
            where (status = 'queued' and visible_at <= now())
               or (status = 'processing' and updated_at < now() - make_interval(secs => $2::double precision))
            order by queue_id asc
            limit $1
            for update skip locked
        )
        update event_queue
           set status     = 'processing',
               updated_at = now()
         where queue_id in (select queue_id from to_claim)
        returning queue_id, event_id, status, attempts, visible_at, last_error, updated_at
        "#,
    )
    .bind(limit)
    .bind(lease_ttl_seconds as f64)
    .fetch_all(pool)
    .await
    .context("claim_batch failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(row_to_queue_item(row)?);
    }
    Ok(out)
}

fn row_to_queue_item(row: sqlx::postgres::PgRow) -> Result<QueueItem> {
    let status: String = row.try_get("status")?;
    Ok(QueueItem {
        queue_id: row.try_get("queue_id")?,
        event_id: row.try_get("event_id")?,
        status: QueueStatus::parse(&status)
            .with_context(|| format!("unrecognized queue status {status:?}"))?,
        attempts: row.try_get("attempts")?,
        visible_at: row.try_get("visible_at")?,
        last_error: row.try_get("last_error")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Bulk `processing -> done`. A no-op for ids not currently `processing`.
pub async fn mark_done(pool: &PgPool, queue_ids: &[i64]) -> Result<()> {
    if queue_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        update event_queue
           set status     = 'done',
               updated_at = now()
         where queue_id = any($1)
           and status = 'processing'
        "#,
    )
    .bind(queue_ids)
    .execute(pool)
    .await
    .context("mark_done failed")?;
    Ok(())
}

/// Atomic read-modify-write on one row's `attempts`. Exhausting
/// `max_attempts` transitions the item to `error`; otherwise it is
/// rescheduled with exponential backoff.
pub async fn mark_retry(
    pool: &PgPool,
    queue_id: i64,
    error_message: &str,
    max_attempts: i32,
) -> Result<()> {
    let mut tx = pool.begin().await.context("mark_retry: begin tx")?;

    let attempts: i32 = sqlx::query_scalar(
        "select attempts from event_queue where queue_id = $1 for update",
    )
    .bind(queue_id)
    .fetch_one(&mut *tx)
    .await
    .context("mark_retry: select attempts")?;

    let new_attempts = attempts + 1;

    if new_attempts >= max_attempts {
        sqlx::query(
            r#"
            update event_queue
               set status     = 'error',
                   attempts   = $2,
                   last_error = $3,
                   updated_at = now()
             where queue_id = $1
            "#,
        )
        .bind(queue_id)
        .bind(new_attempts)
        .bind(error_message)
        .execute(&mut *tx)
        .await
        .context("mark_retry: terminal update")?;
    } else {
        let visible_at = backoff_visible_at(new_attempts);
        sqlx::query(
            r#"
            update event_queue
               set status     = 'queued',
                   attempts   = $2,
                   last_error = $3,
                   visible_at = $4,
                   updated_at = now()
             where queue_id = $1
            "#,
        )
        .bind(queue_id)
        .bind(new_attempts)
        .bind(error_message)
        .bind(visible_at)
        .execute(&mut *tx)
        .await
        .context("mark_retry: reschedule update")?;
    }

    tx.commit().await.context("mark_retry: commit tx")?;
    Ok(())
}

/// `backoff(a) = 2^min(a, 7) minutes`, applied from now.
fn backoff_visible_at(attempts: i32) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::minutes(backoff_minutes(attempts))
}

fn backoff_minutes(attempts: i32) -> i64 {
    let exponent = attempts.clamp(0, 7) as u32;
    2_i64.pow(exponent)
}

/// Count of rows currently visible for claim. Used only by the health
/// endpoint, never for control flow.
pub async fn queue_lag(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "select count(*) from event_queue where status = 'queued' and visible_at <= now()",
    )
    .fetch_one(pool)
    .await
    .context("queue_lag failed")?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_minutes(1), 2);
        assert_eq!(backoff_minutes(2), 4);
        assert_eq!(backoff_minutes(3), 8);
    }

    #[test]
    fn backoff_exponent_is_clamped_at_seven() {
        assert_eq!(backoff_minutes(7), 128);
        assert_eq!(backoff_minutes(20), 128);
    }
}
