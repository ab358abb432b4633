//! Requires a live Postgres reachable via ACH_TEST_DATABASE_URL.

use ach_testkit::{testkit_db_pool, EventBuilder};

#[tokio::test]
async fn concurrent_claims_never_overlap() {
    let pool = testkit_db_pool().await.unwrap();

    let event = EventBuilder::player_stat("evt-claim-1", "player-1", Default::default()).build();
    ach_testkit::insert_event(&pool, &event).await.unwrap();
    let queue_id = ach_testkit::enqueue(&pool, &event.event_id).await.unwrap();

    let (batch_a, batch_b) = tokio::join!(
        ach_db::claim_batch(&pool, 10),
        ach_db::claim_batch(&pool, 10),
    );
    let batch_a = batch_a.unwrap();
    let batch_b = batch_b.unwrap();

    let claimed_ids: Vec<i64> = batch_a
        .iter()
        .chain(batch_b.iter())
        .map(|item| item.queue_id)
        .collect();

    assert_eq!(claimed_ids.iter().filter(|id| **id == queue_id).count(), 1);
}

#[tokio::test]
async fn mark_retry_reschedules_with_backoff_and_eventually_errors() {
    let pool = testkit_db_pool().await.unwrap();

    let event = EventBuilder::player_stat("evt-claim-2", "player-1", Default::default()).build();
    ach_testkit::insert_event(&pool, &event).await.unwrap();
    let queue_id = ach_testkit::enqueue(&pool, &event.event_id).await.unwrap();

    // Claim so the row is in `processing`, matching markRetry's precondition.
    ach_db::claim_batch(&pool, 10).await.unwrap();

    for _ in 0..9 {
        ach_db::mark_retry(&pool, queue_id, "boom", 10).await.unwrap();
        // Re-claim is not required by mark_retry itself (it transitions
        // directly back to `queued`); the next claim would pick it up once
        // visible_at elapses in a real deployment.
    }
    ach_db::mark_retry(&pool, queue_id, "boom", 10).await.unwrap();

    let lag = ach_db::queue_lag(&pool).await.unwrap();
    assert_eq!(lag, 0, "item should have transitioned to error, not be visible for claim");
}
