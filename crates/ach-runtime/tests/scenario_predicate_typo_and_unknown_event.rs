//! Requires a live Postgres reachable via ACH_TEST_DATABASE_URL.

use ach_render::MemoryObjectStore;
use ach_schemas::Event;
use ach_testkit::{
    fifty_point_game_payload, predicate_typo_rule_predicate, testkit_db_pool, EventBuilder,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// A rule referencing a key that never resolves (`per_game.pointz`) folds to
/// `false` rather than erroring; the event is drained as a normal no-award
/// outcome, not a retry.
#[tokio::test]
async fn a_typo_in_a_predicate_path_folds_to_false_instead_of_erroring() {
    let pool = testkit_db_pool().await.unwrap();
    let store = Arc::new(MemoryObjectStore::new());

    let rule_id = ach_testkit::insert_rule(
        &pool,
        "Typo Rule",
        "Gold",
        "per_game",
        predicate_typo_rule_predicate(),
    )
    .await
    .unwrap();

    let event = EventBuilder::player_stat("evt-typo-1", "player-11", fifty_point_game_payload())
        .match_id("match-3")
        .build();
    ach_testkit::insert_event(&pool, &event).await.unwrap();

    ach_runtime::process_event(&pool, store.as_ref(), "https://cdn.example.com", &event)
        .await
        .unwrap();

    let count: (i64,) =
        sqlx::query_as("select count(*) from player_awards where rule_id = $1")
            .bind(rule_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count.0, 0, "a predicate that never resolves must never fire");
}

/// Event types other than `player_stat_event`/`match_event` drain as no-ops:
/// `process_event` succeeds without touching counters, rules, or awards.
#[tokio::test]
async fn an_unrecognized_event_type_drains_as_a_no_op() {
    let pool = testkit_db_pool().await.unwrap();
    let store = Arc::new(MemoryObjectStore::new());

    let event = Event {
        event_id: "evt-unknown-1".to_string(),
        event_type: "season_rollover_event".to_string(),
        payload: HashMap::new(),
        player_id: None,
        match_id: None,
        season_id: None,
        league_id: None,
        game_year: None,
        occurred_at: Utc::now(),
    };
    ach_testkit::insert_event(&pool, &event).await.unwrap();

    ach_runtime::process_event(&pool, store.as_ref(), "https://cdn.example.com", &event)
        .await
        .unwrap();
}
