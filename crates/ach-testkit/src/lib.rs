//! Fixture builders and database bootstrap for scenario tests: connect
//! using the env-configured database, then make sure migrations are
//! applied before the test touches anything.

use ach_schemas::{Event, PerGameStats};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::HashMap;

pub const ENV_TEST_DATABASE_URL: &str = "ACH_TEST_DATABASE_URL";

/// Connect to the scenario-test database and ensure migrations are applied.
pub async fn testkit_db_pool() -> Result<PgPool> {
    let url = std::env::var(ENV_TEST_DATABASE_URL)
        .with_context(|| format!("missing env var {ENV_TEST_DATABASE_URL}"))?;
    let pool = ach_db::connect(&url).await?;
    ach_db::migrate(&pool).await?;
    Ok(pool)
}

/// Build a `player_stat_event` payload with the given per-game stat values,
/// defaulting every other key to zero.
pub fn stat_payload(fields: &[(&str, f64)]) -> HashMap<String, Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    for (k, v) in fields {
        m.insert((*k).to_string(), json!(v));
    }
    m
}

/// A 52-point game payload, used by the 50-point-game scenario.
pub fn fifty_point_game_payload() -> HashMap<String, Value> {
    stat_payload(&[("points", 52.0), ("ast", 4.0), ("reb", 6.0)])
}

/// A double-digit-in-three-categories payload, used by the triple-double
/// scenario.
pub fn triple_double_payload() -> HashMap<String, Value> {
    stat_payload(&[
        ("points", 10.0),
        ("ast", 11.0),
        ("reb", 12.0),
        ("stl", 2.0),
        ("blk", 1.0),
    ])
}

/// Build a `player_stat_event` fixture. Callers override fields they care
/// about via the setters before inserting.
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn player_stat(event_id: &str, player_id: &str, payload: HashMap<String, Value>) -> Self {
        Self {
            event: Event {
                event_id: event_id.to_string(),
                event_type: Event::TYPE_PLAYER_STAT.to_string(),
                payload,
                player_id: Some(player_id.to_string()),
                match_id: None,
                season_id: None,
                league_id: None,
                game_year: None,
                occurred_at: Utc::now(),
            },
        }
    }

    pub fn season(mut self, season_id: &str) -> Self {
        self.event.season_id = Some(season_id.to_string());
        self
    }

    pub fn match_id(mut self, match_id: &str) -> Self {
        self.event.match_id = Some(match_id.to_string());
        self
    }

    pub fn league(mut self, league_id: &str) -> Self {
        self.event.league_id = Some(league_id.to_string());
        self
    }

    pub fn game_year(mut self, game_year: &str) -> Self {
        self.event.game_year = Some(game_year.to_string());
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}

/// Insert an event row directly (bypassing the external-producer boundary,
/// which is appropriate only in tests).
pub async fn insert_event(pool: &PgPool, event: &Event) -> Result<()> {
    let payload = Value::Object(event.payload.clone().into_iter().collect());
    sqlx::query(
        r#"
        insert into events (event_id, event_type, payload, player_id, match_id,
                             season_id, league_id, game_year, occurred_at)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(&event.event_id)
    .bind(&event.event_type)
    .bind(payload)
    .bind(&event.player_id)
    .bind(&event.match_id)
    .bind(&event.season_id)
    .bind(&event.league_id)
    .bind(&event.game_year)
    .bind(event.occurred_at)
    .execute(pool)
    .await
    .context("testkit insert_event failed")?;
    Ok(())
}

/// Insert a queue row in `queued` status for `event_id`, immediately
/// visible. Returns the new `queue_id`.
pub async fn enqueue(pool: &PgPool, event_id: &str) -> Result<i64> {
    let (queue_id,): (i64,) = sqlx::query_as(
        "insert into event_queue (event_id) values ($1) returning queue_id",
    )
    .bind(event_id)
    .fetch_one(pool)
    .await
    .context("testkit enqueue failed")?;
    Ok(queue_id)
}

/// Insert an active achievement rule. Returns the new `rule_id`.
pub async fn insert_rule(
    pool: &PgPool,
    title: &str,
    tier: &str,
    scope: &str,
    predicate: Value,
) -> Result<i64> {
    let (rule_id,): (i64,) = sqlx::query_as(
        r#"
        insert into achievement_rules (title, tier, scope, predicate, is_active)
        values ($1, $2, $3, $4, true)
        returning rule_id
        "#,
    )
    .bind(title)
    .bind(tier)
    .bind(scope)
    .bind(predicate)
    .fetch_one(pool)
    .await
    .context("testkit insert_rule failed")?;
    Ok(rule_id)
}

/// The canonical 50-point-game rule used across scenario tests.
pub fn fifty_point_game_predicate() -> Value {
    json!({">=": ["per_game.points", 50]})
}

/// The canonical triple-double rule used across scenario tests.
pub fn triple_double_predicate() -> Value {
    json!({
        "and": [
            {">=": ["per_game.points", 10]},
            {">=": ["per_game.ast", 10]},
            {">=": ["per_game.reb", 10]},
        ]
    })
}

/// A payload with an unrecognized key, used by the typo-in-predicate
/// scenario (the rule references `per_game.pointz`, which never resolves).
pub fn predicate_typo_rule_predicate() -> Value {
    json!({">=": ["per_game.pointz", 50]})
}

pub fn zero_stats() -> PerGameStats {
    PerGameStats::default()
}
