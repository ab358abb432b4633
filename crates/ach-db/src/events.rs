use ach_schemas::Event;
use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

/// Load events by id. Ids with no matching row are simply absent from the
/// returned map; the caller (Supervisor Loop) treats that as "event missing"
/// and retries the queue item.
pub async fn load_events(pool: &PgPool, event_ids: &[String]) -> Result<HashMap<String, Event>> {
    if event_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query(
        r#"
        select event_id, event_type, payload, player_id, match_id, season_id,
               league_id, game_year, occurred_at
        from events
        where event_id = any($1)
        "#,
    )
    .bind(event_ids)
    .fetch_all(pool)
    .await
    .context("load_events failed")?;

    let mut out = HashMap::with_capacity(rows.len());
    for row in rows {
        let payload: Value = row.try_get("payload")?;
        let payload = match payload {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        let event = Event {
            event_id: row.try_get("event_id")?,
            event_type: row.try_get("event_type")?,
            payload,
            player_id: row.try_get("player_id")?,
            match_id: row.try_get("match_id")?,
            season_id: row.try_get("season_id")?,
            league_id: row.try_get("league_id")?,
            game_year: row.try_get("game_year")?,
            occurred_at: row.try_get("occurred_at")?,
        };
        out.insert(event.event_id.clone(), event);
    }
    Ok(out)
}
