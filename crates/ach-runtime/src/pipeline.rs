use ach_db::InsertAwardArgs;
use ach_eval::{eval_predicate, EvalContext};
use ach_render::ObjectStore;
use ach_schemas::{scope_key_for, Event, PerGameStats};
use anyhow::{anyhow, Context, Result};
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, warn};

const ISSUER: &str = "achievements-worker";
const AWARD_VERSION: i32 = 1;
const AWARD_LEVEL: i32 = 1;

/// Run the full per-event pipeline. Returns `Ok(())` once every candidate
/// rule has been evaluated and every fired rule's award/render/attach step
/// has been attempted — even if some of those attempts failed. A
/// rule-processing failure is folded into an aggregate error returned at
/// the end: the caller reschedules the whole item, and `processed_events`
/// makes the counter half a no-op on retry.
pub async fn process_event(
    pool: &PgPool,
    object_store: &dyn ObjectStore,
    public_base_url: &str,
    event: &Event,
) -> Result<()> {
    match event.event_type.as_str() {
        Event::TYPE_PLAYER_STAT => {
            process_player_stat_event(pool, object_store, public_base_url, event).await
        }
        Event::TYPE_MATCH => Ok(()),
        other => {
            warn!(event_id = %event.event_id, event_type = other, "unrecognized event type, draining as no-op");
            Ok(())
        }
    }
}

async fn process_player_stat_event(
    pool: &PgPool,
    object_store: &dyn ObjectStore,
    public_base_url: &str,
    event: &Event,
) -> Result<()> {
    let player_id = event
        .player_id
        .as_deref()
        .context("player_stat_event missing required player_id")?;

    let stats = PerGameStats::from_payload(&event.payload);

    ach_db::apply_game_stats(
        pool,
        &event.event_id,
        player_id,
        event.season_id.as_deref(),
        &stats,
    )
    .await
    .context("apply_game_stats failed")?;

    let counters = ach_db::fetch_counters(pool, player_id, event.season_id.as_deref())
        .await
        .context("fetch_counters failed")?;

    let per_game_map = stats.to_map();
    let season_map = counters
        .season
        .as_ref()
        .map(|c| c.to_context_map())
        .unwrap_or_default();
    let career_map = counters
        .career
        .as_ref()
        .map(|c| c.to_context_map())
        .unwrap_or_default();

    let ctx = EvalContext::new(per_game_map.clone(), season_map.clone(), career_map.clone());

    let rules = ach_db::fetch_candidate_rules(
        pool,
        event.game_year.as_deref(),
        event.league_id.as_deref(),
        event.season_id.as_deref(),
    )
    .await
    .context("fetch_candidate_rules failed")?;

    let mut rule_errors: Vec<anyhow::Error> = Vec::new();

    for rule in rules {
        if !eval_predicate(&rule.predicate, &ctx) {
            continue;
        }

        let scope_key = scope_key_for(rule.scope, event.match_id.as_deref(), event.season_id.as_deref());
        let stats_snapshot = json!({
            "per_game": per_game_map,
            "season": season_map,
            "career": career_map,
            "rule_predicate": rule.predicate,
        });

        let insert_result = ach_db::insert_award(
            pool,
            InsertAwardArgs {
                player_id,
                rule_id: rule.rule_id,
                scope_key: scope_key.as_deref(),
                level: AWARD_LEVEL,
                title: &rule.title,
                tier: &rule.tier,
                stats: stats_snapshot,
                issuer: ISSUER,
                version: AWARD_VERSION,
            },
        )
        .await;

        let award_id = match insert_result {
            Ok(Some(id)) => id,
            Ok(None) => continue, // already awarded; not an error
            Err(e) => {
                error!(rule_id = rule.rule_id, event_id = %event.event_id, error = %e, "award insert failed");
                rule_errors.push(e);
                continue;
            }
        };

        if let Err(e) = render_and_attach(pool, object_store, public_base_url, award_id).await {
            error!(rule_id = rule.rule_id, award_id, event_id = %event.event_id, error = %e, "badge render/attach failed");
            rule_errors.push(e);
        }
    }

    if rule_errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} rule(s) failed processing for event {}",
            rule_errors.len(),
            event.event_id
        ))
    }
}

async fn render_and_attach(
    pool: &PgPool,
    object_store: &dyn ObjectStore,
    public_base_url: &str,
    award_id: i64,
) -> Result<()> {
    let award = ach_db::fetch_award(pool, award_id)
        .await
        .context("fetch_award failed")?;
    let url = ach_render::generate_and_upload(object_store, public_base_url, &award)
        .await
        .context("generate_and_upload failed")?;
    ach_db::attach_asset_url(pool, award_id, &url)
        .await
        .context("attach_asset_url failed")?;
    Ok(())
}
