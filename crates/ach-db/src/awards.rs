use ach_schemas::Award;
use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{PgPool, Row};

pub struct InsertAwardArgs<'a> {
    pub player_id: &'a str,
    pub rule_id: i64,
    pub scope_key: Option<&'a str>,
    pub level: i32,
    pub title: &'a str,
    pub tier: &'a str,
    pub stats: Value,
    pub issuer: &'a str,
    pub version: i32,
}

/// Insert a new award row, or return `None` if one already exists for this
/// idempotency tuple. Returning `None` is the expected "already awarded"
/// signal, not a failure.
///
/// The conflict target coalesces `scope_key` to `''` to match
/// `player_awards_idempotency_uidx`: `scope_key` is NULL for career-scope
/// awards and for per_game awards on events with no `match_id`, and
/// Postgres treats every NULL as distinct in a plain unique index, so the
/// raw column can't be the conflict target without silently admitting
/// duplicate awards for those rows.
pub async fn insert_award(pool: &PgPool, args: InsertAwardArgs<'_>) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        insert into player_awards (
            player_id, rule_id, scope_key, level, title, tier, stats, issuer, version
        )
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        on conflict (player_id, rule_id, coalesce(scope_key, ''), level) do nothing
        returning award_id
        "#,
    )
    .bind(args.player_id)
    .bind(args.rule_id)
    .bind(args.scope_key)
    .bind(args.level)
    .bind(args.title)
    .bind(args.tier)
    .bind(args.stats)
    .bind(args.issuer)
    .bind(args.version)
    .fetch_optional(pool)
    .await
    .context("insert_award failed")?;

    Ok(row.map(|(id,)| id))
}

/// Fetch a single award row, used right after `insert_award` to pick up the
/// database-assigned `awarded_at` for deterministic badge rendering.
pub async fn fetch_award(pool: &PgPool, award_id: i64) -> Result<Award> {
    let row = sqlx::query(
        r#"
        select award_id, player_id, rule_id, scope_key, level, title, tier,
               awarded_at, stats, issuer, version, asset_svg_url
        from player_awards
        where award_id = $1
        "#,
    )
    .bind(award_id)
    .fetch_one(pool)
    .await
    .context("fetch_award failed")?;

    Ok(Award {
        award_id: row.try_get("award_id")?,
        player_id: row.try_get("player_id")?,
        rule_id: row.try_get("rule_id")?,
        scope_key: row.try_get("scope_key")?,
        level: row.try_get("level")?,
        title: row.try_get("title")?,
        tier: row.try_get("tier")?,
        awarded_at: row.try_get("awarded_at")?,
        stats: row.try_get("stats")?,
        issuer: row.try_get("issuer")?,
        version: row.try_get("version")?,
        asset_svg_url: row.try_get("asset_svg_url")?,
    })
}

/// Set `asset_svg_url` unconditionally. Last writer wins: concurrent
/// re-renders of the same award are expected to produce identical URLs by
/// construction, so there is no conflict to resolve.
pub async fn attach_asset_url(pool: &PgPool, award_id: i64, url: &str) -> Result<()> {
    sqlx::query("update player_awards set asset_svg_url = $2 where award_id = $1")
        .bind(award_id)
        .bind(url)
        .execute(pool)
        .await
        .context("attach_asset_url failed")?;
    Ok(())
}
