use ach_schemas::{Rule, Scope};
use anyhow::{Context, Result};
use sqlx::{PgPool, Row};

/// Rules that are active, in one of the three accepted scopes, and whose
/// own filters (if set) match the given event context. `None` args mean
/// "this event has no value for that filter", which only matches rules
/// that also leave the corresponding filter unset.
pub async fn fetch_candidate_rules(
    pool: &PgPool,
    game_year: Option<&str>,
    league_id: Option<&str>,
    season_id: Option<&str>,
) -> Result<Vec<Rule>> {
    let rows = sqlx::query(
        r#"
        select rule_id, title, tier, scope, predicate, is_active,
               game_year, league_id, season_id
        from achievement_rules
        where is_active = true
          and scope in ('per_game', 'season', 'career')
          and (game_year is null or game_year = $1)
          and (league_id is null or league_id = $2)
          and (season_id is null or season_id = $3)
        order by rule_id asc
        "#,
    )
    .bind(game_year)
    .bind(league_id)
    .bind(season_id)
    .fetch_all(pool)
    .await
    .context("fetch_candidate_rules failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let scope: String = row.try_get("scope")?;
        out.push(Rule {
            rule_id: row.try_get("rule_id")?,
            title: row.try_get("title")?,
            tier: row.try_get("tier")?,
            scope: Scope::parse(&scope)
                .with_context(|| format!("unrecognized rule scope {scope:?}"))?,
            predicate: row.try_get("predicate")?,
            is_active: row.try_get("is_active")?,
            game_year: row.try_get("game_year")?,
            league_id: row.try_get("league_id")?,
            season_id: row.try_get("season_id")?,
        });
    }
    Ok(out)
}
