use ach_schemas::{PerGameStats, PlayerCounters, Scope};
use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Row, Transaction};

pub struct FetchedCounters {
    pub career: Option<PlayerCounters>,
    pub season: Option<PlayerCounters>,
}

/// The idempotent entry point used by the Event Pipeline: upserts the
/// career row and, if `season_id` is present, the season row, guarded
/// behind the `processed_events` marker in one transaction so a retried
/// event cannot double-add its stats. Returns `false` (and applies
/// nothing) if this event was already processed. Both upserts share
/// `upsert_counter_row`: on insert, `games_played=1` and totals/maxima seed
/// from `stats`; on conflict, totals accumulate, maxima take the
/// elementwise max, and flags OR together (monotonic).
pub async fn apply_game_stats(
    pool: &PgPool,
    event_id: &str,
    player_id: &str,
    season_id: Option<&str>,
    stats: &PerGameStats,
) -> Result<bool> {
    let mut tx = pool.begin().await.context("apply_game_stats: begin tx")?;

    let marker: Option<(String,)> = sqlx::query_as(
        r#"
        insert into processed_events (event_id)
        values ($1)
        on conflict (event_id) do nothing
        returning event_id
        "#,
    )
    .bind(event_id)
    .fetch_optional(&mut *tx)
    .await
    .context("apply_game_stats: processed_events insert")?;

    if marker.is_none() {
        tx.commit().await.context("apply_game_stats: commit tx")?;
        return Ok(false);
    }

    upsert_counter_row(&mut tx, player_id, Scope::Career, None, stats).await?;
    if let Some(season_id) = season_id {
        upsert_counter_row(&mut tx, player_id, Scope::Season, Some(season_id), stats).await?;
    }

    tx.commit().await.context("apply_game_stats: commit tx")?;
    Ok(true)
}

const UPSERT_SET_CLAUSE: &str = r#"
    games_played       = player_counters.games_played + 1,
    points_total        = player_counters.points_total + excluded.points_total,
    ast_total           = player_counters.ast_total + excluded.ast_total,
    reb_total           = player_counters.reb_total + excluded.reb_total,
    stl_total           = player_counters.stl_total + excluded.stl_total,
    blk_total           = player_counters.blk_total + excluded.blk_total,
    tov_total           = player_counters.tov_total + excluded.tov_total,
    minutes_total       = player_counters.minutes_total + excluded.minutes_total,
    fgm_total           = player_counters.fgm_total + excluded.fgm_total,
    fga_total           = player_counters.fga_total + excluded.fga_total,
    tpm_total           = player_counters.tpm_total + excluded.tpm_total,
    tpa_total           = player_counters.tpa_total + excluded.tpa_total,
    ftm_total           = player_counters.ftm_total + excluded.ftm_total,
    fta_total           = player_counters.fta_total + excluded.fta_total,
    has_50pt_game       = player_counters.has_50pt_game or excluded.has_50pt_game,
    has_triple_double   = player_counters.has_triple_double or excluded.has_triple_double,
    has_double_double   = player_counters.has_double_double or excluded.has_double_double,
    max_pts_game        = greatest(player_counters.max_pts_game, excluded.max_pts_game),
    max_ast_game        = greatest(player_counters.max_ast_game, excluded.max_ast_game),
    max_reb_game        = greatest(player_counters.max_reb_game, excluded.max_reb_game),
    max_stl_game        = greatest(player_counters.max_stl_game, excluded.max_stl_game),
    max_blk_game        = greatest(player_counters.max_blk_game, excluded.max_blk_game),
    updated_at          = now()
"#;

/// Each scope's uniqueness lives on a different partial index (career rows
/// have `season_id is null`, so it cannot share a composite key with season
/// rows), so the upsert's `ON CONFLICT` target differs per scope.
async fn upsert_counter_row(
    tx: &mut Transaction<'_, Postgres>,
    player_id: &str,
    scope: Scope,
    season_id: Option<&str>,
    stats: &PerGameStats,
) -> Result<()> {
    let conflict_target = match scope {
        Scope::Career => "(player_id) where scope = 'career'",
        Scope::Season => "(player_id, season_id) where scope = 'season'",
        Scope::PerGame => anyhow::bail!("player_counters has no per_game scope rows"),
    };

    let query = format!(
        r#"
        insert into player_counters (
            player_id, scope, season_id, games_played,
            points_total, ast_total, reb_total, stl_total, blk_total, tov_total,
            minutes_total, fgm_total, fga_total, tpm_total, tpa_total, ftm_total, fta_total,
            has_50pt_game, has_triple_double, has_double_double,
            max_pts_game, max_ast_game, max_reb_game, max_stl_game, max_blk_game,
            updated_at
        ) values (
            $1, $2, $3, 1,
            $4, $5, $6, $7, $8, $9,
            $10, $11, $12, $13, $14, $15, $16,
            $17, $18, $19,
            $4, $5, $6, $7, $8,
            now()
        )
        on conflict {conflict_target}
        do update set {UPSERT_SET_CLAUSE}
        "#
    );

    sqlx::query(&query)
        .bind(player_id)
        .bind(scope.as_str())
        .bind(season_id)
        .bind(stats.points)
        .bind(stats.ast)
        .bind(stats.reb)
        .bind(stats.stl)
        .bind(stats.blk)
        .bind(stats.tov)
        .bind(stats.minutes)
        .bind(stats.fgm)
        .bind(stats.fga)
        .bind(stats.tpm)
        .bind(stats.tpa)
        .bind(stats.ftm)
        .bind(stats.fta)
        .bind(stats.has_50pt_game())
        .bind(stats.has_triple_double())
        .bind(stats.has_double_double())
        .execute(&mut **tx)
        .await
        .context("upsert_counter_row failed")?;

    Ok(())
}

/// Read both the career and season rows for a player in one query.
pub async fn fetch_counters(
    pool: &PgPool,
    player_id: &str,
    season_id: Option<&str>,
) -> Result<FetchedCounters> {
    let rows = sqlx::query(
        r#"
        select player_id, scope, season_id, games_played,
               points_total, ast_total, reb_total, stl_total, blk_total, tov_total,
               minutes_total, fgm_total, fga_total, tpm_total, tpa_total, ftm_total, fta_total,
               has_50pt_game, has_triple_double, has_double_double,
               max_pts_game, max_ast_game, max_reb_game, max_stl_game, max_blk_game
        from player_counters
        where player_id = $1
          and (scope = 'career' or (scope = 'season' and season_id = $2))
        "#,
    )
    .bind(player_id)
    .bind(season_id)
    .fetch_all(pool)
    .await
    .context("fetch_counters failed")?;

    let mut out = FetchedCounters {
        career: None,
        season: None,
    };
    for row in rows {
        let counters = row_to_counters(row)?;
        match counters.scope {
            Scope::Career => out.career = Some(counters),
            Scope::Season => out.season = Some(counters),
            Scope::PerGame => {}
        }
    }
    Ok(out)
}

fn row_to_counters(row: sqlx::postgres::PgRow) -> Result<PlayerCounters> {
    let scope: String = row.try_get("scope")?;
    let scope =
        Scope::parse(&scope).with_context(|| format!("unrecognized counter scope {scope:?}"))?;
    Ok(PlayerCounters {
        player_id: row.try_get("player_id")?,
        scope,
        season_id: row.try_get("season_id")?,
        games_played: row.try_get("games_played")?,
        totals: PerGameStats {
            points: row.try_get("points_total")?,
            ast: row.try_get("ast_total")?,
            reb: row.try_get("reb_total")?,
            stl: row.try_get("stl_total")?,
            blk: row.try_get("blk_total")?,
            tov: row.try_get("tov_total")?,
            minutes: row.try_get("minutes_total")?,
            fgm: row.try_get("fgm_total")?,
            fga: row.try_get("fga_total")?,
            tpm: row.try_get("tpm_total")?,
            tpa: row.try_get("tpa_total")?,
            ftm: row.try_get("ftm_total")?,
            fta: row.try_get("fta_total")?,
        },
        has_50pt_game: row.try_get("has_50pt_game")?,
        has_triple_double: row.try_get("has_triple_double")?,
        has_double_double: row.try_get("has_double_double")?,
        max_pts_game: row.try_get("max_pts_game")?,
        max_ast_game: row.try_get("max_ast_game")?,
        max_reb_game: row.try_get("max_reb_game")?,
        max_stl_game: row.try_get("max_stl_game")?,
        max_blk_game: row.try_get("max_blk_game")?,
    })
}
