//! Shared domain types for the achievements worker: events, queue leases,
//! per-game stats, player counters, rules, and awards — plus the canonical
//! JSON helper used to make snapshots and embedded metadata byte-stable.

mod canonical;
mod stats;

pub use canonical::to_canonical_string;
pub use stats::PerGameStats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An immutable external record. Never mutated by this worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_type: String,
    pub payload: HashMap<String, Value>,
    pub player_id: Option<String>,
    pub match_id: Option<String>,
    pub season_id: Option<String>,
    pub league_id: Option<String>,
    pub game_year: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Event {
    pub const TYPE_PLAYER_STAT: &'static str = "player_stat_event";
    pub const TYPE_MATCH: &'static str = "match_event";
}

/// Lease status of a `QueueItem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Queued,
    Processing,
    Done,
    Error,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Queued => "queued",
            QueueStatus::Processing => "processing",
            QueueStatus::Done => "done",
            QueueStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(QueueStatus::Queued),
            "processing" => Some(QueueStatus::Processing),
            "done" => Some(QueueStatus::Done),
            "error" => Some(QueueStatus::Error),
            _ => None,
        }
    }
}

/// A lease record over an `Event`.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub queue_id: i64,
    pub event_id: String,
    pub status: QueueStatus,
    pub attempts: i32,
    pub visible_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Scope an achievement counter or rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    PerGame,
    Season,
    Career,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::PerGame => "per_game",
            Scope::Season => "season",
            Scope::Career => "career",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "per_game" => Some(Scope::PerGame),
            "season" => Some(Scope::Season),
            "career" => Some(Scope::Career),
            _ => None,
        }
    }
}

/// A per-(player, scope, season) aggregate row.
#[derive(Debug, Clone)]
pub struct PlayerCounters {
    pub player_id: String,
    pub scope: Scope,
    pub season_id: Option<String>,
    pub games_played: i64,
    pub totals: PerGameStats,
    pub has_50pt_game: bool,
    pub has_triple_double: bool,
    pub has_double_double: bool,
    pub max_pts_game: f64,
    pub max_ast_game: f64,
    pub max_reb_game: f64,
    pub max_stl_game: f64,
    pub max_blk_game: f64,
}

impl PlayerCounters {
    /// Flatten to a `{stat}_total` / `max_*_game` / flag mapping matching the
    /// dotted-path context the evaluator expects under `season`/`career`.
    pub fn to_context_map(&self) -> HashMap<String, Value> {
        let mut m = self.totals.to_total_map();
        m.insert("games_played".to_string(), Value::from(self.games_played));
        m.insert("has_50pt_game".to_string(), Value::from(self.has_50pt_game));
        m.insert(
            "has_triple_double".to_string(),
            Value::from(self.has_triple_double),
        );
        m.insert(
            "has_double_double".to_string(),
            Value::from(self.has_double_double),
        );
        m.insert("max_pts_game".to_string(), Value::from(self.max_pts_game));
        m.insert("max_ast_game".to_string(), Value::from(self.max_ast_game));
        m.insert("max_reb_game".to_string(), Value::from(self.max_reb_game));
        m.insert("max_stl_game".to_string(), Value::from(self.max_stl_game));
        m.insert("max_blk_game".to_string(), Value::from(self.max_blk_game));
        m
    }
}

/// A declarative achievement rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub rule_id: i64,
    pub title: String,
    pub tier: String,
    pub scope: Scope,
    pub predicate: Value,
    pub is_active: bool,
    pub game_year: Option<String>,
    pub league_id: Option<String>,
    pub season_id: Option<String>,
}

/// An issued award.
#[derive(Debug, Clone)]
pub struct Award {
    pub award_id: i64,
    pub player_id: String,
    pub rule_id: i64,
    pub scope_key: Option<String>,
    pub level: i32,
    pub title: String,
    pub tier: String,
    pub awarded_at: DateTime<Utc>,
    pub stats: Value,
    pub issuer: String,
    pub version: i32,
    pub asset_svg_url: Option<String>,
}

/// Derive `scope_key` per rule scope: match for per_game, season for season,
/// `None` for career.
pub fn scope_key_for(scope: Scope, match_id: Option<&str>, season_id: Option<&str>) -> Option<String> {
    match scope {
        Scope::PerGame => match_id.map(|s| s.to_string()),
        Scope::Season => season_id.map(|s| s.to_string()),
        Scope::Career => None,
    }
}
