use serde_json::Value;
use std::collections::HashMap;

/// The three flat scopes a predicate is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    per_game: HashMap<String, Value>,
    season: HashMap<String, Value>,
    career: HashMap<String, Value>,
}

impl EvalContext {
    pub fn new(
        per_game: HashMap<String, Value>,
        season: HashMap<String, Value>,
        career: HashMap<String, Value>,
    ) -> Self {
        Self {
            per_game,
            season,
            career,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve a scope name to its map, or `None` if unrecognized.
    pub(crate) fn scope(&self, name: &str) -> Option<&HashMap<String, Value>> {
        match name {
            "per_game" => Some(&self.per_game),
            "season" => Some(&self.season),
            "career" => Some(&self.career),
            _ => None,
        }
    }

    /// Resolve a dotted path `"scope.field"`. Missing scope, missing field,
    /// or a path without a dot all resolve to `None`.
    pub(crate) fn lookup(&self, path: &str) -> Option<&Value> {
        let (scope, field) = path.split_once('.')?;
        self.scope(scope)?.get(field)
    }
}
