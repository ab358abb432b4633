//! Pure, deterministic evaluator for JSON-valued achievement predicates.
//!
//! Deterministic, pure logic. No IO, no time, no database calls — the
//! evaluation context is built by the caller and passed in whole.
//!
//! Rules are user-authored and must be sandboxed from the rest of the
//! pipeline: a malformed predicate, a missing path, or an arity mismatch
//! never panics or returns an error — it folds to `false` for that rule.
//! There is deliberately no `Result`-returning entry point.

mod context;
mod node;

pub use context::EvalContext;
pub use node::Node;

use serde_json::Value;

/// Parse `predicate` and evaluate it against `context`, returning whether
/// the rule fires. Any malformed shape, missing path, or arity mismatch
/// resolves to `false` rather than propagating an error.
pub fn eval_predicate(predicate: &Value, context: &EvalContext) -> bool {
    let node = Node::parse(predicate);
    node.eval(context).to_bool()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn ctx(per_game: HashMap<String, Value>) -> EvalContext {
        EvalContext::new(per_game, HashMap::new(), HashMap::new())
    }

    #[test]
    fn fifty_point_game_rule_fires() {
        let c = ctx(HashMap::from([("points".to_string(), json!(52))]));
        let predicate = json!({">=": ["per_game.points", 50]});
        assert!(eval_predicate(&predicate, &c));
    }

    #[test]
    fn typo_in_path_yields_false_not_error() {
        let c = ctx(HashMap::from([("points".to_string(), json!(52))]));
        let predicate = json!({">=": ["per_game.pointz", 50]});
        assert!(!eval_predicate(&predicate, &c));
    }

    #[test]
    fn and_over_zero_children_is_true() {
        assert!(eval_predicate(&json!({"and": []}), &EvalContext::empty()));
    }

    #[test]
    fn or_over_zero_children_is_false() {
        assert!(!eval_predicate(&json!({"or": []}), &EvalContext::empty()));
    }

    #[test]
    fn division_by_zero_yields_zero() {
        // 0 / 0 == 0, and 0 compared >= 1 is false.
        let predicate = json!({">=": [{"/": [0, 0]}, 1]});
        assert!(!eval_predicate(&predicate, &EvalContext::empty()));
    }

    #[test]
    fn arithmetic_node_as_boolean_is_nonzero_test() {
        // `{"-": [5, 5]}` resolves to 0, which is falsy in boolean position.
        let predicate = json!({"not": [{"-": [5, 5]}]});
        assert!(eval_predicate(&predicate, &EvalContext::empty()));
    }

    #[test]
    fn wrong_arity_is_false() {
        let predicate = json!({">=": ["per_game.points"]});
        assert!(!eval_predicate(&predicate, &EvalContext::empty()));
    }

    #[test]
    fn has_checks_key_presence_in_a_scope() {
        let c = ctx(HashMap::from([("points".to_string(), json!(10))]));
        assert!(eval_predicate(
            &json!({"has": ["per_game", "points"]}),
            &c
        ));
        assert!(!eval_predicate(
            &json!({"has": ["per_game", "ast"]}),
            &c
        ));
    }

    #[test]
    fn triple_double_example() {
        let c = ctx(HashMap::from([
            ("points".to_string(), json!(10)),
            ("ast".to_string(), json!(10)),
            ("reb".to_string(), json!(10)),
            ("stl".to_string(), json!(2)),
            ("blk".to_string(), json!(1)),
        ]));
        let predicate = json!({
            "and": [
                {">=": ["per_game.points", 10]},
                {">=": ["per_game.ast", 10]},
                {">=": ["per_game.reb", 10]},
            ]
        });
        assert!(eval_predicate(&predicate, &c));
    }
}
