use serde_json::Value;
use std::collections::HashMap;

/// The fixed set of numeric per-game stat keys. Missing keys default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerGameStats {
    pub points: f64,
    pub ast: f64,
    pub reb: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    pub minutes: f64,
    pub fgm: f64,
    pub fga: f64,
    pub tpm: f64,
    pub tpa: f64,
    pub ftm: f64,
    pub fta: f64,
}

impl PerGameStats {
    const KEYS: [&'static str; 13] = [
        "points", "ast", "reb", "stl", "blk", "tov", "minutes", "fgm", "fga", "tpm", "tpa", "ftm",
        "fta",
    ];

    /// Extract from an event payload. Missing keys default to zero; keys that
    /// are present but not a JSON number also default to zero.
    pub fn from_payload(payload: &HashMap<String, Value>) -> Self {
        let get = |key: &str| -> f64 {
            payload
                .get(key)
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        Self {
            points: get("points"),
            ast: get("ast"),
            reb: get("reb"),
            stl: get("stl"),
            blk: get("blk"),
            tov: get("tov"),
            minutes: get("minutes"),
            fgm: get("fgm"),
            fga: get("fga"),
            tpm: get("tpm"),
            tpa: get("tpa"),
            ftm: get("ftm"),
            fta: get("fta"),
        }
    }

    /// Flat `{key}` → value map, used to build the `per_game` evaluation scope.
    pub fn to_map(&self) -> HashMap<String, Value> {
        let mut m = HashMap::with_capacity(Self::KEYS.len());
        m.insert("points".to_string(), Value::from(self.points));
        m.insert("ast".to_string(), Value::from(self.ast));
        m.insert("reb".to_string(), Value::from(self.reb));
        m.insert("stl".to_string(), Value::from(self.stl));
        m.insert("blk".to_string(), Value::from(self.blk));
        m.insert("tov".to_string(), Value::from(self.tov));
        m.insert("minutes".to_string(), Value::from(self.minutes));
        m.insert("fgm".to_string(), Value::from(self.fgm));
        m.insert("fga".to_string(), Value::from(self.fga));
        m.insert("tpm".to_string(), Value::from(self.tpm));
        m.insert("tpa".to_string(), Value::from(self.tpa));
        m.insert("ftm".to_string(), Value::from(self.ftm));
        m.insert("fta".to_string(), Value::from(self.fta));
        m
    }

    /// `{key}_total` → value map, used to build the `season`/`career` scopes.
    pub fn to_total_map(&self) -> HashMap<String, Value> {
        self.to_map()
            .into_iter()
            .map(|(k, v)| (format!("{k}_total"), v))
            .collect()
    }

    /// Elementwise sum, used by the counter store's commutative upsert.
    pub fn add(&self, other: &PerGameStats) -> PerGameStats {
        PerGameStats {
            points: self.points + other.points,
            ast: self.ast + other.ast,
            reb: self.reb + other.reb,
            stl: self.stl + other.stl,
            blk: self.blk + other.blk,
            tov: self.tov + other.tov,
            minutes: self.minutes + other.minutes,
            fgm: self.fgm + other.fgm,
            fga: self.fga + other.fga,
            tpm: self.tpm + other.tpm,
            tpa: self.tpa + other.tpa,
            ftm: self.ftm + other.ftm,
            fta: self.fta + other.fta,
        }
    }

    /// `has_50pt_game = points >= 50`.
    pub fn has_50pt_game(&self) -> bool {
        self.points >= 50.0
    }

    /// `d = count(x >= 10 for x in {points, ast, reb, stl, blk})`.
    fn double_digit_count(&self) -> usize {
        [self.points, self.ast, self.reb, self.stl, self.blk]
            .iter()
            .filter(|x| **x >= 10.0)
            .count()
    }

    pub fn has_double_double(&self) -> bool {
        self.double_digit_count() >= 2
    }

    pub fn has_triple_double(&self) -> bool {
        self.double_digit_count() >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(points: f64, ast: f64, reb: f64, stl: f64, blk: f64) -> HashMap<String, Value> {
        HashMap::from([
            ("points".to_string(), json!(points)),
            ("ast".to_string(), json!(ast)),
            ("reb".to_string(), json!(reb)),
            ("stl".to_string(), json!(stl)),
            ("blk".to_string(), json!(blk)),
        ])
    }

    #[test]
    fn missing_and_non_numeric_keys_default_to_zero() {
        let mut p = HashMap::new();
        p.insert("points".to_string(), json!("not a number"));
        let s = PerGameStats::from_payload(&p);
        assert_eq!(s.points, 0.0);
        assert_eq!(s.ast, 0.0);
    }

    #[test]
    fn fifty_point_game_flag() {
        let s = PerGameStats::from_payload(&payload(52.0, 4.0, 6.0, 0.0, 0.0));
        assert!(s.has_50pt_game());
        assert!(!s.has_double_double());
        assert!(!s.has_triple_double());
    }

    #[test]
    fn triple_double_flag() {
        let s = PerGameStats::from_payload(&payload(10.0, 10.0, 10.0, 2.0, 1.0));
        assert!(s.has_double_double());
        assert!(s.has_triple_double());
        assert!(!s.has_50pt_game());
    }

    #[test]
    fn addition_is_commutative() {
        let a = PerGameStats::from_payload(&payload(10.0, 2.0, 3.0, 1.0, 0.0));
        let b = PerGameStats::from_payload(&payload(20.0, 5.0, 1.0, 0.0, 2.0));
        assert_eq!(a.add(&b), b.add(&a));
    }
}
