//! Deterministic SVG badge rendering and upload to the object store.

mod badge;
mod object_store;

pub use badge::render_badge_svg;
pub use object_store::{HttpObjectStore, MemoryObjectStore, ObjectStore, PutRecord};

use ach_schemas::Award;
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashMap;

const CONTENT_TYPE: &str = "image/svg+xml";
const CACHE_CONTROL: &str = "public, max-age=31536000";

/// Render `award`'s badge and upload it to `badges/{player_id}/{award_id}.svg`,
/// returning `{public_base_url}/{key}`.
pub async fn generate_and_upload(
    store: &dyn ObjectStore,
    public_base_url: &str,
    award: &Award,
) -> Result<String> {
    let svg = render_badge_svg(award);
    let key = format!("badges/{}/{}.svg", award.player_id, award.award_id);

    let mut metadata = HashMap::new();
    metadata.insert("generated-by".to_string(), "achievements-worker".to_string());
    metadata.insert("generated-at".to_string(), Utc::now().to_rfc3339());

    store
        .put(&key, svg.into_bytes(), CONTENT_TYPE, CACHE_CONTROL, metadata)
        .await
        .with_context(|| format!("object store upload failed for key {key}"))?;

    Ok(format!("{}/{}", public_base_url.trim_end_matches('/'), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn award() -> Award {
        Award {
            award_id: 42,
            player_id: "p1".to_string(),
            rule_id: 7,
            scope_key: None,
            level: 1,
            title: "50-Point Game".to_string(),
            tier: "Gold".to_string(),
            awarded_at: Utc::now(),
            stats: json!({}),
            issuer: "achievements-worker".to_string(),
            version: 1,
            asset_svg_url: None,
        }
    }

    #[tokio::test]
    async fn uploads_under_the_expected_key_with_provenance_metadata() {
        let store = MemoryObjectStore::new();
        let url = generate_and_upload(&store, "https://cdn.example.com", &award())
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/badges/p1/42.svg");

        let record = store.get("badges/p1/42.svg").unwrap();
        assert_eq!(record.content_type, CONTENT_TYPE);
        assert_eq!(record.cache_control, CACHE_CONTROL);
        assert_eq!(
            record.metadata.get("generated-by").map(String::as_str),
            Some("achievements-worker")
        );
    }

    #[tokio::test]
    async fn trailing_slash_on_base_url_does_not_double_up() {
        let store = MemoryObjectStore::new();
        let url = generate_and_upload(&store, "https://cdn.example.com/", &award())
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/badges/p1/42.svg");
    }
}
