use ach_schemas::{to_canonical_string, Award};
use serde_json::json;

struct Palette {
    background: &'static str,
    accent: &'static str,
}

const DEFAULT_PALETTE: Palette = Palette {
    background: "#2b2d42",
    accent: "#8d99ae",
};

/// Tier name (case-insensitive) to palette. Unknown tiers fall back to the
/// neutral default rather than failing the render.
fn palette_for_tier(tier: &str) -> Palette {
    match tier.to_ascii_lowercase().as_str() {
        "bronze" => Palette {
            background: "#6b3f1d",
            accent: "#cd7f32",
        },
        "silver" => Palette {
            background: "#3c3c3c",
            accent: "#c0c0c0",
        },
        "gold" => Palette {
            background: "#4d3b00",
            accent: "#ffd700",
        },
        "platinum" => Palette {
            background: "#2e3b3e",
            accent: "#e5e4e2",
        },
        "legendary" => Palette {
            background: "#3a0d4f",
            accent: "#ff7edb",
        },
        _ => DEFAULT_PALETTE,
    }
}

/// Escape the five XML-significant characters. This is an invariant, not a
/// convenience: a malicious rule title or tier must never break out of its
/// text element.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Render a deterministic SVG badge for `award`. Identical award input
/// (every field embedded below) always produces byte-identical output —
/// nothing time-dependent or random is interpolated into the body.
pub fn render_badge_svg(award: &Award) -> String {
    let palette = palette_for_tier(&award.tier);

    let metadata = json!({
        "player_id": award.player_id,
        "rule_id": award.rule_id,
        "scope_key": award.scope_key,
        "level": award.level,
        "award_id": award.award_id,
        "version": award.version,
    });
    let metadata_json = to_canonical_string(&metadata);

    let title = xml_escape(&award.title);
    let tier = xml_escape(&award.tier);
    let issuer = xml_escape(&award.issuer);
    let date = award.awarded_at.format("%Y-%m-%d").to_string();
    let metadata_escaped = xml_escape(&metadata_json);

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="360" height="200" viewBox="0 0 360 200">
  <rect width="360" height="200" rx="12" fill="{background}"/>
  <rect x="8" y="8" width="344" height="184" rx="8" fill="none" stroke="{accent}" stroke-width="2"/>
  <text x="24" y="56" font-family="sans-serif" font-size="22" fill="{accent}">{title}</text>
  <text x="24" y="86" font-family="sans-serif" font-size="14" fill="#ffffff">{tier}</text>
  <text x="24" y="160" font-family="sans-serif" font-size="12" fill="#ffffff">{date}</text>
  <text x="24" y="178" font-family="sans-serif" font-size="12" fill="#ffffff">{issuer}</text>
  <metadata>{metadata_escaped}</metadata>
</svg>
"#,
        background = palette.background,
        accent = palette.accent,
        title = title,
        tier = tier,
        date = date,
        issuer = issuer,
        metadata_escaped = metadata_escaped,
    )
}
