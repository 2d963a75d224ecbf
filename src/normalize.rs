//! Text folding and numeric helpers shared by both engines.
//!
//! Two folds live here:
//! - [`fold_label`] for labels compared as words (threat types, keywords, priorities):
//!   trim, lowercase, collapse inner whitespace.
//! - [`normalize_resource_name`] for unit/asset names compared as compact keys:
//!   lowercase and drop whitespace plus joining punctuation, so `"K-9 자주포대대"`
//!   and `"k9자주포대대"` land on the same key.
//!
//! Both are idempotent.

/// Characters removed from resource names besides whitespace.
const RESOURCE_SEPARATORS: [char; 8] = ['-', '_', '–', '—', '.', ',', '·', '/'];

/// Trim, lowercase, collapse runs of whitespace into a single space.
pub fn fold_label(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compact lookup key for resource / asset names.
pub fn normalize_resource_name(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !RESOURCE_SEPARATORS.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Clamp to [0.0, 1.0]; NaN collapses to 0.0.
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Round to three decimal places.
pub fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}
