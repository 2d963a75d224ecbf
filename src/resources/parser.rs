//! Free-text resource requirement parsing.
//!
//! Input is a comma-separated list where each item is `"<name>(<priority>)"` or a bare
//! `"<name>"`, e.g. `"포병대대(필수), 보병여단(권장), 공격헬기(선택)"`.
//! Priority labels go through a Korean/English synonym table; anything unknown, and
//! any bare name, becomes `recommended`.

use crate::normalize::fold_label;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// name, then a trailing parenthesized group (half- or full-width parens)
static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.*?)\s*[(（](?P<prio>[^()（）]*)[)）]\s*$").expect("requirement item regex")
});

const ITEM_SEPARATORS: [char; 2] = [',', '，'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Required,
    Recommended,
    Optional,
}

impl Priority {
    /// Weight used in availability scoring.
    pub fn weight(self) -> f32 {
        match self {
            Priority::Required => 1.0,
            Priority::Recommended => 0.6,
            Priority::Optional => 0.3,
        }
    }

    /// Map a priority label (Korean/English, full or abbreviated) to a priority.
    pub fn from_label(label: &str) -> Option<Self> {
        match fold_label(label).as_str() {
            "필수" | "필수적" | "required" | "req" | "mandatory" | "must" | "essential" => {
                Some(Priority::Required)
            }
            "권장" | "권고" | "recommended" | "rec" | "recommend" | "suggested" | "should" => {
                Some(Priority::Recommended)
            }
            "선택" | "선택적" | "optional" | "opt" | "choice" | "may" => Some(Priority::Optional),
            _ => None,
        }
    }

    /// Same as [`Priority::from_label`] but unknown labels fall back to `Recommended`.
    pub fn from_label_or_default(label: &str) -> Self {
        Self::from_label(label).unwrap_or(Priority::Recommended)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Required => "required",
            Priority::Recommended => "recommended",
            Priority::Optional => "optional",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredResource {
    pub resource: String,
    pub priority: Priority,
    pub weight: f32,
}

impl RequiredResource {
    pub fn new(resource: impl Into<String>, priority: Priority) -> Self {
        Self {
            resource: resource.into(),
            priority,
            weight: priority.weight(),
        }
    }
}

/// Parse a requirement string. `None`, blank and `"nan"` yield an empty list.
pub fn parse_requirements(spec: Option<&str>) -> Vec<RequiredResource> {
    let Some(spec) = spec else {
        return Vec::new();
    };
    let trimmed = spec.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Vec::new();
    }

    trimmed
        .split(&ITEM_SEPARATORS[..])
        .filter_map(parse_item)
        .collect()
}

fn parse_item(raw: &str) -> Option<RequiredResource> {
    let item = raw.trim();
    if item.is_empty() {
        return None;
    }

    if let Some(caps) = ITEM_RE.captures(item) {
        let name = caps.name("name").map(|m| m.as_str().trim()).unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        let label = caps.name("prio").map(|m| m.as_str()).unwrap_or_default();
        return Some(RequiredResource::new(name, Priority::from_label_or_default(label)));
    }

    Some(RequiredResource::new(item, Priority::Recommended))
}
