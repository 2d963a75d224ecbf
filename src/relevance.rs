// src/relevance.rs
//! COA ↔ threat relevance policy.
//!
//! Precedence, first hit wins:
//! 1. critical pair table, exact `(coa_id, threat_id)`
//! 2. type-level table, `coa_type` (case-insensitive) × normalized threat-type code,
//!    refined by keyword Jaccard within ±10% of the base value
//! 3. keyword-only Jaccard
//! 4. neutral default 0.5
//!
//! Tables are built once in [`RelevancePolicy::new`] and never change afterwards.

use crate::error::{Degraded, Loaded};
use crate::keywords::KeywordSet;
use crate::normalize::{clamp01, fold_label};
use crate::tables::{CriticalPairRow, ScoringTables, TypeRelevanceRow};
use crate::telemetry::{anon_hash, dev_logging_enabled, truncate_vec};
use crate::threat_type::ThreatTypeNormalizer;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Score for pairs no tier can judge.
pub const NEUTRAL_RELEVANCE: f32 = 0.5;

/// Multiplier range applied to the type-level base: `0.9 + J * 0.2`.
const KEYWORD_ADJUST_FLOOR: f32 = 0.9;
const KEYWORD_ADJUST_SPAN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceTier {
    CriticalPair,
    TypeLevel,
    KeywordOnly,
    Default,
}

impl RelevanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelevanceTier::CriticalPair => "critical_pair",
            RelevanceTier::TypeLevel => "type_level",
            RelevanceTier::KeywordOnly => "keyword_only",
            RelevanceTier::Default => "default",
        }
    }
}

/// Inputs for one relevance evaluation.
#[derive(Debug, Clone, Default)]
pub struct RelevanceQuery {
    pub coa_id: String,
    pub coa_type: String,
    pub threat_id: String,
    pub threat_type: String,
    pub coa_keywords: KeywordSet,
    pub threat_keywords: KeywordSet,
}

impl RelevanceQuery {
    pub fn new(
        coa_id: impl Into<String>,
        coa_type: impl Into<String>,
        threat_id: impl Into<String>,
        threat_type: impl Into<String>,
    ) -> Self {
        Self {
            coa_id: coa_id.into(),
            coa_type: coa_type.into(),
            threat_id: threat_id.into(),
            threat_type: threat_type.into(),
            ..Default::default()
        }
    }

    pub fn keywords(mut self, coa: KeywordSet, threat: KeywordSet) -> Self {
        self.coa_keywords = coa;
        self.threat_keywords = threat;
        self
    }

    /// Keyword tiers only run when both sides carry at least one keyword.
    fn keywords_usable(&self) -> bool {
        !self.coa_keywords.is_empty() && !self.threat_keywords.is_empty()
    }
}

/// Result of a relevance evaluation, with enough context to explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceOutcome {
    pub score: f32,
    pub tier: RelevanceTier,
    pub threat_type_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_relevance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_similarity: Option<f32>,
    pub reasons: Vec<String>,
}

/// Type-level row after threat-type normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTypeRow {
    pub coa_type: String,
    pub threat_type_code: String,
    /// Value as it appeared in the source, kept for diagnostics.
    pub threat_type_original: String,
    pub base_relevance: f32,
}

#[derive(Debug, Clone, Default)]
pub struct RelevancePolicy {
    normalizer: ThreatTypeNormalizer,
    /// (folded coa_type, threat_type_code) → row
    type_rows: HashMap<(String, String), NormalizedTypeRow>,
    /// (coa_id, threat_id) → score
    critical: HashMap<(String, String), f32>,
}

impl RelevancePolicy {
    /// Build from loaded tables. Rows with empty keys or non-finite scores are
    /// dropped and reported as [`Degraded::DroppedRow`].
    pub fn new(tables: &ScoringTables) -> Loaded<Self> {
        let normalizer = ThreatTypeNormalizer::new(&tables.threat_types);
        let mut degraded = Vec::new();

        let mut type_rows = HashMap::with_capacity(tables.type_relevance.len());
        for row in &tables.type_relevance {
            match normalize_type_row(&normalizer, row) {
                Ok(n) => {
                    let key = (fold_label(&n.coa_type), n.threat_type_code.clone());
                    type_rows.entry(key).or_insert(n);
                }
                Err(reason) => {
                    warn!(target: "relevance", coa_type = %row.coa_type, threat_type = %row.threat_type, %reason, "type relevance row dropped");
                    degraded.push(Degraded::DroppedRow {
                        table: "type_relevance".into(),
                        reason,
                    });
                }
            }
        }

        let mut critical = HashMap::with_capacity(tables.critical_pairs.len());
        for row in &tables.critical_pairs {
            match critical_key(row) {
                Ok((key, score)) => {
                    critical.entry(key).or_insert(score);
                }
                Err(reason) => {
                    warn!(target: "relevance", coa_id = %row.coa_id, threat_id = %row.threat_id, %reason, "critical pair row dropped");
                    degraded.push(Degraded::DroppedRow {
                        table: "critical_pairs".into(),
                        reason,
                    });
                }
            }
        }

        info!(
            target: "relevance",
            threat_types = normalizer.len(),
            type_rows = type_rows.len(),
            critical_pairs = critical.len(),
            "relevance policy ready"
        );

        Loaded {
            value: Self {
                normalizer,
                type_rows,
                critical,
            },
            degraded,
        }
    }

    pub fn normalizer(&self) -> &ThreatTypeNormalizer {
        &self.normalizer
    }

    pub fn normalize_threat_type(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Normalized type-level row for `(coa_type, threat_type)`, if any.
    pub fn type_row(&self, coa_type: &str, threat_type: &str) -> Option<&NormalizedTypeRow> {
        let code = self.normalizer.normalize(threat_type);
        self.type_rows.get(&(fold_label(coa_type), code))
    }

    pub fn score(&self, query: &RelevanceQuery) -> f32 {
        self.evaluate(query).score
    }

    /// Convenience form without keywords.
    pub fn score_pair(&self, coa_id: &str, coa_type: &str, threat_id: &str, threat_type: &str) -> f32 {
        self.score(&RelevanceQuery::new(coa_id, coa_type, threat_id, threat_type))
    }

    pub fn evaluate(&self, query: &RelevanceQuery) -> RelevanceOutcome {
        let code = self.normalizer.normalize(&query.threat_type);
        let mut reasons = Vec::new();
        if code != query.threat_type {
            reasons.push(format!("threat_type:{}->{}", query.threat_type, code));
        }

        // 1) critical pair override
        let pair = (query.coa_id.trim().to_string(), query.threat_id.trim().to_string());
        if let Some(&score) = self.critical.get(&pair) {
            reasons.push(format!("tier:{}", RelevanceTier::CriticalPair.as_str()));
            return self.finish(query, RelevanceOutcome {
                score,
                tier: RelevanceTier::CriticalPair,
                threat_type_code: code,
                base_relevance: None,
                keyword_similarity: None,
                reasons,
            });
        }

        let similarity = query
            .keywords_usable()
            .then(|| query.coa_keywords.jaccard(&query.threat_keywords));

        // 2) type level, optionally refined by keywords
        if let Some(row) = self.type_rows.get(&(fold_label(&query.coa_type), code.clone())) {
            let base = row.base_relevance;
            let score = match similarity {
                Some(j) => clamp01(base * (KEYWORD_ADJUST_FLOOR + j * KEYWORD_ADJUST_SPAN)),
                None => base,
            };
            reasons.push(format!("tier:{}", RelevanceTier::TypeLevel.as_str()));
            reasons.push(format!("base:{:.3}", base));
            if let Some(j) = similarity {
                reasons.push(format!("jaccard:{:.3}", j));
            }
            return self.finish(query, RelevanceOutcome {
                score,
                tier: RelevanceTier::TypeLevel,
                threat_type_code: code,
                base_relevance: Some(base),
                keyword_similarity: similarity,
                reasons,
            });
        }

        // 3) keywords only
        if let Some(j) = similarity {
            reasons.push(format!("tier:{}", RelevanceTier::KeywordOnly.as_str()));
            reasons.push(format!("jaccard:{:.3}", j));
            return self.finish(query, RelevanceOutcome {
                score: clamp01(j),
                tier: RelevanceTier::KeywordOnly,
                threat_type_code: code,
                base_relevance: None,
                keyword_similarity: Some(j),
                reasons,
            });
        }

        // 4) neutral
        reasons.push(format!("tier:{}", RelevanceTier::Default.as_str()));
        self.finish(query, RelevanceOutcome {
            score: NEUTRAL_RELEVANCE,
            tier: RelevanceTier::Default,
            threat_type_code: code,
            base_relevance: None,
            keyword_similarity: None,
            reasons,
        })
    }

    fn finish(&self, query: &RelevanceQuery, outcome: RelevanceOutcome) -> RelevanceOutcome {
        if dev_logging_enabled() {
            // Never log raw ids. Only hashed pair id + short reasons.
            let id = anon_hash(&format!("{}|{}", query.coa_id, query.threat_id));
            info!(
                target: "relevance",
                %id,
                score = outcome.score,
                tier = outcome.tier.as_str(),
                reasons = ?truncate_vec(&outcome.reasons, 5),
                "relevance scored"
            );
        }
        outcome
    }
}

fn normalize_type_row(
    normalizer: &ThreatTypeNormalizer,
    row: &TypeRelevanceRow,
) -> Result<NormalizedTypeRow, String> {
    if row.coa_type.trim().is_empty() || row.threat_type.trim().is_empty() {
        return Err("empty coa_type or threat_type".into());
    }
    if !row.base_relevance.is_finite() {
        return Err(format!("non-finite base_relevance {}", row.base_relevance));
    }
    Ok(NormalizedTypeRow {
        coa_type: row.coa_type.trim().to_string(),
        threat_type_code: normalizer.normalize(&row.threat_type),
        threat_type_original: row.threat_type.clone(),
        base_relevance: clamp01(row.base_relevance),
    })
}

fn critical_key(row: &CriticalPairRow) -> Result<((String, String), f32), String> {
    let coa = row.coa_id.trim();
    let threat = row.threat_id.trim();
    if coa.is_empty() || threat.is_empty() {
        return Err("empty coa_id or threat_id".into());
    }
    if !row.relevance_score.is_finite() {
        return Err(format!("non-finite relevance_score {}", row.relevance_score));
    }
    Ok(((coa.to_string(), threat.to_string()), clamp01(row.relevance_score)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TOML: &str = r#"
[[threat_types]]
code = "TT-ART"
name = "포병 공격"

[[threat_types]]
code = "TT-INF"
name = "침투"

[[type_relevance]]
coa_type = "Counter_Fire"
threat_type = "포병 공격"
base_relevance = 0.8

[[type_relevance]]
coa_type = "counter_fire"
threat_type = "TT-INF"
base_relevance = 0.3

[[type_relevance]]
coa_type = "defense"
threat_type = "TT-INF"
base_relevance = 1.0

[[critical_pairs]]
coa_id = "COA-001"
threat_id = "THR-001"
relevance_score = 0.95
"#;

    fn policy() -> RelevancePolicy {
        let tables = ScoringTables::from_toml_str(TEST_TOML).expect("load test tables");
        let loaded = RelevancePolicy::new(&tables);
        assert!(!loaded.is_degraded());
        loaded.value
    }

    fn kw(words: &[&str]) -> KeywordSet {
        words.iter().collect()
    }

    #[test]
    fn critical_pair_wins_over_everything() {
        let p = policy();
        let q = RelevanceQuery::new("COA-001", "counter_fire", "THR-001", "포병 공격")
            .keywords(kw(&["x"]), kw(&["y"]));
        let out = p.evaluate(&q);
        assert_eq!(out.tier, RelevanceTier::CriticalPair);
        assert!((out.score - 0.95).abs() < 1e-6);
        assert_eq!(out.keyword_similarity, None);
    }

    #[test]
    fn type_level_uses_normalized_code_and_folded_coa_type() {
        let p = policy();
        let out = p.evaluate(&RelevanceQuery::new("COA-9", "COUNTER_FIRE", "THR-9", "TT-ART"));
        assert_eq!(out.tier, RelevanceTier::TypeLevel);
        assert!((out.score - 0.8).abs() < 1e-6);
        assert_eq!(out.threat_type_code, "TT-ART");

        // free-text threat type resolves through the master table
        assert!((p.score_pair("c", "counter_fire", "t", "침투") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn keywords_refine_within_ten_percent() {
        let p = policy();
        let full = RelevanceQuery::new("c", "counter_fire", "t", "TT-ART")
            .keywords(kw(&["artillery", "radar"]), kw(&["artillery", "radar"]));
        assert!((p.score(&full) - 0.88).abs() < 1e-5);

        let none = RelevanceQuery::new("c", "counter_fire", "t", "TT-ART")
            .keywords(kw(&["artillery"]), kw(&["armor"]));
        assert!((p.score(&none) - 0.72).abs() < 1e-5);
    }

    #[test]
    fn keyword_boost_is_clamped_at_one() {
        let p = policy();
        let q = RelevanceQuery::new("c", "defense", "t", "TT-INF").keywords(kw(&["a"]), kw(&["a"]));
        assert_eq!(p.score(&q), 1.0);
    }

    #[test]
    fn one_sided_keywords_do_not_adjust() {
        let p = policy();
        let q = RelevanceQuery::new("c", "counter_fire", "t", "TT-ART").keywords(kw(&["a"]), KeywordSet::new());
        let out = p.evaluate(&q);
        assert!((out.score - 0.8).abs() < 1e-6);
        assert_eq!(out.keyword_similarity, None);
    }

    #[test]
    fn keyword_only_then_default() {
        let p = policy();
        let q = RelevanceQuery::new("c", "unknown", "t", "TT-ART")
            .keywords(kw(&["a", "b"]), kw(&["b", "c", "d"]));
        let out = p.evaluate(&q);
        assert_eq!(out.tier, RelevanceTier::KeywordOnly);
        assert!((out.score - 0.25).abs() < 1e-6);

        let out = p.evaluate(&RelevanceQuery::new("c", "unknown", "t", "unknown"));
        assert_eq!(out.tier, RelevanceTier::Default);
        assert_eq!(out.score, NEUTRAL_RELEVANCE);
    }

    #[test]
    fn original_threat_type_is_kept_on_rows() {
        let p = policy();
        let row = p.type_row("counter_fire", "TT-ART").expect("row");
        assert_eq!(row.threat_type_original, "포병 공격");
        assert_eq!(row.threat_type_code, "TT-ART");
    }

    #[test]
    fn bad_rows_are_dropped_and_reported() {
        let tables = ScoringTables::from_toml_str(
            r#"
[[type_relevance]]
coa_type = ""
threat_type = "TT-ART"
base_relevance = 0.5

[[type_relevance]]
coa_type = "defense"
threat_type = "TT-ART"
base_relevance = 1.7

[[critical_pairs]]
coa_id = "COA-1"
threat_id = ""
relevance_score = 0.9
"#,
        )
        .expect("parse");
        let loaded = RelevancePolicy::new(&tables);
        assert_eq!(loaded.degraded.len(), 2);
        // out-of-range base is clamped rather than dropped
        assert_eq!(loaded.value.score_pair("c", "defense", "t", "TT-ART"), 1.0);
    }

    #[test]
    fn empty_policy_is_neutral() {
        let p = RelevancePolicy::default();
        assert_eq!(p.score_pair("", "", "", ""), NEUTRAL_RELEVANCE);
        assert_eq!(p.normalize_threat_type(""), "");
    }
}
