// tests/relevance_handpicked.rs
// Hand-picked tests for the relevance tiers.
// Self-contained: tables come from an inline TOML document.

use coa_scoring::{KeywordSet, RelevancePolicy, RelevanceQuery, RelevanceTier, ScoringTables};

const TEST_TOML: &str = r#"
[[threat_types]]
code = "TT-ART"
name = "포병 공격"

[[threat_types]]
code = "TT-AIR"
name = "공중 공격"

[[type_relevance]]
coa_type = "counter_fire"
threat_type = "포병 공격"
base_relevance = 0.9

[[type_relevance]]
coa_type = "air_defense"
threat_type = "TT-AIR"
base_relevance = 0.6

# Doctrine says air defense is weak vs artillery, but this pair was reviewed by hand.
[[critical_pairs]]
coa_id = "COA-AD-3"
threat_id = "THR-ART-1"
relevance_score = 0.85
"#;

fn policy() -> RelevancePolicy {
    let tables = ScoringTables::from_toml_str(TEST_TOML).expect("load inline test tables");
    RelevancePolicy::new(&tables).into_value()
}

fn kw(words: &[&str]) -> KeywordSet {
    words.iter().collect()
}

#[test]
fn critical_pair_overrides_type_table_and_keywords() {
    let p = policy();
    let q = RelevanceQuery::new("COA-AD-3", "air_defense", "THR-ART-1", "포병 공격")
        .keywords(kw(&["radar"]), kw(&["artillery"]));
    let out = p.evaluate(&q);
    assert_eq!(out.tier, RelevanceTier::CriticalPair);
    assert!((out.score - 0.85).abs() < 1e-6, "got {:?}", out);
    assert!(out.reasons.iter().any(|r| r == "tier:critical_pair"));
}

#[test]
fn same_coa_other_threat_falls_back_to_type_level() {
    let p = policy();
    let q = RelevanceQuery::new("COA-AD-3", "AIR_DEFENSE", "THR-AIR-9", "공중 공격");
    let out = p.evaluate(&q);
    assert_eq!(out.tier, RelevanceTier::TypeLevel);
    assert_eq!(out.threat_type_code, "TT-AIR");
    assert!((out.score - 0.6).abs() < 1e-6);
    assert!(out
        .reasons
        .iter()
        .any(|r| r == "threat_type:공중 공격->TT-AIR"));
}

#[test]
fn keyword_refinement_stays_within_ten_percent() {
    let p = policy();
    let coa = kw(&["artillery", "radar", "counter battery"]);
    let threat = kw(&["artillery", "rocket"]);
    let out = p.evaluate(
        &RelevanceQuery::new("COA-CF-1", "counter_fire", "THR-1", "TT-ART").keywords(coa, threat),
    );
    // J = 1/4 → 0.9 * (0.9 + 0.05) = 0.855
    assert!((out.score - 0.855).abs() < 1e-5, "got {:?}", out);
    assert_eq!(out.base_relevance, Some(0.9));
    assert!(out.score >= 0.9 * 0.9 - 1e-6 && out.score <= 0.9 * 1.1 + 1e-6);
}

#[test]
fn keyword_only_when_no_type_row() {
    let p = policy();
    let out = p.evaluate(
        &RelevanceQuery::new("COA-X", "deception", "THR-X", "전자전")
            .keywords(KeywordSet::from_text("전파 교란 기만"), KeywordSet::from_text("전파 교란")),
    );
    assert_eq!(out.tier, RelevanceTier::KeywordOnly);
    assert!((out.score - 2.0 / 3.0).abs() < 1e-5);
}

#[test]
fn neutral_default_when_nothing_applies() {
    let p = policy();
    let out = p.evaluate(&RelevanceQuery::new("COA-X", "deception", "THR-X", "전자전"));
    assert_eq!(out.tier, RelevanceTier::Default);
    assert_eq!(out.score, 0.5);

    // one-sided keywords are not usable either
    let out = p.evaluate(
        &RelevanceQuery::new("COA-X", "deception", "THR-X", "전자전").keywords(kw(&["a"]), KeywordSet::new()),
    );
    assert_eq!(out.tier, RelevanceTier::Default);
}

#[test]
fn empty_threat_type_normalizes_to_empty() {
    let p = policy();
    assert_eq!(p.normalize_threat_type(""), "");
    assert_eq!(p.score_pair("", "", "", ""), 0.5);
}

#[test]
fn outcome_serializes_for_explanations() {
    let p = policy();
    let out = p.evaluate(&RelevanceQuery::new("COA-CF-1", "counter_fire", "THR-1", "포병 공격"));
    let v = serde_json::to_value(&out).expect("serialize");
    assert_eq!(v["tier"], "type_level");
    assert_eq!(v["threat_type_code"], "TT-ART");
    assert!(v.get("keyword_similarity").is_none());
}
