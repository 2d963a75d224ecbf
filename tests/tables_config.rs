// tests/tables_config.rs
use coa_scoring::tables::{
    load_optional_table, load_table_from, CriticalPairRow, ThreatTypeMasterEntry,
    ENV_CRITICAL_PAIRS_PATH, ENV_MIN_CONTAINMENT, ENV_TABLES_PATH,
};
use coa_scoring::{Degraded, RelevanceQuery, RelevanceTier, ScoringEngine, ScoringTables, TableError};
use std::{env, fs};

const TABLES_TOML: &str = r#"
[[threat_types]]
code = "TT-INF"
name = "침투"

[[type_relevance]]
coa_type = "defense"
threat_type = "침투"
base_relevance = 0.8
"#;

fn clear_env() {
    env::remove_var(ENV_TABLES_PATH);
    env::remove_var(ENV_CRITICAL_PAIRS_PATH);
    env::remove_var(ENV_MIN_CONTAINMENT);
}

#[test]
fn single_tables_from_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("threat_types.toml");
    fs::write(
        &p_toml,
        r#"
[[threat_types]]
code = "TT-ART"
name = "포병 공격"
"#,
    )
    .unwrap();
    let rows: Vec<ThreatTypeMasterEntry> = load_table_from(&p_toml, "threat_types").unwrap();
    assert_eq!(rows[0].code, "TT-ART");

    // key absent in the document → empty table, not an error
    let rows: Vec<CriticalPairRow> = load_table_from(&p_toml, "critical_pairs").unwrap();
    assert!(rows.is_empty());

    let p_json = dir.path().join("critical.json");
    fs::write(
        &p_json,
        r#"[{"coa_id": "COA-1", "threat_id": "THR-1", "relevance_score": 0.9}]"#,
    )
    .unwrap();
    let rows: Vec<CriticalPairRow> = load_table_from(&p_json, "critical_pairs").unwrap();
    assert_eq!(rows.len(), 1);

    let p_csv = dir.path().join("critical.csv");
    fs::write(&p_csv, "coa_id,threat_id\n").unwrap();
    let err = load_table_from::<CriticalPairRow>(&p_csv, "critical_pairs").unwrap_err();
    assert!(matches!(err, TableError::UnsupportedFormat { .. }));
}

#[test]
fn whole_tables_file_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("tables.json");
    fs::write(
        &p,
        r#"{
            "matching": {"min_containment_chars": 3},
            "threat_types": [{"code": "TT-ART", "name": "포병 공격"}],
            "type_relevance": [
                {"coa_type": "counter_fire", "threat_type": "포병 공격", "base_relevance": 0.9}
            ]
        }"#,
    )
    .unwrap();

    let loaded = ScoringTables::load_from(&p);
    assert!(!loaded.is_degraded(), "{:?}", loaded.degraded);
    assert_eq!(loaded.value.threat_types.len(), 1);
    assert_eq!(loaded.value.type_relevance.len(), 1);
    assert!(loaded.value.critical_pairs.is_empty());
    assert_eq!(loaded.value.matching.min_containment_chars, 3);

    let engine = ScoringEngine::new(&loaded.value).into_value();
    let out = engine.score_relevance(&RelevanceQuery::new("COA-1", "counter_fire", "THR-1", "포병 공격"));
    assert_eq!(out.tier, RelevanceTier::TypeLevel);
    assert!((out.score - 0.9).abs() < 1e-6);

    // json with the wrong shape is malformed, unknown extensions are rejected
    fs::write(&p, "[1, 2]").unwrap();
    let err = ScoringTables::from_path(&p).unwrap_err();
    assert!(matches!(err, TableError::Json { .. }));

    let p_yaml = dir.path().join("tables.yaml");
    fs::write(&p_yaml, "threat_types: []\n").unwrap();
    let loaded = ScoringTables::load_from(&p_yaml);
    assert!(matches!(loaded.degraded[0], Degraded::MalformedSource { .. }));
}

#[test]
fn optional_table_absent_is_clean_malformed_is_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let missing = load_optional_table::<CriticalPairRow>(&dir.path().join("none.json"), "critical_pairs");
    assert!(missing.value.is_empty());
    assert!(!missing.is_degraded());

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{not json").unwrap();
    let loaded = load_optional_table::<CriticalPairRow>(&broken, "critical_pairs");
    assert!(loaded.value.is_empty());
    assert!(matches!(loaded.degraded[0], Degraded::MalformedSource { .. }));
}

#[serial_test::serial]
#[test]
fn from_env_resolves_paths_and_overrides() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk → empty tables, degraded but usable
    let loaded = ScoringEngine::from_env();
    assert!(loaded.is_degraded());
    assert!(matches!(loaded.degraded[0], Degraded::MissingSource { .. }));
    assert_eq!(loaded.value.relevance().score_pair("c", "defense", "t", "침투"), 0.5);

    // 2) Default path ./config/scoring_tables.toml
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/scoring_tables.toml"), TABLES_TOML).unwrap();
    let loaded = ScoringEngine::from_env();
    assert!(!loaded.is_degraded(), "{:?}", loaded.degraded);
    let out = loaded
        .value
        .score_relevance(&RelevanceQuery::new("COA-D", "defense", "THR-9", "침투"));
    assert_eq!(out.tier, RelevanceTier::TypeLevel);

    // 3) Env path + extra critical pairs + matching override
    let p_tables = tmp.path().join("custom.toml");
    fs::write(&p_tables, TABLES_TOML).unwrap();
    let p_pairs = tmp.path().join("pairs.json");
    fs::write(
        &p_pairs,
        r#"[{"coa_id": "COA-D", "threat_id": "THR-9", "relevance_score": 0.15}]"#,
    )
    .unwrap();
    env::set_var(ENV_TABLES_PATH, p_tables.display().to_string());
    env::set_var(ENV_CRITICAL_PAIRS_PATH, p_pairs.display().to_string());
    env::set_var(ENV_MIN_CONTAINMENT, "3");

    let tables = ScoringTables::from_env();
    assert_eq!(tables.value.critical_pairs.len(), 1);
    assert_eq!(tables.value.matching.min_containment_chars, 3);

    let engine = ScoringEngine::from_env().into_value();
    let out = engine.score_relevance(&RelevanceQuery::new("COA-D", "defense", "THR-9", "침투"));
    assert_eq!(out.tier, RelevanceTier::CriticalPair);
    assert!((out.score - 0.15).abs() < 1e-6);

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn malformed_tables_degrade_to_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("bad.toml");
    fs::write(&p, "[[type_relevance]]\ncoa_type = \"defense\"\n").unwrap();
    clear_env();
    env::set_var(ENV_TABLES_PATH, p.display().to_string());

    let loaded = ScoringTables::from_env();
    assert_eq!(loaded.value, ScoringTables::default());
    assert!(matches!(loaded.degraded[0], Degraded::MalformedSource { .. }));

    clear_env();
}
