//! Lookup tables feeding the relevance engine, plus their loaders.
//!
//! TOML shape (one document holds every table; all sections are optional):
//!
//! ```toml
//! [matching]
//! min_containment_chars = 2
//!
//! [[threat_types]]
//! code = "TT-ART"
//! name = "포병 공격"
//!
//! [[type_relevance]]
//! coa_type = "counter_fire"
//! threat_type = "포병 공격"
//! base_relevance = 0.9
//!
//! [[critical_pairs]]
//! coa_id = "COA-001"
//! threat_id = "THR-001"
//! relevance_score = 0.95
//! ```
//!
//! Loading is fail-soft: a missing or malformed source yields empty tables plus
//! [`Degraded`] markers, and a `warn!` on the `tables` target.

use crate::error::{Degraded, Loaded, TableError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// --- env defaults & names ---
pub const DEFAULT_TABLES_PATH: &str = "config/scoring_tables.toml";
pub const DEFAULT_MIN_CONTAINMENT_CHARS: usize = 2;

pub const ENV_TABLES_PATH: &str = "COA_SCORING_TABLES_PATH";
pub const ENV_CRITICAL_PAIRS_PATH: &str = "COA_CRITICAL_PAIRS_PATH";
pub const ENV_MIN_CONTAINMENT: &str = "COA_SCORING_MIN_CONTAINMENT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatTypeMasterEntry {
    pub code: String,
    pub name: String,
}

/// Row of the doctrinal COA-type × threat-type matrix as it appears in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRelevanceRow {
    pub coa_type: String,
    /// Free-text name or code; normalized to a code when the policy is built.
    pub threat_type: String,
    pub base_relevance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPairRow {
    pub coa_id: String,
    pub threat_id: String,
    pub relevance_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingSection {
    #[serde(default = "default_min_containment_chars")]
    pub min_containment_chars: usize,
}

fn default_min_containment_chars() -> usize {
    DEFAULT_MIN_CONTAINMENT_CHARS
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self {
            min_containment_chars: DEFAULT_MIN_CONTAINMENT_CHARS,
        }
    }
}

/// Every table the scoring core reads, as plain rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringTables {
    #[serde(default)]
    pub matching: MatchingSection,
    #[serde(default)]
    pub threat_types: Vec<ThreatTypeMasterEntry>,
    #[serde(default)]
    pub type_relevance: Vec<TypeRelevanceRow>,
    #[serde(default)]
    pub critical_pairs: Vec<CriticalPairRow>,
}

impl ScoringTables {
    /// Strict parse from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, TableError> {
        toml::from_str(toml_str).map_err(|source| TableError::Toml {
            origin: "<inline>".into(),
            source,
        })
    }

    /// Strict load from a `.toml` or `.json` file, chosen by extension.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let content = read_source(path)?;
        let origin = path.display().to_string();
        match extension_of(path).as_str() {
            "json" => serde_json::from_str(&content).map_err(|source| TableError::Json { origin, source }),
            "toml" => toml::from_str(&content).map_err(|source| TableError::Toml { origin, source }),
            _ => Err(TableError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Fail-soft load: any failure yields empty tables and a degraded marker.
    pub fn load_from(path: &Path) -> Loaded<Self> {
        match Self::from_path(path) {
            Ok(tables) => {
                info!(
                    target: "tables",
                    path = %path.display(),
                    threat_types = tables.threat_types.len(),
                    type_relevance = tables.type_relevance.len(),
                    critical_pairs = tables.critical_pairs.len(),
                    "scoring tables loaded"
                );
                Loaded::clean(tables)
            }
            Err(e) => {
                warn!(target: "tables", error = %e, "scoring tables unavailable, using empty tables");
                Loaded {
                    value: Self::default(),
                    degraded: vec![Degraded::from_table_error(&e)],
                }
            }
        }
    }

    /// Resolve paths from env and load fail-soft.
    ///
    /// 1) `$COA_SCORING_TABLES_PATH` or `config/scoring_tables.toml`
    /// 2) `$COA_CRITICAL_PAIRS_PATH` (optional; appended to `critical_pairs`)
    /// 3) `$COA_SCORING_MIN_CONTAINMENT` overrides `[matching]`
    pub fn from_env() -> Loaded<Self> {
        let path = std::env::var(ENV_TABLES_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TABLES_PATH));
        let mut loaded = Self::load_from(&path);

        if let Ok(p) = std::env::var(ENV_CRITICAL_PAIRS_PATH) {
            let extra = load_optional_table::<CriticalPairRow>(Path::new(&p), "critical_pairs");
            loaded.value.critical_pairs.extend(extra.value);
            loaded.degraded.extend(extra.degraded);
        }

        if let Some(n) = parse_min_containment_env(std::env::var(ENV_MIN_CONTAINMENT).ok()) {
            loaded.value.matching.min_containment_chars = n;
        }

        loaded
    }
}

fn parse_min_containment_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .map(|n| n.max(1))
}

fn read_source(path: &Path) -> Result<String, TableError> {
    fs::read_to_string(path).map_err(|source| TableError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Load one table from `path`. JSON files hold a top-level array, TOML files
/// an array of tables under `key`; a TOML document without `key` is an empty table.
pub fn load_table_from<T: DeserializeOwned>(path: &Path, key: &str) -> Result<Vec<T>, TableError> {
    let content = read_source(path)?;
    let origin = path.display().to_string();

    match extension_of(path).as_str() {
        "json" => serde_json::from_str(&content).map_err(|source| TableError::Json { origin, source }),
        "toml" => {
            let mut doc: toml::Table = toml::from_str(&content).map_err(|source| TableError::Toml {
                origin: origin.clone(),
                source,
            })?;
            match doc.remove(key) {
                Some(v) => v
                    .try_into()
                    .map_err(|source| TableError::Toml { origin, source }),
                None => Ok(Vec::new()),
            }
        }
        _ => Err(TableError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Fail-soft variant of [`load_table_from`]; a missing file is logged at info, not warn.
pub fn load_optional_table<T: DeserializeOwned>(path: &Path, key: &str) -> Loaded<Vec<T>> {
    match load_table_from(path, key) {
        Ok(rows) => Loaded::clean(rows),
        Err(e) if e.is_missing_source() => {
            info!(target: "tables", path = %path.display(), table = key, "optional table not present");
            Loaded::clean(Vec::new())
        }
        Err(e) => {
            warn!(target: "tables", table = key, error = %e, "optional table unreadable, ignoring");
            Loaded {
                value: Vec::new(),
                degraded: vec![Degraded::from_table_error(&e)],
            }
        }
    }
}
