//! Preview scores from the command line; prints JSON.
//!
//!   coa-score-preview relevance <coa_id> <coa_type> <threat_id> <threat_type> [coa_kw,..] [threat_kw,..]
//!   coa-score-preview resources "<requirements>" <allocations.json> [asset_master.json]

use anyhow::{bail, Context, Result};
use coa_scoring::{
    AssetMaster, AssetMasterRecord, AvailableResourceAllocation, KeywordSet, RelevanceQuery,
    ScoringEngine,
};
use serde_json::json;
use std::fs;
use tracing::warn;

fn keyword_arg(arg: Option<&String>) -> KeywordSet {
    arg.map(|s| s.split(',').collect())
        .unwrap_or_default()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {path}"))
}

fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    coa_scoring::telemetry::init_dev_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let loaded = ScoringEngine::from_env();
    for d in &loaded.degraded {
        warn!(degraded = ?d, "engine built in degraded mode");
    }
    let degraded = serde_json::to_value(&loaded.degraded)?;
    let engine = loaded.value;

    let out = match args.first().map(String::as_str) {
        Some("relevance") if args.len() >= 5 => {
            let query = RelevanceQuery::new(&args[1], &args[2], &args[3], &args[4])
                .keywords(keyword_arg(args.get(5)), keyword_arg(args.get(6)));
            json!({
                "relevance": engine.score_relevance(&query),
                "degraded": degraded,
            })
        }
        Some("resources") if args.len() >= 3 => {
            let available: Vec<AvailableResourceAllocation> = read_json(&args[2])?;
            let master: Option<AssetMaster> = match args.get(3) {
                Some(p) => Some(read_json::<Vec<AssetMasterRecord>>(p)?.into_iter().collect()),
                None => None,
            };
            let (score, detail) = engine.score_resources(Some(&args[1]), &available, master.as_ref());
            json!({
                "score": score,
                "detail": detail,
                "degraded": degraded,
            })
        }
        _ => bail!(
            "usage:\n  coa-score-preview relevance <coa_id> <coa_type> <threat_id> <threat_type> [coa_kw,..] [threat_kw,..]\n  coa-score-preview resources \"<requirements>\" <allocations.json> [asset_master.json]"
        ),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
