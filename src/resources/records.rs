//! Allocation-plan and asset-master records as supplied by the caller.
//!
//! Any subset of allocation fields may be present. Quantities deserialize leniently:
//! integers, whole floats and numeric strings are accepted; anything else (e.g.
//! `"nan"`, `"-"`) becomes `None` and falls through the quantity waterfall.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableResourceAllocation {
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub resource_alias: Option<String>,
    #[serde(default)]
    pub tactical_role: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub allocated_quantity: Option<i64>,
    /// Status recorded when the plan was made.
    #[serde(default)]
    pub plan_status: Option<String>,

    // legacy allocation columns
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default, alias = "quantity", deserialize_with = "lenient_quantity")]
    pub legacy_quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub available_quantity: Option<i64>,
    #[serde(default, alias = "status")]
    pub legacy_status: Option<String>,
}

impl AvailableResourceAllocation {
    /// Shorthand for a legacy-style row: name, quantity, status.
    pub fn legacy(name: &str, quantity: i64, status: &str) -> Self {
        Self {
            resource_alias: Some(name.to_string()),
            legacy_quantity: Some(quantity),
            legacy_status: Some(status.to_string()),
            ..Default::default()
        }
    }

    /// Shorthand for a master-linked row.
    pub fn planned(asset_id: &str, tactical_role: &str, quantity: i64, plan_status: &str) -> Self {
        Self {
            asset_id: Some(asset_id.to_string()),
            tactical_role: Some(tactical_role.to_string()),
            allocated_quantity: Some(quantity),
            plan_status: Some(plan_status.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMasterRecord {
    pub asset_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: Option<i64>,
    /// Live status, as opposed to the allocation's plan-time snapshot.
    #[serde(default)]
    pub availability_status: Option<String>,
}

/// Asset master keyed by `asset_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetMaster(HashMap<String, AssetMasterRecord>);

impl AssetMaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: AssetMasterRecord) {
        let id = record.asset_id.trim().to_string();
        if id.is_empty() {
            return;
        }
        self.0.insert(id, record);
    }

    pub fn get(&self, asset_id: &str) -> Option<&AssetMasterRecord> {
        self.0.get(asset_id.trim())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AssetMasterRecord> for AssetMaster {
    fn from_iter<I: IntoIterator<Item = AssetMasterRecord>>(iter: I) -> Self {
        let mut m = AssetMaster::new();
        for r in iter {
            m.insert(r);
        }
        m
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawQuantity> = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => serde_json::from_value(v).ok(),
    };
    Ok(raw.and_then(|q| match q {
        RawQuantity::Int(n) => Some(n),
        RawQuantity::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        RawQuantity::Float(_) => None,
        RawQuantity::Text(s) => parse_quantity_text(&s),
    }))
}

fn parse_quantity_text(s: &str) -> Option<i64> {
    let t = s.trim().replace(',', "");
    if let Ok(n) = t.parse::<i64>() {
        return Some(n);
    }
    t.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}
