//! Priority-weighted resource availability score.
//!
//! score = Σ weight(matched & usable) / Σ weight(required), rounded to 3 decimals.
//! Fixed outcomes:
//! - nothing required        → 1.0
//! - no allocation data      → 0.2
//! - any `required` missing  → capped at 0.3

use super::parser::{parse_requirements, Priority, RequiredResource};
use super::records::{AssetMaster, AvailableResourceAllocation};
use super::resolver::{IndexEntry, MatchPolicy, ResourceNameIndex, STATUS_AVAILABLE};
use crate::normalize::{clamp01, round3};
use crate::telemetry::{dev_logging_enabled, truncate_vec};
use serde::Serialize;
use tracing::{debug, info};

pub const NO_REQUIREMENTS_SCORE: f32 = 1.0;
pub const NO_AVAILABILITY_SCORE: f32 = 0.2;
pub const CRITICAL_SHORTAGE_CAP: f32 = 0.3;
/// Only reachable if every requirement carried zero weight.
pub const ZERO_WEIGHT_SCORE: f32 = 0.5;

pub const MSG_NO_RESOURCES_NEEDED: &str = "no resources needed";
pub const ERR_NO_AVAILABILITY_DATA: &str = "no availability data";
pub const REASON_NOT_FOUND: &str = "not found in allocation plan";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    pub required: usize,
    pub recommended: usize,
    pub optional: usize,
}

impl PriorityBreakdown {
    fn count(required: &[RequiredResource]) -> Self {
        let mut b = Self::default();
        for r in required {
            match r.priority {
                Priority::Required => b.required += 1,
                Priority::Recommended => b.recommended += 1,
                Priority::Optional => b.optional += 1,
            }
        }
        b
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedResource {
    pub resource: String,
    pub priority: Priority,
    pub weight: f32,
    pub matched_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub quantity: i64,
    pub quantity_source: &'static str,
    pub status: String,
    pub status_source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tactical_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingResource {
    pub resource: String,
    pub priority: Priority,
    pub weight: f32,
    pub reason: String,
    /// Set when an allocation matched by name but was unusable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Explanation accompanying an availability score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreDetail {
    pub total_required: usize,
    pub matched: Vec<MatchedResource>,
    pub missing: Vec<MissingResource>,
    pub priority_breakdown: PriorityBreakdown,
    /// True when a `required` resource is missing and the cap applied.
    pub critical_shortage: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceAvailabilityScorer {
    policy: MatchPolicy,
}

impl ResourceAvailabilityScorer {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Parse `spec` and score it in one step.
    pub fn score_spec(
        &self,
        spec: Option<&str>,
        available: &[AvailableResourceAllocation],
        asset_master: Option<&AssetMaster>,
    ) -> (f32, ScoreDetail) {
        self.score(&parse_requirements(spec), available, asset_master)
    }

    pub fn score(
        &self,
        required: &[RequiredResource],
        available: &[AvailableResourceAllocation],
        asset_master: Option<&AssetMaster>,
    ) -> (f32, ScoreDetail) {
        if required.is_empty() {
            return (
                NO_REQUIREMENTS_SCORE,
                ScoreDetail {
                    message: Some(MSG_NO_RESOURCES_NEEDED.into()),
                    ..Default::default()
                },
            );
        }

        let mut detail = ScoreDetail {
            total_required: required.len(),
            priority_breakdown: PriorityBreakdown::count(required),
            ..Default::default()
        };

        if available.is_empty() {
            debug!(target: "resources", total_required = required.len(), "no allocation data");
            detail.error = Some(ERR_NO_AVAILABILITY_DATA.into());
            return (NO_AVAILABILITY_SCORE, detail);
        }

        let index = ResourceNameIndex::build(available, asset_master, self.policy);

        let mut total_weight = 0.0f32;
        let mut matched_weight = 0.0f32;

        for req in required {
            total_weight += req.weight;

            let Some(entry) = index.find(&req.resource) else {
                detail.missing.push(MissingResource {
                    resource: req.resource.clone(),
                    priority: req.priority,
                    weight: req.weight,
                    reason: REASON_NOT_FOUND.into(),
                    matched_name: None,
                    quantity: None,
                    status: None,
                });
                continue;
            };

            match assess(req, entry) {
                Ok(m) => {
                    matched_weight += req.weight;
                    detail.matched.push(m);
                }
                Err(miss) => detail.missing.push(miss),
            }
        }

        let mut score = if total_weight > 0.0 {
            matched_weight / total_weight
        } else {
            ZERO_WEIGHT_SCORE
        };

        if detail.missing.iter().any(|m| m.priority == Priority::Required) {
            detail.critical_shortage = true;
            score = score.min(CRITICAL_SHORTAGE_CAP);
        }

        let score = round3(clamp01(score));

        if dev_logging_enabled() {
            let missing: Vec<&str> = detail.missing.iter().map(|m| m.resource.as_str()).collect();
            info!(
                target: "resources",
                score,
                matched = detail.matched.len(),
                missing = ?truncate_vec(&missing, 5),
                critical_shortage = detail.critical_shortage,
                "availability scored"
            );
        }

        (score, detail)
    }
}

/// Decide whether a name-matched allocation is usable.
fn assess(req: &RequiredResource, entry: &IndexEntry<'_>) -> Result<MatchedResource, MissingResource> {
    let quantity = entry.quantity();
    let status = entry.status();

    let status_ok = status.value == STATUS_AVAILABLE;
    let quantity_ok = quantity.value > 0;

    if status_ok && quantity_ok {
        return Ok(MatchedResource {
            resource: req.resource.clone(),
            priority: req.priority,
            weight: req.weight,
            matched_name: entry.display_name.clone(),
            asset_id: entry.asset_id(),
            quantity: quantity.value,
            quantity_source: quantity.source,
            status: status.value,
            status_source: status.source,
            tactical_role: entry.tactical_role(),
        });
    }

    let reason = match (status_ok, quantity_ok) {
        (false, false) => format!("status: {}, quantity: {}", status.value, quantity.value),
        (false, true) => format!("status: {}", status.value),
        _ => format!("quantity: {}", quantity.value),
    };

    Err(MissingResource {
        resource: req.resource.clone(),
        priority: req.priority,
        weight: req.weight,
        reason,
        matched_name: Some(entry.display_name.clone()),
        quantity: Some(quantity.value),
        status: Some(status.value),
    })
}
