//! # Scoring Engine
//! Both scoring engines built from one set of tables. No I/O after construction;
//! share it freely across threads.

use crate::error::Loaded;
use crate::relevance::{RelevanceOutcome, RelevancePolicy, RelevanceQuery};
use crate::resources::{
    AssetMaster, AvailableResourceAllocation, MatchPolicy, ResourceAvailabilityScorer, ScoreDetail,
};
use crate::tables::ScoringTables;

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    relevance: RelevancePolicy,
    resources: ResourceAvailabilityScorer,
}

impl ScoringEngine {
    pub fn new(tables: &ScoringTables) -> Loaded<Self> {
        let policy = RelevancePolicy::new(tables);
        let resources =
            ResourceAvailabilityScorer::new(MatchPolicy::new(tables.matching.min_containment_chars));
        policy.map(|relevance| Self {
            relevance,
            resources,
        })
    }

    /// Load tables from env-resolved paths and build. Never fails; check `degraded`.
    pub fn from_env() -> Loaded<Self> {
        let tables = ScoringTables::from_env();
        let mut built = Self::new(&tables.value);
        let mut degraded = tables.degraded;
        degraded.append(&mut built.degraded);
        built.degraded = degraded;
        built
    }

    pub fn relevance(&self) -> &RelevancePolicy {
        &self.relevance
    }

    pub fn resources(&self) -> &ResourceAvailabilityScorer {
        &self.resources
    }

    pub fn score_relevance(&self, query: &RelevanceQuery) -> RelevanceOutcome {
        self.relevance.evaluate(query)
    }

    /// Parse a requirement string and score it against the allocation plan.
    pub fn score_resources(
        &self,
        spec: Option<&str>,
        available: &[AvailableResourceAllocation],
        asset_master: Option<&AssetMaster>,
    ) -> (f32, ScoreDetail) {
        self.resources.score_spec(spec, available, asset_master)
    }
}
