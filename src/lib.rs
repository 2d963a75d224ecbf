// src/lib.rs
//! Scoring core for course-of-action (COA) recommendation.
//!
//! Two independent engines, composed by the caller:
//! - [`relevance::RelevancePolicy`]: how relevant a COA is to a threat
//!   (critical pair → type level + keywords → keywords only → neutral).
//! - [`resources::ResourceAvailabilityScorer`]: how well the allocation plan covers a
//!   COA's resource requirements, priority-weighted.
//!
//! [`engine::ScoringEngine`] bundles both, built from [`tables::ScoringTables`].

pub mod engine;
pub mod error;
pub mod keywords;
pub mod normalize;
pub mod relevance;
pub mod resources;
pub mod tables;
pub mod telemetry;
pub mod threat_type;

// ---- Re-exports for stable public API ----
pub use crate::engine::ScoringEngine;
pub use crate::error::{Degraded, Loaded, TableError};
pub use crate::keywords::KeywordSet;
pub use crate::relevance::{RelevanceOutcome, RelevancePolicy, RelevanceQuery, RelevanceTier};
pub use crate::resources::{
    parse_requirements, AssetMaster, AssetMasterRecord, AvailableResourceAllocation, Priority,
    RequiredResource, ResourceAvailabilityScorer, ScoreDetail,
};
pub use crate::tables::ScoringTables;
pub use crate::threat_type::ThreatTypeNormalizer;
