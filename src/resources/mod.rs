// src/resources/mod.rs
//! Resource availability: requirement parsing, name resolution, weighted scoring.

pub mod availability;
pub mod parser;
pub mod records;
pub mod resolver;

pub use availability::{
    MatchedResource, MissingResource, PriorityBreakdown, ResourceAvailabilityScorer, ScoreDetail,
};
pub use parser::{parse_requirements, Priority, RequiredResource};
pub use records::{AssetMaster, AssetMasterRecord, AvailableResourceAllocation};
pub use resolver::{is_match, normalize_status, MatchPolicy, ResourceNameIndex};
