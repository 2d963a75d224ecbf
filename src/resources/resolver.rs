//! Name resolution between required resources and allocation records.
//!
//! Every allocation is indexed under all names it could be asked for:
//! the joined asset-master name, its tactical role (unless `"unspecified"`), and the
//! legacy alias columns. Field fallbacks are expressed as ordered accessor lists
//! ([`QUANTITY_WATERFALL`], [`STATUS_WATERFALL`]) resolved by [`first_present`].

use super::records::{AssetMaster, AssetMasterRecord, AvailableResourceAllocation};
use crate::normalize::{fold_label, normalize_resource_name};
use crate::tables::DEFAULT_MIN_CONTAINMENT_CHARS;

/// Placeholder tactical role that must not be used as a name.
pub const UNSPECIFIED_ROLE: &str = "unspecified";

/// Canonical status meaning "usable".
pub const STATUS_AVAILABLE: &str = "available";

/// Quantity used when no source provides one.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Which names may match each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Shortest key (in chars) allowed to match by containment. Equal keys always match.
    pub min_containment_chars: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            min_containment_chars: DEFAULT_MIN_CONTAINMENT_CHARS,
        }
    }
}

impl MatchPolicy {
    pub fn new(min_containment_chars: usize) -> Self {
        Self {
            min_containment_chars: min_containment_chars.max(1),
        }
    }

    /// Names match when equal, or when one contains the other.
    /// Both arguments must already be normalized.
    pub fn is_match(&self, required: &str, available: &str) -> bool {
        if required.is_empty() || available.is_empty() {
            return false;
        }
        if required == available {
            return true;
        }
        let (short, long) = if required.chars().count() <= available.chars().count() {
            (required, available)
        } else {
            (available, required)
        };
        short.chars().count() >= self.min_containment_chars && long.contains(short)
    }
}

/// Bidirectional containment check with the default policy; normalizes both sides.
pub fn is_match(required: &str, available: &str) -> bool {
    MatchPolicy::default().is_match(
        &normalize_resource_name(required),
        &normalize_resource_name(available),
    )
}

/// Fold status vocabulary: the "usable" synonyms become [`STATUS_AVAILABLE`],
/// anything else is returned trimmed.
pub fn normalize_status(raw: &str) -> String {
    match fold_label(raw).as_str() {
        "available" | "사용가능" | "사용 가능" | "가용" | "가능" | "ready" | "operational" => {
            STATUS_AVAILABLE.to_string()
        }
        _ => raw.trim().to_string(),
    }
}

/// One allocation joined with its master record.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub allocation: &'a AvailableResourceAllocation,
    pub master: Option<&'a AssetMasterRecord>,
}

pub type Accessor<T> = for<'a> fn(&Candidate<'a>) -> Option<T>;

fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn allocated_quantity(c: &Candidate<'_>) -> Option<i64> {
    c.allocation.allocated_quantity
}

fn legacy_quantity(c: &Candidate<'_>) -> Option<i64> {
    c.allocation.legacy_quantity
}

fn legacy_available_quantity(c: &Candidate<'_>) -> Option<i64> {
    c.allocation.available_quantity
}

// a joined master without a quantity still counts as one unit
fn master_quantity(c: &Candidate<'_>) -> Option<i64> {
    c.master.map(|m| m.quantity.unwrap_or(DEFAULT_QUANTITY))
}

fn plan_status(c: &Candidate<'_>) -> Option<String> {
    non_blank(&c.allocation.plan_status)
}

fn legacy_status(c: &Candidate<'_>) -> Option<String> {
    non_blank(&c.allocation.legacy_status)
}

fn master_status(c: &Candidate<'_>) -> Option<String> {
    c.master.and_then(|m| non_blank(&m.availability_status))
}

fn master_name(c: &Candidate<'_>) -> Option<String> {
    c.master.and_then(|m| non_blank(&m.name))
}

fn tactical_role_name(c: &Candidate<'_>) -> Option<String> {
    non_blank(&c.allocation.tactical_role).filter(|r| !r.eq_ignore_ascii_case(UNSPECIFIED_ROLE))
}

fn alias_name(c: &Candidate<'_>) -> Option<String> {
    non_blank(&c.allocation.resource_alias)
}

fn legacy_resource_name(c: &Candidate<'_>) -> Option<String> {
    non_blank(&c.allocation.resource_name)
}

fn bare_resource_name(c: &Candidate<'_>) -> Option<String> {
    non_blank(&c.allocation.resource)
}

/// Resolution order for quantities.
pub const QUANTITY_WATERFALL: &[(&str, Accessor<i64>)] = &[
    ("allocated_quantity", allocated_quantity),
    ("legacy_quantity", legacy_quantity),
    ("available_quantity", legacy_available_quantity),
    ("asset_master", master_quantity),
];

/// Resolution order for statuses. Plan-time fields come before the live master value.
pub const STATUS_WATERFALL: &[(&str, Accessor<String>)] = &[
    ("plan_status", plan_status),
    ("legacy_status", legacy_status),
    ("asset_master", master_status),
];

/// Candidate names in display-preference order.
const NAME_SOURCES: &[Accessor<String>] = &[
    master_name,
    tactical_role_name,
    alias_name,
    legacy_resource_name,
    bare_resource_name,
];

/// First accessor that yields a value, with the name of the step that produced it.
pub fn first_present<T>(
    steps: &[(&'static str, Accessor<T>)],
    candidate: &Candidate<'_>,
) -> Option<(T, &'static str)> {
    steps
        .iter()
        .find_map(|(name, get)| get(candidate).map(|v| (v, *name)))
}

/// A resolved allocation field and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: &'static str,
}

#[derive(Debug, Clone)]
pub struct IndexEntry<'a> {
    pub candidate: Candidate<'a>,
    pub display_name: String,
    /// Normalized, deduplicated lookup keys.
    pub keys: Vec<String>,
}

impl<'a> IndexEntry<'a> {
    pub fn quantity(&self) -> Resolved<i64> {
        match first_present(QUANTITY_WATERFALL, &self.candidate) {
            Some((value, source)) => Resolved { value, source },
            None => Resolved {
                value: DEFAULT_QUANTITY,
                source: "default",
            },
        }
    }

    pub fn status(&self) -> Resolved<String> {
        match first_present(STATUS_WATERFALL, &self.candidate) {
            Some((raw, source)) => Resolved {
                value: normalize_status(&raw),
                source,
            },
            None => Resolved {
                value: STATUS_AVAILABLE.to_string(),
                source: "default",
            },
        }
    }

    pub fn tactical_role(&self) -> Option<String> {
        non_blank(&self.candidate.allocation.tactical_role)
    }

    pub fn asset_id(&self) -> Option<String> {
        non_blank(&self.candidate.allocation.asset_id)
    }
}

/// Lookup over one allocation plan.
#[derive(Debug, Clone)]
pub struct ResourceNameIndex<'a> {
    entries: Vec<IndexEntry<'a>>,
    policy: MatchPolicy,
}

impl<'a> ResourceNameIndex<'a> {
    pub fn build(
        available: &'a [AvailableResourceAllocation],
        master: Option<&'a AssetMaster>,
        policy: MatchPolicy,
    ) -> Self {
        let entries = available
            .iter()
            .filter_map(|allocation| {
                let master = master.and_then(|m| {
                    allocation
                        .asset_id
                        .as_deref()
                        .and_then(|id| m.get(id))
                });
                let candidate = Candidate { allocation, master };

                let names: Vec<String> = NAME_SOURCES.iter().filter_map(|get| get(&candidate)).collect();
                let display_name = names.first()?.clone();

                let mut keys: Vec<String> = Vec::with_capacity(names.len());
                for n in &names {
                    let k = normalize_resource_name(n);
                    if !k.is_empty() && !keys.contains(&k) {
                        keys.push(k);
                    }
                }
                if keys.is_empty() {
                    return None;
                }

                Some(IndexEntry {
                    candidate,
                    display_name,
                    keys,
                })
            })
            .collect();

        Self { entries, policy }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry<'a>] {
        &self.entries
    }

    /// Find the allocation for a required name. An exact key anywhere in the plan
    /// beats a containment hit; otherwise the first containment hit in plan order wins.
    pub fn find(&self, required: &str) -> Option<&IndexEntry<'a>> {
        let key = normalize_resource_name(required);
        if key.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.keys.iter().any(|k| *k == key))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.keys.iter().any(|k| self.policy.is_match(&key, k)))
            })
    }
}
