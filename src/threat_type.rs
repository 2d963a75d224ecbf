//! Threat-type normalization against the threat-type master table.
//!
//! Both `name → code` and `code → code` are registered, so feeding an already
//! normalized code back in is a no-op. Lookups use [`fold_label`], which makes them
//! insensitive to case and surrounding/inner whitespace runs.

use crate::normalize::fold_label;
use crate::tables::ThreatTypeMasterEntry;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ThreatTypeNormalizer {
    /// folded name or code → canonical code
    map: HashMap<String, String>,
}

impl ThreatTypeNormalizer {
    pub fn new(entries: &[ThreatTypeMasterEntry]) -> Self {
        let mut map = HashMap::with_capacity(entries.len() * 2);

        // Codes first so that a name can never shadow a registered code.
        for e in entries {
            let code = e.code.trim();
            if code.is_empty() {
                continue;
            }
            map.insert(fold_label(code), code.to_string());
        }
        for e in entries {
            let code = e.code.trim();
            let name = fold_label(&e.name);
            if code.is_empty() || name.is_empty() {
                continue;
            }
            if let Some(prev) = map.get(&name) {
                if prev != code {
                    debug!(target: "relevance", %name, kept = %prev, dropped = %code, "duplicate threat-type key");
                }
                continue;
            }
            map.insert(name, code.to_string());
        }

        if map.is_empty() {
            warn!(target: "relevance", "threat-type master is empty; threat types pass through unnormalized");
        }

        Self { map }
    }

    /// Canonical code for `raw`, or `raw` trimmed when nothing matches.
    pub fn normalize(&self, raw: &str) -> String {
        self.lookup(raw).unwrap_or_else(|| raw.trim()).to_string()
    }

    /// Canonical code for `raw`, if registered.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        if self.map.is_empty() {
            return None;
        }
        let key = fold_label(raw);
        if key.is_empty() {
            return None;
        }
        self.map.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}
