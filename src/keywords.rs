//! Keyword sets and Jaccard similarity for the keyword tiers of the relevance policy.

use crate::normalize::fold_label;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

// \w covers letters/digits/_ ; (?u) keeps Hangul and other scripts intact
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w+\b").expect("word regex"));

/// Folded set of non-empty keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split free text into word tokens and collect them.
    pub fn from_text(text: &str) -> Self {
        WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
    }

    pub fn insert(&mut self, word: &str) -> bool {
        let w = fold_label(word);
        if w.is_empty() {
            return false;
        }
        self.0.insert(w)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&fold_label(word))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// `|A ∩ B| / |A ∪ B|`; two empty sets score 0.0.
    pub fn jaccard(&self, other: &KeywordSet) -> f32 {
        let inter = self.0.intersection(&other.0).count();
        let union = self.0.len() + other.0.len() - inter;
        if union == 0 {
            return 0.0;
        }
        inter as f32 / union as f32
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for s in iter {
            set.insert(s.as_ref());
        }
        set
    }
}
