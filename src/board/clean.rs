//! Word cleaning policy
//!
//! Runs between segmentation and assembly. The resolver never depends on it.

use std::collections::HashSet;

use crate::core::normalize::{is_stop_token, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanPolicy {
    /// Drop blank tokens
    pub drop_empty: bool,
    /// Keep only the first occurrence of each word (compared normalized)
    pub dedupe: bool,
    /// Drop grammatical stop tokens ("de", "a", "o", ...)
    pub drop_stopwords: bool,
}

impl Default for CleanPolicy {
    fn default() -> Self {
        Self {
            drop_empty: true,
            dedupe: false,
            drop_stopwords: false,
        }
    }
}

impl CleanPolicy {
    /// Apply the policy; surviving words keep their order and spelling
    pub fn apply(&self, words: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !(self.drop_empty && w.is_empty()))
            .filter(|w| !(self.drop_stopwords && is_stop_token(w)))
            .filter(|w| !self.dedupe || seen.insert(normalize(w)))
            .collect()
    }
}
