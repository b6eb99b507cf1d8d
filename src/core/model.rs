//! Unified Result Model
//!
//! Every command maps its output to this model before rendering, so all
//! commands share the jsonl/json/md/raw formats.

use serde::{Deserialize, Serialize};

use crate::board::model::{BoardItem, PictoSource, PictogramRef};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Patient,
    Board,
    Cell,
    Export,
    Check,
    Error,
}

/// Error information for a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AacError {
    pub code: String,
    pub message: String,
}

impl AacError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// The kind of this result
    pub kind: Kind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,

    /// 1-based board number in the patient's history (absent for drafts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<usize>,

    /// 1-based cell position within a board
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub picto_id: Option<String>,

    /// Display URL of the pictogram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PictoSource>,

    /// Human-readable summary line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Errors (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<AacError>,
}

impl ResultItem {
    fn empty(kind: Kind) -> Self {
        Self {
            kind,
            patient: None,
            board: None,
            index: None,
            word: None,
            picto_id: None,
            url: None,
            source: None,
            excerpt: None,
            data: None,
            errors: Vec::new(),
        }
    }

    /// Create a patient result
    pub fn patient(name: impl Into<String>) -> Self {
        Self {
            patient: Some(name.into()),
            ..Self::empty(Kind::Patient)
        }
    }

    /// Create a board header result; `number` is `None` for a draft
    pub fn board(patient: impl Into<String>, number: Option<usize>) -> Self {
        Self {
            patient: Some(patient.into()),
            board: number,
            ..Self::empty(Kind::Board)
        }
    }

    /// Create a cell result for the 1-based `index`
    pub fn cell(index: usize, item: &BoardItem, api_base: &str) -> Self {
        Self {
            index: Some(index),
            word: Some(item.word.clone()),
            picto_id: item.picto.as_ref().map(|p| p.id().to_string()),
            url: item.picto.as_ref().map(|p| p.url(api_base)),
            source: Some(item.source),
            ..Self::empty(Kind::Cell)
        }
    }

    /// Create an alternative-pictogram result; `rank` is 1-based
    pub fn candidate(rank: usize, word: &str, picto: &PictogramRef, api_base: &str) -> Self {
        Self {
            index: Some(rank),
            word: Some(word.to_string()),
            picto_id: Some(picto.id().to_string()),
            url: Some(picto.url(api_base)),
            ..Self::empty(Kind::Cell)
        }
    }

    /// Create an export result
    pub fn export(patient: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            patient: Some(patient.into()),
            excerpt: Some(path.into()),
            ..Self::empty(Kind::Export)
        }
    }

    /// Create a check result (doctor)
    pub fn check(message: impl Into<String>) -> Self {
        Self {
            excerpt: Some(message.into()),
            ..Self::empty(Kind::Check)
        }
    }

    /// Create a new error result
    pub fn error(error: AacError) -> Self {
        Self {
            errors: vec![error],
            ..Self::empty(Kind::Error)
        }
    }

    /// Set the patient
    pub fn with_patient(mut self, patient: impl Into<String>) -> Self {
        self.patient = Some(patient.into());
        self
    }

    /// Set the board number
    pub fn with_board(mut self, number: Option<usize>) -> Self {
        self.board = number;
        self
    }

    /// Set the summary line
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    /// Set structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add an error
    pub fn with_error(mut self, error: AacError) -> Self {
        self.errors.push(error);
        self
    }
}

/// Result set containing multiple result items, in emission order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_item_patient() {
        let item = ResultItem::patient("Maria");
        assert_eq!(item.kind, Kind::Patient);
        assert_eq!(item.patient, Some("Maria".to_string()));
    }

    #[test]
    fn test_result_item_cell() {
        let cell = BoardItem::resolved("bola", PictogramRef::new("10"), PictoSource::Alias);
        let item = ResultItem::cell(3, &cell, "https://example.org/p");
        assert_eq!(item.kind, Kind::Cell);
        assert_eq!(item.index, Some(3));
        assert_eq!(item.picto_id.as_deref(), Some("10"));
        assert_eq!(item.url.as_deref(), Some("https://example.org/p/10"));
        assert_eq!(item.source, Some(PictoSource::Alias));
    }

    #[test]
    fn test_result_item_cell_missing_picto() {
        let item = ResultItem::cell(1, &BoardItem::unresolved("xklqz"), "https://example.org/p");
        assert!(item.picto_id.is_none());
        assert!(item.url.is_none());
        assert_eq!(item.source, Some(PictoSource::Missing));
    }

    #[test]
    fn test_result_item_candidate_has_no_source() {
        let item = ResultItem::candidate(2, "bola", &PictogramRef::new("77"), "https://example.org/p");
        assert_eq!(item.index, Some(2));
        assert_eq!(item.url.as_deref(), Some("https://example.org/p/77"));
        assert!(item.source.is_none());
    }

    #[test]
    fn test_result_item_error() {
        let item = ResultItem::error(AacError::new("ERR001", "Something went wrong"));
        assert_eq!(item.kind, Kind::Error);
        assert_eq!(item.errors.len(), 1);
        assert_eq!(item.errors[0].code, "ERR001");
        assert_eq!(item.errors[0].message, "Something went wrong");
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let item = ResultItem::patient("Ana");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"kind":"patient","patient":"Ana"}"#);
    }

    #[test]
    fn test_result_set_keeps_order() {
        let set: ResultSet = vec![ResultItem::patient("b"), ResultItem::patient("a")]
            .into_iter()
            .collect();
        let names: Vec<_> = set.into_iter().filter_map(|i| i.patient).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_builders() {
        let item = ResultItem::board("Ana", None)
            .with_board(Some(2))
            .with_excerpt("3 cells")
            .with_data(serde_json::json!({"cells": 3}))
            .with_error(AacError::new("X", "y"));
        assert_eq!(item.board, Some(2));
        assert_eq!(item.excerpt.as_deref(), Some("3 cells"));
        assert_eq!(item.data.unwrap()["cells"], 3);
        assert_eq!(item.errors.len(), 1);
    }
}
