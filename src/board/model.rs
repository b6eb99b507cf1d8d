//! Board data model
//!
//! A board is an ordered list of cells, each a word plus an optional
//! pictogram. Cell order is display order and is kept end to end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reference to a pictogram in the remote library.
///
/// Only the service id is stored; display URLs are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PictogramRef {
    id: String,
}

impl PictogramRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display URL of the form `<base>/{id}`
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.id)
    }
}

impl fmt::Display for PictogramRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// How a cell obtained its pictogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PictoSource {
    /// The word itself matched
    Direct,
    /// One token of a multi-word phrase matched
    Phrase,
    /// A semantic alias of the word matched
    Alias,
    /// Universal fallback pictogram
    Fallback,
    /// Chosen by the clinician
    Manual,
    /// No pictogram (resolution failed or cleared)
    #[default]
    Missing,
}

impl fmt::Display for PictoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PictoSource::Direct => "direct",
            PictoSource::Phrase => "phrase",
            PictoSource::Alias => "alias",
            PictoSource::Fallback => "fallback",
            PictoSource::Manual => "manual",
            PictoSource::Missing => "missing",
        };
        f.write_str(s)
    }
}

/// One cell of a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItem {
    /// Word as typed (not normalized), used for the caption
    pub word: String,

    /// Pictogram, absent when resolution failed
    pub picto: Option<PictogramRef>,

    #[serde(default)]
    pub source: PictoSource,
}

impl BoardItem {
    pub fn resolved(word: impl Into<String>, picto: PictogramRef, source: PictoSource) -> Self {
        Self {
            word: word.into(),
            picto: Some(picto),
            source,
        }
    }

    pub fn unresolved(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            picto: None,
            source: PictoSource::Missing,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell {index} does not exist (board has {len} cells)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An assembled board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub created_at: DateTime<Utc>,

    /// Phrase the board was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrase: Option<String>,

    pub items: Vec<BoardItem>,
}

impl Board {
    pub fn new(phrase: Option<String>, items: Vec<BoardItem>) -> Self {
        Self {
            created_at: Utc::now(),
            phrase,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a cell by its 1-based position
    pub fn cell(&self, position: usize) -> Result<&BoardItem, BoardError> {
        position
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .ok_or(BoardError::IndexOutOfRange {
                index: position,
                len: self.items.len(),
            })
    }

    /// Overwrite the pictogram of a cell (1-based position).
    ///
    /// `None` clears the picture so the cell renders as text only.
    pub fn set_picto(
        &mut self,
        position: usize,
        picto: Option<PictogramRef>,
    ) -> Result<(), BoardError> {
        let len = self.items.len();
        let item = position
            .checked_sub(1)
            .and_then(|i| self.items.get_mut(i))
            .ok_or(BoardError::IndexOutOfRange {
                index: position,
                len,
            })?;

        item.source = if picto.is_some() {
            PictoSource::Manual
        } else {
            PictoSource::Missing
        };
        item.picto = picto;
        Ok(())
    }

    /// Count of cells without a pictogram
    pub fn missing_count(&self) -> usize {
        self.items.iter().filter(|i| i.picto.is_none()).count()
    }
}

/// A board that has been generated for a patient but not saved yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub patient: String,
    pub board: Board,
}
