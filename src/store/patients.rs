//! Patient registry and board history
//!
//! The whole store is one pretty-printed JSON file. Every mutation reads
//! the file, applies the change and writes it back through a temp file
//! plus rename, so a failed write leaves the previous file intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::board::model::Board;
use crate::store::meta::StoreMeta;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("patient name must not be empty")]
    EmptyName,

    #[error("patient '{0}' is not registered")]
    UnknownPatient(String),

    #[error("store I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store file {path:?} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A registered patient and their saved boards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub created_at: DateTime<Utc>,

    /// Saved boards, oldest first
    #[serde(default)]
    pub boards: Vec<Board>,
}

/// On-disk layout of patients.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(flatten)]
    pub meta: StoreMeta,

    #[serde(default)]
    pub patients: BTreeMap<String, Patient>,
}

/// Name and board count of a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientSummary {
    pub name: String,
    pub boards: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// False when the patient already existed
    pub created: bool,
}

/// Patient store backed by a JSON file
pub struct PatientStore {
    path: PathBuf,
}

/// Trim a patient name; blank names are rejected
pub fn clean_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(name.to_string())
}

impl PatientStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store. A missing file is an empty store.
    pub fn load(&self) -> Result<StoreFile, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(StoreFile::default());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the store atomically (temp file in the same directory, then rename)
    pub fn save(&self, store: &mut StoreFile) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        store.meta.touch();
        let json = serde_json::to_string_pretty(store).map_err(|e| io_err(e.into()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        tracing::debug!(path = ?self.path, patients = store.patients.len(), "store saved");
        Ok(())
    }

    /// Register a patient. Registering an existing name is a no-op.
    pub fn register(&self, name: &str) -> Result<Registration, StoreError> {
        let name = clean_name(name)?;
        let mut store = self.load()?;

        if store.patients.contains_key(&name) {
            tracing::debug!(patient = %name, "patient already registered");
            return Ok(Registration { created: false });
        }

        store.patients.insert(
            name.clone(),
            Patient {
                created_at: Utc::now(),
                boards: Vec::new(),
            },
        );
        self.save(&mut store)?;
        tracing::info!(patient = %name, "patient registered");
        Ok(Registration { created: true })
    }

    /// Append a board to a patient's history; returns its 1-based number
    pub fn append(&self, name: &str, board: Board) -> Result<usize, StoreError> {
        let name = clean_name(name)?;
        let mut store = self.load()?;

        let patient = store
            .patients
            .get_mut(&name)
            .ok_or_else(|| StoreError::UnknownPatient(name.clone()))?;
        patient.boards.push(board);
        let number = patient.boards.len();

        self.save(&mut store)?;
        tracing::info!(patient = %name, board = number, "board saved");
        Ok(number)
    }

    /// Saved boards of a patient, oldest first
    pub fn list(&self, name: &str) -> Result<Vec<Board>, StoreError> {
        let name = clean_name(name)?;
        let mut store = self.load()?;
        store
            .patients
            .remove(&name)
            .map(|p| p.boards)
            .ok_or(StoreError::UnknownPatient(name))
    }

    pub fn contains(&self, name: &str) -> Result<bool, StoreError> {
        let name = clean_name(name)?;
        Ok(self.load()?.patients.contains_key(&name))
    }

    /// All patients, sorted by name
    pub fn patients(&self) -> Result<Vec<PatientSummary>, StoreError> {
        Ok(self
            .load()?
            .patients
            .into_iter()
            .map(|(name, p)| PatientSummary {
                name,
                boards: p.boards.len(),
                created_at: p.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::model::{BoardItem, PictoSource, PictogramRef};
    use tempfile::tempdir;

    fn board(words: &[(&str, Option<&str>)]) -> Board {
        Board::new(
            None,
            words
                .iter()
                .map(|(w, id)| match id {
                    Some(id) => BoardItem::resolved(*w, PictogramRef::new(*id), PictoSource::Direct),
                    None => BoardItem::unresolved(*w),
                })
                .collect(),
        )
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp = tempdir().unwrap();
        let store = PatientStore::new(temp.path().join("patients.json"));
        assert!(store.patients().unwrap().is_empty());
    }

    #[test]
    fn test_register_twice_keeps_history() {
        let temp = tempdir().unwrap();
        let store = PatientStore::new(temp.path().join("patients.json"));

        assert!(store.register("Maria").unwrap().created);
        store.append("Maria", board(&[("oi", Some("1"))])).unwrap();

        assert!(!store.register("Maria").unwrap().created);
        assert!(!store.register("  Maria ").unwrap().created);

        let patients = store.patients().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].boards, 1);
        assert_eq!(store.list("Maria").unwrap().len(), 1);
    }

    #[test]
    fn test_blank_name_rejected() {
        let temp = tempdir().unwrap();
        let store = PatientStore::new(temp.path().join("patients.json"));
        assert!(matches!(store.register("   "), Err(StoreError::EmptyName)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_round_trip_preserves_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data").join("patients.json");
        let store = PatientStore::new(&path);
        store.register("Ana").unwrap();

        let first = board(&[("quero", Some("5441")), ("beber", Some("42")), ("xklqz", None)]);
        let second = board(&[("tchau", Some("7"))]);
        assert_eq!(store.append("Ana", first.clone()).unwrap(), 1);
        assert_eq!(store.append("Ana", second.clone()).unwrap(), 2);

        // fresh handle reads from disk
        let reloaded = PatientStore::new(&path).list("Ana").unwrap();
        assert_eq!(reloaded, vec![first, second]);
    }

    #[test]
    fn test_append_unknown_patient() {
        let temp = tempdir().unwrap();
        let store = PatientStore::new(temp.path().join("patients.json"));
        assert!(matches!(
            store.append("Ninguem", board(&[])),
            Err(StoreError::UnknownPatient(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("patients.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = PatientStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
        assert!(store.register("Maria").is_err());
        // the corrupt file is left untouched
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_file_is_utf8_and_human_readable() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("patients.json");
        let store = PatientStore::new(&path);
        store.register("João").unwrap();
        store.append("João", board(&[("água", Some("2248"))])).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("João"));
        assert!(raw.contains("água"));
        assert!(raw.contains("\"version\": \"1\""));
        assert!(raw.lines().count() > 5);
    }

    #[test]
    fn test_patients_sorted() {
        let temp = tempdir().unwrap();
        let store = PatientStore::new(temp.path().join("patients.json"));
        store.register("Pedro").unwrap();
        store.register("Ana").unwrap();
        let names: Vec<_> = store.patients().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ana", "Pedro"]);
    }
}
