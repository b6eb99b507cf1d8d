//! Draft boards
//!
//! Each patient has at most one in-progress board, kept in
//! `drafts/<xxh3(name)>.json` until it is saved to the history or discarded.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::board::model::Draft;
use crate::core::util::hash_bytes;

pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[allow(dead_code)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Draft file for a patient
    pub fn path_for(&self, patient: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", hash_bytes(patient.trim().as_bytes())))
    }

    /// Store a draft, replacing any previous draft of the same patient
    pub fn put(&self, draft: &Draft) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create drafts directory: {:?}", self.dir))?;

        let path = self.path_for(&draft.patient);
        let json = serde_json::to_string_pretty(draft)?;
        fs::write(&path, json).with_context(|| format!("Failed to write draft: {:?}", path))?;
        Ok(path)
    }

    /// Current draft of a patient, if any
    pub fn get(&self, patient: &str) -> Result<Option<Draft>> {
        let path = self.path_for(patient);
        if !path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read draft: {:?}", path))?;
        let draft: Draft = serde_json::from_str(&content)
            .with_context(|| format!("Invalid draft file: {:?}", path))?;
        Ok(Some(draft))
    }

    /// Remove a patient's draft; returns whether one existed
    pub fn remove(&self, patient: &str) -> Result<bool> {
        let path = self.path_for(patient);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("Failed to remove draft: {:?}", path))?;
        Ok(true)
    }
}
