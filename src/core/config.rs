//! Runtime settings
//!
//! Resolved once from CLI flags and their environment fallbacks, then
//! passed explicitly to every flow.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backends::segment::LlmSettings;
use crate::core::paths;

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,

    /// Pictogram API base; search is `<base>/{lang}/search/{term}`,
    /// images are `<base>/{id}`
    pub api_base: String,

    /// Search languages, tried in order
    pub languages: Vec<String>,

    /// Per-request timeout for every outbound call
    pub timeout: Duration,

    /// Retries for transient search failures
    pub retries: u32,

    /// Universal fallback search term
    pub universal_term: String,

    pub llm: LlmSettings,
}

impl Settings {
    /// Normalize and check values that clap cannot
    pub fn validated(mut self) -> Result<Self> {
        self.languages = self
            .languages
            .iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        if self.languages.is_empty() {
            bail!("at least one search language is required (--lang)");
        }

        if self.timeout.is_zero() {
            bail!("--timeout must be greater than zero");
        }

        self.universal_term = self.universal_term.trim().to_string();
        if self.universal_term.is_empty() {
            bail!("--fallback-term must not be empty");
        }

        if self.api_base.trim().is_empty() {
            bail!("--api-base must not be empty");
        }

        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_file(&self) -> PathBuf {
        paths::store_file(&self.data_dir)
    }

    pub fn drafts_dir(&self) -> PathBuf {
        paths::drafts_dir(&self.data_dir)
    }

    pub fn aliases_file(&self) -> PathBuf {
        paths::aliases_file(&self.data_dir)
    }
}
