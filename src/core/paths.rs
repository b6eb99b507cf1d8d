//! Data directory layout
//!
//! ```text
//! <data-dir>/
//!   patients.json   patient registry + board history
//!   aliases.json    optional user alias table
//!   drafts/         in-progress board per patient
//! ```

use std::path::{Path, PathBuf};

use crate::core::util::slugify;

pub const STORE_FILE: &str = "patients.json";
pub const ALIASES_FILE: &str = "aliases.json";
pub const DRAFTS_DIR: &str = "drafts";

pub fn store_file(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_FILE)
}

pub fn aliases_file(data_dir: &Path) -> PathBuf {
    data_dir.join(ALIASES_FILE)
}

pub fn drafts_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(DRAFTS_DIR)
}

/// Default export file name: `prancha_<patient>[_<n>].pdf`
pub fn default_export_name(patient: &str, board_number: Option<usize>) -> PathBuf {
    let mut name = format!("prancha_{}", slugify(patient));
    if let Some(n) = board_number {
        name.push_str(&format!("_{}", n));
    }
    name.push_str(".pdf");
    PathBuf::from(name)
}
