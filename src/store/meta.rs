//! Store file metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk format version
pub const STORE_VERSION: &str = "1";

/// Header fields written at the top of patients.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    /// Store format version
    pub version: String,

    /// Time of the last successful write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            updated_at: None,
        }
    }
}

impl StoreMeta {
    pub fn touch(&mut self) {
        self.version = STORE_VERSION.to_string();
        self.updated_at = Some(Utc::now());
    }
}
