//! Per-session resolution cache
//!
//! Keyed by normalized word. Entries live for one session (one CLI
//! invocation) and are never evicted before `clear`. Only successful
//! resolutions are stored.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::pictos::resolver::Resolution;

#[derive(Debug, Default)]
pub struct ResolveCache {
    entries: Mutex<HashMap<String, Resolution>>,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Resolution> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, resolution: Resolution) {
        self.lock().insert(key, resolution);
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Resolution>> {
        // a poisoned map still holds valid entries
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
