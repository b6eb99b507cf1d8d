//! Doctor - Configuration and connectivity checks

use anyhow::Result;
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::backends::arasaac::{ArasaacClient, PictogramSearch};
use crate::backends::http::build_client;
use crate::core::config::Settings;
use crate::core::model::{AacError, Kind, ResultItem, ResultSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::store::patients::PatientStore;

/// Outcome of one check
#[derive(Debug, Clone)]
pub struct CheckStatus {
    pub name: String,
    pub ok: bool,
    pub required: bool,
    pub detail: String,
    pub notes: Option<String>,
}

impl CheckStatus {
    fn pass(name: &str, required: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            ok: true,
            required,
            detail: detail.into(),
            notes: None,
        }
    }

    fn fail(name: &str, required: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            ok: false,
            required,
            detail: detail.into(),
            notes: None,
        }
    }

    fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn to_result_item(&self) -> ResultItem {
        let required = if self.required {
            "required"
        } else {
            "optional"
        };

        let mut message = format!("{} ({}) - {}", self.name, required, self.detail);
        if let Some(notes) = &self.notes {
            message.push_str(&format!("\n  Note: {}", notes));
        }

        let mut item = ResultItem::check(message).with_data(serde_json::json!({
            "check": self.name,
            "ok": self.ok,
            "required": self.required,
        }));

        if !self.ok && self.required {
            item.kind = Kind::Error;
            item.errors.push(AacError::new(
                "CHECK_FAILED",
                format!("{}: {}", self.name, self.detail),
            ));
        }

        item
    }
}

fn check_data_dir(dir: &Path) -> CheckStatus {
    const NAME: &str = "data-dir";

    if let Err(e) = fs::create_dir_all(dir) {
        return CheckStatus::fail(NAME, true, format!("cannot create {:?}: {}", dir, e));
    }

    let probe = dir.join(".aacboard-probe");
    match fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            CheckStatus::pass(NAME, true, format!("{:?} is writable", dir))
        }
        Err(e) => CheckStatus::fail(NAME, true, format!("{:?} is not writable: {}", dir, e)),
    }
}

fn check_store(path: &Path) -> CheckStatus {
    const NAME: &str = "store";

    let store = PatientStore::new(path);
    match store.load() {
        Ok(file) => CheckStatus::pass(
            NAME,
            true,
            format!("{} patient(s) in {:?}", file.patients.len(), store.path()),
        ),
        Err(e) => CheckStatus::fail(NAME, true, e.to_string()),
    }
}

fn check_search(search: &dyn PictogramSearch, settings: &Settings) -> CheckStatus {
    const NAME: &str = "pictogram-search";

    let lang = settings.languages.first().map(String::as_str).unwrap_or("pt");
    match search.search(lang, &settings.universal_term) {
        Ok(hits) if !hits.is_empty() => CheckStatus::pass(
            NAME,
            true,
            format!("{} reachable ({} result(s) for '{}')", settings.api_base, hits.len(), settings.universal_term),
        ),
        Ok(_) => CheckStatus::fail(
            NAME,
            true,
            format!("no results for fallback term '{}'", settings.universal_term),
        )
        .with_notes("Every unmatched word would stay without a pictogram; check --fallback-term"),
        Err(e) => CheckStatus::fail(NAME, true, format!("{} unreachable: {}", settings.api_base, e)),
    }
}

fn check_llm_key(settings: &Settings) -> CheckStatus {
    const NAME: &str = "llm-api-key";

    let configured = settings
        .llm
        .api_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty());

    if configured {
        CheckStatus::pass(NAME, false, format!("configured (model {})", settings.llm.model))
    } else {
        CheckStatus::fail(NAME, false, "not set")
            .with_notes("Only needed for --segmenter llm; set OPENAI_API_KEY")
    }
}

/// Run every check against the given search backend
pub fn run_checks(settings: &Settings, search: &dyn PictogramSearch) -> Vec<CheckStatus> {
    vec![
        check_data_dir(settings.data_dir()),
        check_store(&settings.store_file()),
        check_search(search, settings),
        check_llm_key(settings),
    ]
}

/// Run the doctor command
pub fn run_doctor(settings: &Settings, config: RenderConfig) -> Result<()> {
    let http = build_client(settings.timeout)?;
    let search = ArasaacClient::new(http, &settings.api_base)?.with_retries(0, Default::default());
    let checks = run_checks(settings, &search);

    let result_set: ResultSet = checks.iter().map(CheckStatus::to_result_item).collect();
    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result_set));

    let failed = checks.iter().filter(|c| c.required && !c.ok).count();
    if failed > 0 {
        eprintln!(
            "\n{}  {} required check(s) failed",
            "⚠️".yellow(),
            failed
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::tests::settings;
    use crate::pictos::resolver::tests::FakeSearch;
    use tempfile::TempDir;

    #[test]
    fn test_all_checks_pass() {
        let temp = TempDir::new().unwrap();
        let mut s = settings(temp.path());
        s.llm.api_key = Some("sk-test".to_string());
        let search = FakeSearch::new().hit("pt", "pessoa", &["1"]);

        let checks = run_checks(&s, &search);
        let names: Vec<_> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["data-dir", "store", "pictogram-search", "llm-api-key"]);
        assert!(checks.iter().all(|c| c.ok), "{:?}", checks);
    }

    #[test]
    fn test_search_down_is_required_failure() {
        let temp = TempDir::new().unwrap();
        let s = settings(temp.path());
        let search = FakeSearch::new().down();

        let checks = run_checks(&s, &search);
        let search_check = checks.iter().find(|c| c.name == "pictogram-search").unwrap();
        assert!(!search_check.ok);

        let item = search_check.to_result_item();
        assert_eq!(item.kind, Kind::Error);
        assert_eq!(item.errors[0].code, "CHECK_FAILED");
    }

    #[test]
    fn test_missing_llm_key_is_optional() {
        let temp = TempDir::new().unwrap();
        let s = settings(temp.path());
        let checks = run_checks(&s, &FakeSearch::new().hit("pt", "pessoa", &["1"]));

        let llm = checks.iter().find(|c| c.name == "llm-api-key").unwrap();
        assert!(!llm.ok);
        assert!(!llm.required);
        assert_eq!(llm.to_result_item().kind, Kind::Check);
    }

    #[test]
    fn test_corrupt_store_fails() {
        let temp = TempDir::new().unwrap();
        let s = settings(temp.path());
        fs::write(s.store_file(), "{ nope").unwrap();

        let checks = run_checks(&s, &FakeSearch::new().hit("pt", "pessoa", &["1"]));
        let store = checks.iter().find(|c| c.name == "store").unwrap();
        assert!(!store.ok);
    }
}
