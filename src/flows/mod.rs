//! Flows module - Command workflows
//!
//! Each flow validates its input, talks to the store and the backends, and
//! emits one ResultSet:
//! - patients: register and list patients
//! - board: generate, inspect, edit, save and discard the draft board
//! - history: saved boards of a patient
//! - export: board to PDF
//! - resolve: resolve single words (debugging the cascade)

pub mod board;
pub mod export;
pub mod history;
pub mod patients;
pub mod resolve;

use anyhow::{anyhow, Context as _, Result};
use reqwest::blocking::Client;
use std::fmt::Display;
use std::time::Duration;

use crate::backends::arasaac::ArasaacClient;
use crate::backends::http::build_client;
use crate::board::model::Board;
use crate::core::config::Settings;
use crate::core::model::{AacError, ResultItem, ResultSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::pictos::aliases::AliasTable;
use crate::pictos::resolver::{Resolver, ResolverConfig};
use crate::store::drafts::DraftStore;
use crate::store::patients::{clean_name, PatientStore};

const SEARCH_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Everything a command needs: settings plus output configuration
pub struct Context {
    pub settings: Settings,
    pub render: RenderConfig,
}

impl Context {
    pub fn new(settings: Settings, render: RenderConfig) -> Self {
        Self { settings, render }
    }

    pub fn store(&self) -> PatientStore {
        PatientStore::new(self.settings.store_file())
    }

    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(self.settings.drafts_dir())
    }

    pub fn http_client(&self) -> Result<Client> {
        build_client(self.settings.timeout).context("Failed to build HTTP client")
    }

    /// Built-in aliases plus `<data-dir>/aliases.json` when present
    pub fn aliases(&self) -> Result<AliasTable> {
        let mut table = AliasTable::builtin().clone();
        let path = self.settings.aliases_file();
        if path.exists() {
            let merged = table.merge_file(&path)?;
            tracing::debug!(path = ?path, merged, concepts = table.len(), "merged user aliases");
        }
        Ok(table)
    }

    /// A resolver with a fresh session cache
    pub fn resolver(&self) -> Result<Resolver<ArasaacClient>> {
        let search = ArasaacClient::new(self.http_client()?, &self.settings.api_base)?
            .with_retries(self.settings.retries, SEARCH_RETRY_DELAY);
        let config = ResolverConfig {
            languages: self.settings.languages.clone(),
            universal_term: self.settings.universal_term.clone(),
        };
        Ok(Resolver::new(search, self.aliases()?, config))
    }

    /// Print a result set to stdout in the configured format
    pub fn emit(&self, result_set: &ResultSet) {
        let renderer = Renderer::with_config(self.render);
        let output = renderer.render(result_set);
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    /// Report a validation failure as an error item and turn it into an error
    pub fn reject(&self, code: &str, message: impl Display) -> anyhow::Error {
        let message = message.to_string();
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::error(AacError::new(code, message.clone())));
        self.emit(&result_set);
        anyhow!(message)
    }

    /// Trimmed name of a registered patient, or a rejection
    pub fn registered_patient(&self, name: &str) -> Result<String> {
        let name = clean_name(name).map_err(|e| self.reject("EMPTY_NAME", e))?;
        if !self.store().contains(&name)? {
            return Err(self.reject(
                "UNKNOWN_PATIENT",
                format!("patient '{}' is not registered", name),
            ));
        }
        Ok(name)
    }
}

/// Board header followed by one cell item per board cell
pub fn board_items(
    patient: &str,
    number: Option<usize>,
    board: &Board,
    api_base: &str,
) -> Vec<ResultItem> {
    let summary = match &board.phrase {
        Some(phrase) => phrase.clone(),
        None => format!("{} cell(s)", board.len()),
    };

    let header = ResultItem::board(patient, number)
        .with_excerpt(summary)
        .with_data(serde_json::json!({
            "created_at": board.created_at,
            "cells": board.len(),
            "missing": board.missing_count(),
        }));

    std::iter::once(header)
        .chain(
            board
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| ResultItem::cell(i + 1, item, api_base)),
        )
        .collect()
}
