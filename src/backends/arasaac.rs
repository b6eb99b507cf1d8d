//! Pictogram search client (ARASAAC REST API)
//!
//! `GET <base>/{lang}/search/{term}` returns a JSON array of pictogram
//! objects ranked by the service. Each object carries its id in `_id`
//! (current API) or `id`. An empty array or a 4xx status means "no match".

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::board::model::PictogramRef;

pub const DEFAULT_API_BASE: &str = "https://api.arasaac.org/api/pictograms";

/// Search client errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("search service returned HTTP {0}")]
    Status(u16),

    #[error("invalid search response: {0}")]
    Parse(String),

    #[error("invalid search URL: {0}")]
    Url(String),
}

impl SearchError {
    /// Failures worth one more attempt after a short delay
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::Network(_) => true,
            SearchError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// A pictogram search backend.
///
/// Returns hits in service rank order; an empty list means no match.
pub trait PictogramSearch: Send + Sync {
    fn search(&self, lang: &str, term: &str) -> Result<Vec<PictogramRef>, SearchError>;
}

impl<T: PictogramSearch + ?Sized> PictogramSearch for std::sync::Arc<T> {
    fn search(&self, lang: &str, term: &str) -> Result<Vec<PictogramRef>, SearchError> {
        (**self).search(lang, term)
    }
}

/// HTTP client for the pictogram search endpoint
pub struct ArasaacClient {
    http: Client,
    base: Url,
    retries: u32,
    retry_delay: Duration,
}

impl ArasaacClient {
    pub fn new(http: Client, base: &str) -> Result<Self, SearchError> {
        let base = Url::parse(base).map_err(|e| SearchError::Url(format!("{}: {}", base, e)))?;
        if base.cannot_be_a_base() {
            return Err(SearchError::Url(base.to_string()));
        }

        Ok(Self {
            http,
            base,
            retries: 1,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Set the bounded retry policy for transient failures
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    /// Build `<base>/{lang}/search/{term}` with each segment percent-encoded
    pub fn search_url(&self, lang: &str, term: &str) -> Result<Url, SearchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::Url(self.base.to_string()))?
            .pop_if_empty()
            .push(lang)
            .push("search")
            .push(term);
        Ok(url)
    }

    fn search_once(&self, url: &Url) -> Result<Vec<PictogramRef>, SearchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(SearchError::Status(status.as_u16()));
        }
        if status != StatusCode::OK {
            tracing::debug!(url = %url, status = status.as_u16(), "search miss");
            return Ok(Vec::new());
        }

        let body: Value = response
            .json()
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        parse_search_response(&body)
    }
}

impl PictogramSearch for ArasaacClient {
    fn search(&self, lang: &str, term: &str) -> Result<Vec<PictogramRef>, SearchError> {
        let url = self.search_url(lang, term)?;
        tracing::debug!(lang = %lang, term = %term, url = %url, "searching pictograms");

        let mut attempt = 0;
        loop {
            match self.search_once(&url) {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(error = %e, attempt, "transient search failure, retrying");
                    thread::sleep(self.retry_delay);
                }
                other => return other,
            }
        }
    }
}

/// Extract ranked pictogram ids from a search response body
pub fn parse_search_response(body: &Value) -> Result<Vec<PictogramRef>, SearchError> {
    let hits = body
        .as_array()
        .ok_or_else(|| SearchError::Parse("expected a JSON array".to_string()))?;

    Ok(hits.iter().filter_map(hit_id).map(PictogramRef::new).collect())
}

fn hit_id(hit: &Value) -> Option<String> {
    let id = hit.get("_id").or_else(|| hit.get("id"))?;
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
