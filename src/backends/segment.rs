//! Phrase segmentation
//!
//! Two backends:
//! - whitespace: split on whitespace, strip surrounding punctuation
//! - llm: an OpenAI-compatible chat completion that answers with a
//!   comma-separated word list
//!
//! Both return words in reading order.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::thread;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LLM_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

const MAX_TOKENS: u32 = 80;

static EDGE_PUNCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{P}\p{S}]+|[\p{P}\p{S}]+$").expect("Invalid EDGE_PUNCT regex")
});

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("no API key configured for the segmentation service (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("segmentation service is rate limiting requests (gave up after {attempts} attempts)")]
    RateLimited { attempts: u32 },

    #[error("network error: {0}")]
    Network(String),

    #[error("segmentation service returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("invalid segmentation response: {0}")]
    Parse(String),

    #[error("phrase contains no words")]
    NoWords,
}

impl SegmentError {
    /// Failures worth another attempt after a delay: 429, 5xx and transport errors
    pub fn is_transient(&self) -> bool {
        match self {
            SegmentError::Network(_) => true,
            SegmentError::Status(code, _) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Turns a phrase into words in reading order
pub trait Segmenter {
    fn segment(&self, phrase: &str) -> Result<Vec<String>, SegmentError>;
}

/// Whitespace split with punctuation trimmed from each token
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, phrase: &str) -> Result<Vec<String>, SegmentError> {
        Ok(phrase
            .split_whitespace()
            .map(|t| EDGE_PUNCT.replace_all(t, "").to_lowercase())
            .filter(|t| !t.is_empty())
            .collect())
    }
}

/// Settings for the language-model segmenter
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Retries after a 429, a 5xx or a transport error
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            max_retries: 2,
            retry_delay: Duration::from_secs(3),
        }
    }
}

/// Chat-completions segmenter
pub struct LlmSegmenter {
    http: Client,
    settings: LlmSettings,
}

impl LlmSegmenter {
    pub fn new(http: Client, settings: LlmSettings) -> Self {
        Self { http, settings }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn request_once(&self, api_key: &str, phrase: &str) -> Result<String, SegmentError> {
        let body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": build_prompt(phrase) }],
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| SegmentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(SegmentError::Status(status.as_u16(), text));
        }

        let value: Value = response
            .json()
            .map_err(|e| SegmentError::Parse(e.to_string()))?;
        extract_content(&value)
    }
}

impl Segmenter for LlmSegmenter {
    fn segment(&self, phrase: &str) -> Result<Vec<String>, SegmentError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SegmentError::MissingApiKey)?;

        let attempts = self.settings.max_retries + 1;
        let mut last_error = None;
        for attempt in 1..=attempts {
            tracing::debug!(model = %self.settings.model, attempt, "requesting segmentation");
            match self.request_once(api_key, phrase) {
                Ok(content) => return Ok(parse_word_list(&content)),
                Err(e) if e.is_transient() => {
                    if attempt < attempts {
                        tracing::warn!(
                            attempt,
                            error = %e,
                            delay_ms = self.settings.retry_delay.as_millis() as u64,
                            "segmentation failed, waiting to retry"
                        );
                        thread::sleep(self.settings.retry_delay);
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last_error {
            Some(SegmentError::Status(code, _)) if code == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                Err(SegmentError::RateLimited { attempts })
            }
            Some(e) => Err(e),
            None => Err(SegmentError::RateLimited { attempts }),
        }
    }
}

fn build_prompt(phrase: &str) -> String {
    format!(
        "Transforme a frase abaixo em palavras para Comunicação Alternativa.\n\
         Use palavras isoladas, incluindo artigos, preposições e conectivos se existirem.\n\
         Retorne apenas uma lista separada por vírgulas.\n\n\
         Frase: {}",
        phrase
    )
}

/// Pull `choices[0].message.content` (or the legacy `choices[0].text`)
pub fn extract_content(value: &Value) -> Result<String, SegmentError> {
    let choice = value
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| SegmentError::Parse("missing choices".to_string()))?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| choice.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SegmentError::Parse("missing message content".to_string()))
}

/// Split a comma-separated reply into trimmed, lower-cased words
pub fn parse_word_list(content: &str) -> Vec<String> {
    content
        .split(|c: char| c == ',' || c == '\n')
        .map(|w| w.trim().trim_matches(|c: char| c == '.' || c == '"').trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
