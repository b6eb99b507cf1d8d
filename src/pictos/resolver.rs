//! Pictogram resolver
//!
//! Resolution cascade, stopping at the first hit:
//! 1. normalize the word
//! 2. multi-token phrase: try each non-stop token (direct, then aliases)
//! 3. direct search over the configured languages
//! 4. semantic aliases, in table order
//! 5. universal fallback term
//!
//! Search errors in steps 2-4 count as a miss for that term. Only a failure of
//! the universal query itself is reported to the caller.

use serde::Serialize;
use thiserror::Error;

use crate::backends::arasaac::{PictogramSearch, SearchError};
use crate::board::model::{PictoSource, PictogramRef};
use crate::core::normalize::{is_stop_token, normalize};
use crate::pictos::aliases::AliasTable;
use crate::pictos::cache::ResolveCache;

pub const DEFAULT_UNIVERSAL_TERM: &str = "pessoa";

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub picto: PictogramRef,
    pub source: PictoSource,
    /// Search term that produced the hit
    pub term: String,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("nothing to resolve: empty word")]
    EmptyWord,

    #[error("no pictogram found for '{word}', not even the universal fallback")]
    NoMatch { word: String },

    #[error("could not resolve '{word}': fallback search unreachable: {source}")]
    Unreachable {
        word: String,
        #[source]
        source: SearchError,
    },
}

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Languages tried in order for each search term
    pub languages: Vec<String>,
    /// Term searched when everything else misses
    pub universal_term: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            languages: vec!["pt".to_string(), "en".to_string()],
            universal_term: DEFAULT_UNIVERSAL_TERM.to_string(),
        }
    }
}

pub struct Resolver<S> {
    search: S,
    aliases: AliasTable,
    config: ResolverConfig,
    cache: ResolveCache,
}

impl<S: PictogramSearch> Resolver<S> {
    pub fn new(search: S, aliases: AliasTable, config: ResolverConfig) -> Self {
        Self {
            search,
            aliases,
            config,
            cache: ResolveCache::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResolveCache {
        &self.cache
    }

    /// Resolve a word to a pictogram.
    ///
    /// Results are cached per normalized word for the lifetime of the
    /// resolver, so a repeated word always gets the same pictogram.
    pub fn resolve(&self, word: &str) -> Result<Resolution, ResolveError> {
        let key = normalize(word);
        if key.is_empty() {
            return Err(ResolveError::EmptyWord);
        }

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(word = %key, id = %hit.picto, "resolution cache hit");
            return Ok(hit);
        }

        let resolution = self.resolve_uncached(&key)?;
        tracing::debug!(
            word = %key,
            id = %resolution.picto,
            source = %resolution.source,
            term = %resolution.term,
            "resolved"
        );
        self.cache.insert(key, resolution.clone());
        Ok(resolution)
    }

    fn resolve_uncached(&self, key: &str) -> Result<Resolution, ResolveError> {
        let tokens: Vec<&str> = key.split_whitespace().collect();
        if tokens.len() > 1 {
            for token in tokens.into_iter().filter(|t| !is_stop_token(t)) {
                if let Some((picto, term)) = self.lookup_with_aliases(token) {
                    return Ok(Resolution {
                        picto,
                        source: PictoSource::Phrase,
                        term,
                    });
                }
            }
        }

        if let Some(picto) = self.search_term(key) {
            return Ok(Resolution {
                picto,
                source: PictoSource::Direct,
                term: key.to_string(),
            });
        }

        if let Some((picto, term)) = self.lookup_aliases(key) {
            return Ok(Resolution {
                picto,
                source: PictoSource::Alias,
                term,
            });
        }

        self.universal(key)
    }

    fn lookup_with_aliases(&self, word: &str) -> Option<(PictogramRef, String)> {
        self.search_term(word)
            .map(|p| (p, word.to_string()))
            .or_else(|| self.lookup_aliases(word))
    }

    fn lookup_aliases(&self, word: &str) -> Option<(PictogramRef, String)> {
        // the word itself was already searched
        self.aliases
            .aliases_for(word)
            .iter()
            .filter(|alias| alias.as_str() != word)
            .find_map(|alias| self.search_term(alias).map(|p| (p, alias.clone())))
    }

    /// Top-ranked hit for a term over the configured languages
    fn search_term(&self, term: &str) -> Option<PictogramRef> {
        for lang in &self.config.languages {
            match self.search.search(lang, term) {
                Ok(hits) => {
                    if let Some(first) = hits.into_iter().next() {
                        return Some(first);
                    }
                }
                Err(e) => {
                    tracing::warn!(lang = %lang, term = %term, error = %e, "pictogram search failed");
                }
            }
        }
        None
    }

    fn universal(&self, word: &str) -> Result<Resolution, ResolveError> {
        let term = &self.config.universal_term;
        let mut last_error = None;

        for lang in &self.config.languages {
            match self.search.search(lang, term) {
                Ok(hits) => {
                    if let Some(picto) = hits.into_iter().next() {
                        tracing::info!(word = %word, id = %picto, "using universal fallback pictogram");
                        return Ok(Resolution {
                            picto,
                            source: PictoSource::Fallback,
                            term: term.clone(),
                        });
                    }
                }
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(source) => Err(ResolveError::Unreachable {
                word: word.to_string(),
                source,
            }),
            None => Err(ResolveError::NoMatch {
                word: word.to_string(),
            }),
        }
    }

    /// Candidate pictograms for manual substitution.
    ///
    /// Direct hits across languages first, then alias hits, without
    /// duplicates, in service rank order.
    pub fn alternatives(&self, word: &str, limit: usize) -> Result<Vec<PictogramRef>, ResolveError> {
        let key = normalize(word);
        if key.is_empty() {
            return Err(ResolveError::EmptyWord);
        }

        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut terms = vec![key.clone()];
        terms.extend(
            self.aliases
                .aliases_for(&key)
                .iter()
                .filter(|a| **a != key)
                .cloned(),
        );

        let mut found: Vec<PictogramRef> = Vec::new();
        let mut last_error = None;
        'terms: for term in &terms {
            for lang in &self.config.languages {
                match self.search.search(lang, term) {
                    Ok(hits) => {
                        for hit in hits {
                            if !found.contains(&hit) {
                                found.push(hit);
                            }
                            if found.len() >= limit {
                                break 'terms;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(lang = %lang, term = %term, error = %e, "pictogram search failed");
                        last_error = Some(e);
                    }
                }
            }
        }

        match (found.is_empty(), last_error) {
            (true, Some(source)) => Err(ResolveError::Unreachable { word: key, source }),
            _ => Ok(found),
        }
    }
}
