//! Resolve words outside of any board
//!
//! Useful to see which tier of the cascade answers a word.

use anyhow::Result;

use crate::board::model::BoardItem;
use crate::core::model::{AacError, ResultItem, ResultSet};
use crate::flows::Context;
use crate::pictos::resolver::ResolveError;

/// Resolve each word and emit one cell per word
pub fn run_resolve(ctx: &Context, words: &[String]) -> Result<()> {
    let resolver = ctx.resolver()?;
    tracing::debug!(languages = ?resolver.config().languages, "resolving {} word(s)", words.len());
    let api_base = &ctx.settings.api_base;

    let mut result_set = ResultSet::new();
    for (i, word) in words.iter().enumerate() {
        let item = match resolver.resolve(word) {
            Ok(resolution) => {
                let cell = BoardItem::resolved(word.as_str(), resolution.picto, resolution.source);
                ResultItem::cell(i + 1, &cell, api_base)
                    .with_data(serde_json::json!({ "term": resolution.term }))
            }
            Err(e) => {
                let code = match e {
                    ResolveError::EmptyWord => "EMPTY_WORD",
                    ResolveError::NoMatch { .. } => "NO_MATCH",
                    ResolveError::Unreachable { .. } => "SEARCH_UNREACHABLE",
                };
                ResultItem::cell(i + 1, &BoardItem::unresolved(word.as_str()), api_base)
                    .with_error(AacError::new(code, e.to_string()))
            }
        };
        result_set.push(item);
    }

    tracing::debug!(cached = resolver.cache().len(), "resolution session done");
    ctx.emit(&result_set);
    Ok(())
}
