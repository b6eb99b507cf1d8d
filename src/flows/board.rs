//! Board workflows: generate, show, alternatives, set, save, discard
//!
//! The draft of each patient lives on disk between invocations, so a
//! board can be generated, inspected, edited and finally saved across
//! separate commands.

use anyhow::{Context as _, Result};

use crate::backends::arasaac::PictogramSearch;
use crate::backends::segment::{LlmSegmenter, SegmentError, Segmenter, WhitespaceSegmenter};
use crate::board::assemble::assemble;
use crate::board::clean::CleanPolicy;
use crate::board::model::{Draft, PictogramRef};
use crate::core::model::{AacError, ResultItem, ResultSet};
use crate::flows::{board_items, Context};
use crate::pictos::resolver::Resolver;
use crate::store::drafts::DraftStore;
use crate::store::patients::PatientStore;

/// Which segmenter turns the phrase into words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmenterKind {
    #[default]
    Whitespace,
    Llm,
}

impl std::str::FromStr for SegmenterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whitespace" | "ws" => Ok(SegmenterKind::Whitespace),
            "llm" => Ok(SegmenterKind::Llm),
            _ => Err(format!("Unknown segmenter: {}", s)),
        }
    }
}

/// Options of `board generate`
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub segmenter: SegmenterKind,
    pub policy: CleanPolicy,
    /// Append straight to the history instead of keeping a draft
    pub save: bool,
}

/// Segment, clean and resolve a phrase into a draft board
pub fn build_draft<S: PictogramSearch>(
    resolver: &Resolver<S>,
    segmenter: &dyn Segmenter,
    policy: &CleanPolicy,
    patient: &str,
    phrase: &str,
) -> Result<Draft, SegmentError> {
    let words = policy.apply(segmenter.segment(phrase)?);
    tracing::debug!(patient = %patient, words = ?words, "segmented phrase");
    if words.is_empty() {
        return Err(SegmentError::NoWords);
    }
    Ok(assemble(resolver, patient, Some(phrase), &words))
}

/// Move a patient's draft into the history.
///
/// The draft is deleted only after the store accepted the board.
pub fn save_draft(store: &PatientStore, drafts: &DraftStore, patient: &str) -> Result<Option<usize>> {
    let Some(draft) = drafts.get(patient)? else {
        return Ok(None);
    };

    let number = store.append(patient, draft.board).with_context(|| {
        format!(
            "Failed to save board; draft kept at {:?}",
            drafts.path_for(patient)
        )
    })?;
    drafts.remove(patient)?;
    Ok(Some(number))
}

/// Generate a board from a phrase
pub fn run_generate(ctx: &Context, patient: &str, phrase: &str, options: GenerateOptions) -> Result<()> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(ctx.reject("EMPTY_PHRASE", "phrase must not be empty"));
    }
    let name = ctx.registered_patient(patient)?;

    let segmenter: Box<dyn Segmenter> = match options.segmenter {
        SegmenterKind::Whitespace => Box::new(WhitespaceSegmenter),
        SegmenterKind::Llm => Box::new(LlmSegmenter::new(
            ctx.http_client()?,
            ctx.settings.llm.clone(),
        )),
    };

    let resolver = ctx.resolver()?;
    let draft = match build_draft(&resolver, segmenter.as_ref(), &options.policy, &name, phrase) {
        Ok(draft) => draft,
        Err(e @ SegmentError::RateLimited { .. }) => {
            tracing::warn!(error = %e, "segmentation rate limited");
            let mut result_set = ResultSet::new();
            result_set.push(
                ResultItem::error(AacError::new(
                    "RATE_LIMITED",
                    "rate limited by the segmentation service, try again later",
                ))
                .with_patient(&name),
            );
            ctx.emit(&result_set);
            return Ok(());
        }
        Err(e @ SegmentError::MissingApiKey) => return Err(ctx.reject("MISSING_API_KEY", e)),
        Err(e @ SegmentError::NoWords) => return Err(ctx.reject("EMPTY_PHRASE", e)),
        Err(e) => return Err(ctx.reject("SEGMENT_FAILED", e)),
    };

    let drafts = ctx.drafts();
    let path = drafts.put(&draft)?;
    tracing::info!(patient = %name, path = ?path, "draft written");

    let number = if options.save {
        save_draft(&ctx.store(), &drafts, &name)?
    } else {
        None
    };

    let result_set: ResultSet = board_items(&name, number, &draft.board, &ctx.settings.api_base)
        .into_iter()
        .collect();
    ctx.emit(&result_set);
    Ok(())
}

fn load_draft(ctx: &Context, name: &str) -> Result<Draft> {
    ctx.drafts().get(name)?.ok_or_else(|| {
        ctx.reject(
            "NO_DRAFT",
            format!("patient '{}' has no draft board; run `board generate` first", name),
        )
    })
}

/// Print the current draft
pub fn run_show(ctx: &Context, patient: &str) -> Result<()> {
    let name = ctx.registered_patient(patient)?;
    let draft = load_draft(ctx, &name)?;

    let result_set: ResultSet =
        board_items(&name, None, &draft.board, &ctx.settings.api_base).into_iter().collect();
    ctx.emit(&result_set);
    Ok(())
}

/// List candidate pictograms for one cell of the draft
pub fn run_alternatives(ctx: &Context, patient: &str, index: usize, limit: usize) -> Result<()> {
    let name = ctx.registered_patient(patient)?;
    let draft = load_draft(ctx, &name)?;
    let word = draft
        .board
        .cell(index)
        .map_err(|e| ctx.reject("BAD_INDEX", e))?
        .word
        .clone();

    let resolver = ctx.resolver()?;
    let candidates = resolver
        .alternatives(&word, limit)
        .map_err(|e| ctx.reject("SEARCH_FAILED", e))?;

    let api_base = &ctx.settings.api_base;
    let result_set: ResultSet = candidates
        .iter()
        .enumerate()
        .map(|(rank, picto)| {
            ResultItem::candidate(rank + 1, &word, picto, api_base)
                .with_patient(&name)
                .with_data(serde_json::json!({ "cell": index }))
        })
        .collect();

    if result_set.is_empty() {
        tracing::info!(word = %word, "no alternatives found");
    }
    ctx.emit(&result_set);
    Ok(())
}

/// Overwrite or clear the pictogram of one draft cell
pub fn run_set(ctx: &Context, patient: &str, index: usize, picto: Option<&str>) -> Result<()> {
    let picto = match picto.map(str::trim) {
        Some("") => return Err(ctx.reject("EMPTY_PICTO", "pictogram id must not be empty")),
        other => other.map(PictogramRef::new),
    };

    let name = ctx.registered_patient(patient)?;
    let mut draft = load_draft(ctx, &name)?;
    draft
        .board
        .set_picto(index, picto)
        .map_err(|e| ctx.reject("BAD_INDEX", e))?;
    ctx.drafts().put(&draft)?;

    let result_set: ResultSet =
        board_items(&name, None, &draft.board, &ctx.settings.api_base).into_iter().collect();
    ctx.emit(&result_set);
    Ok(())
}

/// Append the draft to the patient's history
pub fn run_save(ctx: &Context, patient: &str) -> Result<()> {
    let name = ctx.registered_patient(patient)?;
    let drafts = ctx.drafts();
    let draft = load_draft(ctx, &name)?;

    let Some(number) = save_draft(&ctx.store(), &drafts, &name)? else {
        return Err(ctx.reject("NO_DRAFT", format!("patient '{}' has no draft board", name)));
    };

    let result_set: ResultSet =
        board_items(&name, Some(number), &draft.board, &ctx.settings.api_base)
            .into_iter()
            .collect();
    ctx.emit(&result_set);
    Ok(())
}

/// Throw the draft away
pub fn run_discard(ctx: &Context, patient: &str) -> Result<()> {
    let name = ctx.registered_patient(patient)?;
    if !ctx.drafts().remove(&name)? {
        return Err(ctx.reject("NO_DRAFT", format!("patient '{}' has no draft board", name)));
    }

    let mut result_set = ResultSet::new();
    result_set.push(ResultItem::board(&name, None).with_excerpt("draft discarded"));
    ctx.emit(&result_set);
    Ok(())
}
