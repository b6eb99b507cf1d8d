//! Export a saved board or the draft to PDF

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backends::images::{HttpImageSource, ImageSource, NoImages};
use crate::board::model::Board;
use crate::core::model::{ResultItem, ResultSet};
use crate::core::paths::default_export_name;
use crate::export::pdf::{render_pdf, ExportOptions};
use crate::flows::Context;

/// Which board to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSelector {
    /// 1-based history entry
    Saved(usize),
    Draft,
}

#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub out: Option<PathBuf>,
    pub columns: usize,
    /// Skip image downloads; cells show captions only
    pub no_images: bool,
}

fn select_board(ctx: &Context, name: &str, selector: BoardSelector) -> Result<(Board, Option<usize>)> {
    match selector {
        BoardSelector::Draft => {
            let draft = ctx.drafts().get(name)?.ok_or_else(|| {
                ctx.reject("NO_DRAFT", format!("patient '{}' has no draft board", name))
            })?;
            Ok((draft.board, None))
        }
        BoardSelector::Saved(number) => {
            let mut boards = ctx.store().list(name)?;
            let len = boards.len();
            if number == 0 || number > len {
                return Err(ctx.reject(
                    "BAD_INDEX",
                    format!(
                        "board {} does not exist; patient '{}' has {} saved board(s)",
                        number, name, len
                    ),
                ));
            }
            Ok((boards.swap_remove(number - 1), Some(number)))
        }
    }
}

/// Render a board and write it to `out`; returns the byte count
pub fn write_pdf(
    patient: &str,
    board: &Board,
    images: &dyn ImageSource,
    options: ExportOptions,
    out: &Path,
) -> Result<usize> {
    let bytes = render_pdf(patient, board, images, options)?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(out, &bytes).with_context(|| format!("Failed to write PDF: {:?}", out))?;
    Ok(bytes.len())
}

/// Export a board of a patient to PDF
pub fn run_export(
    ctx: &Context,
    patient: &str,
    selector: BoardSelector,
    request: ExportRequest,
) -> Result<()> {
    if request.columns == 0 {
        return Err(ctx.reject("BAD_COLUMNS", "--columns must be at least 1"));
    }
    let name = ctx.registered_patient(patient)?;
    let (board, number) = select_board(ctx, &name, selector)?;

    let out = request
        .out
        .unwrap_or_else(|| default_export_name(&name, number));

    let images: Box<dyn ImageSource> = if request.no_images {
        Box::new(NoImages)
    } else {
        Box::new(HttpImageSource::new(
            ctx.http_client()?,
            ctx.settings.api_base.clone(),
        ))
    };

    let options = ExportOptions {
        columns: request.columns,
    };
    let size = write_pdf(&name, &board, images.as_ref(), options, &out)?;
    tracing::info!(patient = %name, path = ?out, bytes = size, "board exported");

    let mut result_set = ResultSet::new();
    result_set.push(
        ResultItem::export(&name, out.display().to_string())
            .with_board(number)
            .with_data(serde_json::json!({
                "cells": board.len(),
                "missing": board.missing_count(),
                "bytes": size,
            })),
    );
    ctx.emit(&result_set);
    Ok(())
}
