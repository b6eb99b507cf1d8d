//! Saved boards of a patient

use anyhow::Result;

use crate::core::model::{ResultItem, ResultSet};
use crate::flows::{board_items, Context};

/// Emit every saved board, oldest first, each followed by its cells
pub fn run_history(ctx: &Context, patient: &str) -> Result<()> {
    let name = ctx.registered_patient(patient)?;
    let boards = ctx.store().list(&name)?;

    let mut result_set = ResultSet::new();
    result_set.push(
        ResultItem::patient(&name)
            .with_excerpt(format!("{} board(s)", boards.len()))
            .with_data(serde_json::json!({ "boards": boards.len() })),
    );
    for (i, board) in boards.iter().enumerate() {
        result_set.extend(board_items(&name, Some(i + 1), board, &ctx.settings.api_base));
    }

    ctx.emit(&result_set);
    Ok(())
}
