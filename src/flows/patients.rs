//! Patient registry workflows

use anyhow::Result;

use crate::core::model::{ResultItem, ResultSet};
use crate::flows::Context;
use crate::store::patients::{clean_name, PatientSummary};

fn summary_item(summary: &PatientSummary) -> ResultItem {
    ResultItem::patient(&summary.name)
        .with_excerpt(format!("{} board(s)", summary.boards))
        .with_data(serde_json::json!({
            "boards": summary.boards,
            "created_at": summary.created_at,
        }))
}

/// Register a patient; registering an existing name keeps their history
pub fn run_add(ctx: &Context, name: &str) -> Result<()> {
    let name = clean_name(name).map_err(|e| ctx.reject("EMPTY_NAME", e))?;
    let registration = ctx.store().register(&name)?;

    let excerpt = if registration.created {
        "registered"
    } else {
        "already registered"
    };

    let mut result_set = ResultSet::new();
    result_set.push(
        ResultItem::patient(&name)
            .with_excerpt(excerpt)
            .with_data(serde_json::json!({ "created": registration.created })),
    );
    ctx.emit(&result_set);
    Ok(())
}

/// List registered patients, sorted by name
pub fn run_list(ctx: &Context) -> Result<()> {
    let result_set: ResultSet = ctx.store().patients()?.iter().map(summary_item).collect();
    ctx.emit(&result_set);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_summary_item() {
        let item = summary_item(&PatientSummary {
            name: "Maria".to_string(),
            boards: 2,
            created_at: Utc::now(),
        });
        assert_eq!(item.patient.as_deref(), Some("Maria"));
        assert_eq!(item.excerpt.as_deref(), Some("2 board(s)"));
        assert_eq!(item.data.unwrap()["boards"], 2);
    }
}
