//! aacboard - pictogram communication boards from phrases
//!
//! aacboard provides:
//! - Phrase segmentation (whitespace or a language model)
//! - Word to pictogram resolution with synonyms and a universal fallback
//! - Per-patient board history with an editable draft
//! - PDF export of boards
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod backends;
mod board;
mod cli;
mod core;
mod export;
mod flows;
mod pictos;
mod store;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    core::logging::init(cli.verbose, cli.quiet, cli.no_color);
    cli::run(cli)
}
