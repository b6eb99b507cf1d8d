//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::backends::arasaac::DEFAULT_API_BASE;
use crate::backends::segment::{LlmSettings, DEFAULT_LLM_BASE, DEFAULT_LLM_MODEL};
use crate::board::clean::CleanPolicy;
use crate::core::config::Settings;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::export::pdf::DEFAULT_COLUMNS;
use crate::flows::board::{GenerateOptions, SegmenterKind};
use crate::flows::export::{BoardSelector, ExportRequest};
use crate::flows::Context;
use crate::pictos::resolver::DEFAULT_UNIVERSAL_TERM;

/// aacboard - build pictogram communication boards from phrases.
#[derive(Parser, Debug)]
#[command(name = "aacboard")]
#[command(
    author,
    version,
    about,
    long_about = r#"aacboard turns a phrase into a board of pictograms for alternative and
augmentative communication (AAC), keeps a board history per patient, and
exports boards to PDF.

Each command prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: summary lines only

Examples:
    aacboard patient add Maria
    aacboard board generate --patient Maria "quero beber água"
    aacboard board set --patient Maria --index 2 --picto 2248
    aacboard board save --patient Maria
    aacboard export --patient Maria --board 1
"#
)]
pub struct Cli {
    /// Directory holding the patient store and drafts.
    #[arg(
        long,
        global = true,
        env = "AACBOARD_DATA_DIR",
        default_value = "data",
        value_name = "DIR",
        long_help = "Directory holding patients.json, the drafts/ directory and an optional\n\
aliases.json with extra synonyms. Created on first write."
    )]
    pub data_dir: PathBuf,

    /// Pictogram service base URL.
    #[arg(
        long,
        global = true,
        env = "AACBOARD_API_BASE",
        default_value = DEFAULT_API_BASE,
        value_name = "URL",
        long_help = "Base URL of the pictogram service.\n\n\
Search requests go to <URL>/{lang}/search/{word}; images are served from <URL>/{id}."
    )]
    pub api_base: String,

    /// Search languages, tried in order (comma-separated).
    #[arg(
        long = "lang",
        global = true,
        env = "AACBOARD_LANGS",
        value_delimiter = ',',
        default_value = "pt,en",
        value_name = "LANGS"
    )]
    pub languages: Vec<String>,

    /// Timeout in seconds for every outbound request.
    #[arg(
        long,
        global = true,
        env = "AACBOARD_TIMEOUT",
        default_value = "10",
        value_name = "SECS"
    )]
    pub timeout: u64,

    /// Retries for transient search failures (network errors, HTTP 5xx).
    #[arg(long, global = true, default_value = "1", value_name = "N")]
    pub retries: u32,

    /// Search term used when a word matches nothing.
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_UNIVERSAL_TERM,
        value_name = "TERM",
        long_help = "Universal fallback search term. Words that match nothing directly or\n\
through synonyms get the first pictogram found for this term."
    )]
    pub fallback_term: String,

    /// Base URL of the OpenAI-compatible segmentation service.
    #[arg(
        long,
        global = true,
        env = "AACBOARD_LLM_BASE",
        default_value = DEFAULT_LLM_BASE,
        value_name = "URL"
    )]
    pub llm_base: String,

    /// Model used for LLM segmentation.
    #[arg(
        long,
        global = true,
        env = "AACBOARD_LLM_MODEL",
        default_value = DEFAULT_LLM_MODEL,
        value_name = "MODEL"
    )]
    pub llm_model: String,

    /// API key for LLM segmentation.
    #[arg(
        long,
        global = true,
        env = "OPENAI_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub openai_api_key: Option<String>,

    /// Retries after the segmentation service answers 429, 5xx or is unreachable.
    #[arg(long, global = true, default_value = "2", value_name = "N")]
    pub llm_retries: u32,

    /// Wait before retrying a failed segmentation request (milliseconds).
    #[arg(
        long,
        global = true,
        env = "AACBOARD_LLM_RETRY_MS",
        default_value = "3000",
        value_name = "MS"
    )]
    pub llm_retry_delay_ms: u64,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Tip: Prefer jsonl when you want stable, line-oriented output for piping."
    )]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Reduce diagnostics on stderr to errors. Results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug diagnostics on stderr: search requests, cascade decisions,\n\
cache hits. RUST_LOG overrides this."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register and list patients.
    Patient {
        #[command(subcommand)]
        action: PatientCommands,
    },

    /// Generate, inspect, edit and save the draft board of a patient.
    #[command(
        long_about = "Every patient has at most one draft board. `board generate` creates it\n\
from a phrase; `show`, `alternatives` and `set` inspect and edit it; `save` appends it\n\
to the patient's history and `discard` throws it away."
    )]
    Board {
        #[command(subcommand)]
        action: BoardCommands,
    },

    /// Show the saved boards of a patient.
    History {
        /// Patient name.
        #[arg(long, value_name = "NAME")]
        patient: String,
    },

    /// Export a saved board or the draft to PDF.
    #[command(
        group(ArgGroup::new("which").required(true).args(["board", "draft"])),
        long_about = "Render a board as a PDF grid of pictograms with captions.\n\n\
Examples:\n\
  aacboard export --patient Maria --board 1\n\
  aacboard export --patient Maria --draft --out maria.pdf --columns 3\n"
    )]
    Export {
        /// Patient name.
        #[arg(long, value_name = "NAME")]
        patient: String,

        /// 1-based number of a saved board.
        #[arg(long, value_name = "N")]
        board: Option<usize>,

        /// Export the current draft instead of a saved board.
        #[arg(long)]
        draft: bool,

        /// Output file (default: prancha_<patient>[_<n>].pdf).
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Cells per row.
        #[arg(long, default_value_t = DEFAULT_COLUMNS, value_name = "N")]
        columns: usize,

        /// Do not download images; cells show captions only.
        #[arg(long)]
        no_images: bool,
    },

    /// Resolve words to pictograms without building a board.
    Resolve {
        /// Words to resolve.
        #[arg(value_name = "WORD", required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Check the data directory, the store and the external services.
    #[command(
        long_about = "Check that the data directory is writable, the store is readable, the\n\
pictogram service answers, and whether an LLM key is configured.\n\n\
Example:\n\
  aacboard doctor --format md\n"
    )]
    Doctor,
}

#[derive(Subcommand, Debug)]
pub enum PatientCommands {
    /// Register a patient (no-op if already registered).
    Add {
        /// Patient name.
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List registered patients.
    List,
}

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Build a draft board from a phrase.
    #[command(
        long_about = "Segment PHRASE into words, clean them, and resolve each word to a\n\
pictogram. The result becomes the patient's draft board.\n\n\
Examples:\n\
  aacboard board generate --patient Maria \"quero beber água\"\n\
  aacboard board generate --patient Maria --segmenter llm --dedupe \"eu quero ir ao parque\"\n"
    )]
    Generate {
        /// Patient name.
        #[arg(long, value_name = "NAME")]
        patient: String,

        /// Segmenter (whitespace/llm).
        #[arg(
            long,
            default_value = "whitespace",
            value_parser = ["whitespace", "llm"],
            value_name = "KIND"
        )]
        segmenter: String,

        /// Drop repeated words (first occurrence wins).
        #[arg(long)]
        dedupe: bool,

        /// Drop stop words (de, da, do, a, o, à).
        #[arg(long)]
        drop_stopwords: bool,

        /// Save the board to the history right away.
        #[arg(long)]
        save: bool,

        /// The phrase.
        #[arg(value_name = "PHRASE")]
        phrase: String,
    },

    /// Print the draft board.
    Show {
        #[arg(long, value_name = "NAME")]
        patient: String,
    },

    /// List candidate pictograms for one cell.
    Alternatives {
        #[arg(long, value_name = "NAME")]
        patient: String,

        /// 1-based cell position.
        #[arg(long, value_name = "N")]
        index: usize,

        /// Maximum number of candidates.
        #[arg(long, default_value = "10", value_name = "K")]
        limit: usize,
    },

    /// Replace or clear the pictogram of one cell.
    #[command(group(ArgGroup::new("change").required(true).args(["picto", "clear"])))]
    Set {
        #[arg(long, value_name = "NAME")]
        patient: String,

        /// 1-based cell position.
        #[arg(long, value_name = "N")]
        index: usize,

        /// Pictogram id to use.
        #[arg(long, value_name = "ID")]
        picto: Option<String>,

        /// Remove the pictogram; the cell shows its caption only.
        #[arg(long)]
        clear: bool,
    },

    /// Append the draft to the patient's history.
    Save {
        #[arg(long, value_name = "NAME")]
        patient: String,
    },

    /// Delete the draft.
    Discard {
        #[arg(long, value_name = "NAME")]
        patient: String,
    },
}

impl Cli {
    /// Resolve runtime settings from flags and environment
    pub fn settings(&self) -> Result<Settings> {
        Settings {
            data_dir: self.data_dir.clone(),
            api_base: self.api_base.clone(),
            languages: self.languages.clone(),
            timeout: Duration::from_secs(self.timeout),
            retries: self.retries,
            universal_term: self.fallback_term.clone(),
            llm: LlmSettings {
                api_key: self.openai_api_key.clone(),
                base_url: self.llm_base.clone(),
                model: self.llm_model.clone(),
                max_retries: self.llm_retries,
                retry_delay: Duration::from_millis(self.llm_retry_delay_ms),
            },
        }
        .validated()
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Parse output format
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let settings = cli.settings()?;
    tracing::debug!(data_dir = ?settings.data_dir, api_base = %settings.api_base, "settings resolved");

    let ctx = Context::new(settings, render_config);

    match cli.command {
        Commands::Patient { action } => match action {
            PatientCommands::Add { name } => crate::flows::patients::run_add(&ctx, &name),
            PatientCommands::List => crate::flows::patients::run_list(&ctx),
        },

        Commands::Board { action } => match action {
            BoardCommands::Generate {
                patient,
                segmenter,
                dedupe,
                drop_stopwords,
                save,
                phrase,
            } => {
                let options = GenerateOptions {
                    segmenter: segmenter.parse::<SegmenterKind>().unwrap_or_default(),
                    policy: CleanPolicy {
                        dedupe,
                        drop_stopwords,
                        ..CleanPolicy::default()
                    },
                    save,
                };
                crate::flows::board::run_generate(&ctx, &patient, &phrase, options)
            }
            BoardCommands::Show { patient } => crate::flows::board::run_show(&ctx, &patient),
            BoardCommands::Alternatives {
                patient,
                index,
                limit,
            } => crate::flows::board::run_alternatives(&ctx, &patient, index, limit),
            BoardCommands::Set {
                patient,
                index,
                picto,
                clear,
            } => {
                let picto = if clear { None } else { picto };
                crate::flows::board::run_set(&ctx, &patient, index, picto.as_deref())
            }
            BoardCommands::Save { patient } => crate::flows::board::run_save(&ctx, &patient),
            BoardCommands::Discard { patient } => {
                crate::flows::board::run_discard(&ctx, &patient)
            }
        },

        Commands::History { patient } => crate::flows::history::run_history(&ctx, &patient),

        Commands::Export {
            patient,
            board,
            draft,
            out,
            columns,
            no_images,
        } => {
            let selector = match board {
                Some(n) if !draft => BoardSelector::Saved(n),
                _ => BoardSelector::Draft,
            };
            crate::flows::export::run_export(
                &ctx,
                &patient,
                selector,
                ExportRequest {
                    out,
                    columns,
                    no_images,
                },
            )
        }

        Commands::Resolve { words } => crate::flows::resolve::run_resolve(&ctx, &words),

        Commands::Doctor => crate::backends::doctor::run_doctor(&ctx.settings, ctx.render),
    }
}
