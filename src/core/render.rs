//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, raw

use colored::Colorize;
use std::io::Write;

use crate::core::model::{Kind, ResultItem, ResultSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with default options
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render to a writer
    #[allow(dead_code)]
    pub fn render_to<W: Write>(
        &self,
        result_set: &ResultSet,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(result_set);
        writer.write_all(output.as_bytes())
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown.
    ///
    /// Errors come first; everything else keeps emission order so cells stay
    /// under the board they belong to.
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let errors: Vec<_> = result_set
            .items
            .iter()
            .filter(|i| i.kind == Kind::Error)
            .collect();
        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    output.push_str(&format!("- **{}**: {}\n", error.code, error.message));
                }
            }
            output.push('\n');
        }

        let mut in_table = false;
        let mut in_list = false;
        for item in result_set.items.iter().filter(|i| i.kind != Kind::Error) {
            if item.kind != Kind::Cell && in_table {
                output.push('\n');
                in_table = false;
            }
            if !matches!(item.kind, Kind::Patient | Kind::Check | Kind::Export) && in_list {
                output.push('\n');
                in_list = false;
            }

            match item.kind {
                Kind::Board => self.render_board_md(&mut output, item),
                Kind::Cell => {
                    if !in_table {
                        output.push_str("| # | Word | Pictogram | Source |\n");
                        output.push_str("|---|------|-----------|--------|\n");
                        in_table = true;
                    }
                    self.render_cell_md(&mut output, item);
                }
                Kind::Patient | Kind::Check | Kind::Export => {
                    in_list = true;
                    self.render_line_md(&mut output, item);
                }
                Kind::Error => {}
            }
        }

        output
    }

    fn render_board_md(&self, output: &mut String, item: &ResultItem) {
        let title = match item.board {
            Some(n) => format!("Board {}", n),
            None => "Draft".to_string(),
        };
        output.push_str(&format!("## {}", title));
        if let Some(patient) = &item.patient {
            output.push_str(&format!(" - {}", patient));
        }
        output.push_str("\n\n");
        if let Some(excerpt) = &item.excerpt {
            output.push_str(&format!("> {}\n\n", excerpt));
        }
        for error in &item.errors {
            output.push_str(&format!("> ⚠️ **{}**: {}\n\n", error.code, error.message));
        }
    }

    fn render_cell_md(&self, output: &mut String, item: &ResultItem) {
        let picto = match (&item.picto_id, &item.url) {
            (Some(id), Some(url)) => format!("[{}]({})", id, url),
            (Some(id), None) => id.clone(),
            _ => "-".to_string(),
        };
        let source = item
            .source
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            item.index.unwrap_or_default(),
            item.word.as_deref().unwrap_or(""),
            picto,
            source
        ));
    }

    fn render_line_md(&self, output: &mut String, item: &ResultItem) {
        let marker = if !item.errors.is_empty() {
            "✗".red().to_string()
        } else if item.kind == Kind::Check {
            "✓".green().to_string()
        } else {
            "-".to_string()
        };

        output.push_str(&format!("{} ", marker));
        if let Some(patient) = &item.patient {
            output.push_str(&format!("**{}**", patient));
            if item.excerpt.is_some() {
                output.push_str(": ");
            }
        }
        if let Some(excerpt) = &item.excerpt {
            output.push_str(excerpt);
        }
        output.push('\n');
        for error in &item.errors {
            output.push_str(&format!("  - {}: {}\n", error.code, error.message));
        }
    }

    /// Render as raw output: summary lines only
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| match item.kind {
                Kind::Cell => Some(format!(
                    "{}\t{}",
                    item.word.as_deref().unwrap_or(""),
                    item.picto_id.as_deref().unwrap_or("-")
                )),
                Kind::Error => item
                    .errors
                    .first()
                    .map(|e| format!("{}: {}", e.code, e.message)),
                Kind::Patient => item.patient.clone(),
                _ => item.excerpt.clone().or_else(|| item.patient.clone()),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
