use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::errors::Result;
use crate::includes::RewriteReport;
use crate::viewer::{ViewRequest, ViewTarget};

#[derive(Parser, Debug)]
#[command(name = "odb-devtools")]
#[command(version, about = "Developer utilities for the ODB compiler sources", long_about = None)]
pub struct Args {
    /// Config file (defaults to ./odb-devtools.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the AST of the parser test enclosing a line
    View {
        /// Test source file
        filename: PathBuf,

        /// 1-based line inside the test
        line_number: usize,

        /// "source" to visualise the embedded snippet, or the kind of
        /// exported dot file to open (e.g. "ast")
        ast_type: String,

        /// Print the snippet or dot-file path instead of launching a viewer
        #[arg(short, long)]
        print: bool,
    },

    /// Prefix quoted #include directives in the vendored trees with their tree name
    FixIncludes {
        /// Directory containing the vendored trees
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn view_request(filename: PathBuf, line_number: usize, ast_type: &str) -> Result<ViewRequest> {
    let target: ViewTarget = ast_type.parse()?;
    Ok(ViewRequest {
        file: filename,
        line: line_number,
        target,
    })
}

pub fn render_report(report: &RewriteReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &RewriteReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        let _ = writeln!(out, "{}", file.path.display().to_string().bold());
        for change in &file.changes {
            let _ = writeln!(out, "  {:>5} {}", change.line, change.before.red());
            let _ = writeln!(out, "  {:>5} {}", "", change.after.green());
        }
    }

    let verb = if report.dry_run { "would rewrite" } else { "rewrote" };
    let _ = writeln!(
        out,
        "{} {} include(s) in {} of {} file(s)",
        verb,
        report.total_changes(),
        report.files.len(),
        report.files_scanned
    );
    out
}
