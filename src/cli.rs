//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Normalize documentation code fragments and apply syntax highlighting
#[derive(Parser, Debug)]
#[command(name = "fraglight")]
#[command(about = "Rewrites generated documentation code fragments into clean, highlighted code blocks")]
#[command(version)]
pub struct Cli {
    /// Documentation HTML file or directory of generated pages
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Write the transformed tree here instead of rewriting in place
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Language tag written on normalized fragments (class="language-<TAG>")
    #[arg(long, default_value = "cpp", value_name = "TAG")]
    pub lang: String,

    /// CSS class that marks a code fragment container
    #[arg(long, default_value = "fragment", value_name = "CLASS")]
    pub fragment_class: String,

    /// CSS class that marks one source line inside a fragment
    #[arg(long, default_value = "line", value_name = "CLASS")]
    pub line_class: String,

    /// Skip the syntax highlighting pass
    #[arg(long)]
    pub no_highlight: bool,

    /// Run summary format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run summary output format
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON summary
    Json,
}
