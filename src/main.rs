//! fraglight CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fraglight::{
    Cli, DocumentOptions, FraglightError, OutputFormat, ProcessOptions, ProcessStats, Processor,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fraglight=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraglight=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> fraglight::Result<String> {
    // 1. Check input exists
    if !cli.input.exists() {
        return Err(FraglightError::FileNotFound {
            path: cli.input.display().to_string(),
        });
    }

    // 2. Validate transform configuration
    let document = DocumentOptions::new(
        &cli.lang,
        &cli.fragment_class,
        &cli.line_class,
        !cli.no_highlight,
    )?;

    // 3. Run the processor over the file or tree
    let processor = Processor::new(ProcessOptions {
        input: cli.input,
        output: cli.output,
        document,
    });
    let stats = processor.process()?;

    // 4. Render the run summary
    match cli.format {
        OutputFormat::Text => Ok(format_stats(&stats)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&stats)?),
    }
}

/// Human-readable run summary
fn format_stats(stats: &ProcessStats) -> String {
    let mut out = format!(
        "Scanned {} pages: {} rewritten, {} fragments normalized, {} blocks highlighted",
        stats.files_scanned,
        stats.files_rewritten,
        stats.fragments_normalized,
        stats.blocks_highlighted,
    );
    if stats.blocks_skipped > 0 {
        out.push_str(&format!(
            "\n{} blocks skipped (no grammar for: {})",
            stats.blocks_skipped,
            stats.unsupported_languages.join(", ")
        ));
    }
    if stats.files_failed > 0 {
        out.push_str(&format!("\n{} pages failed to process", stats.files_failed));
    }
    out
}
