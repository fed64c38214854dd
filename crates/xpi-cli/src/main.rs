//! xpi-update CLI
//!
//! Adds a packaged extension version to an update manifest.

mod cli;
mod error;
mod logging;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::Cli;
use error::{CliError, Result};
use xpi_manifest::{LinkSource, RunSummary};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level()).map_err(|e| CliError::Logging(e.to_string()))?;

    let Some(options) = cli.run_options() else {
        let _ = Cli::command().print_long_help();
        return Err(CliError::usage("No extension package given"));
    };

    let summary = xpi_manifest::run(&options).await?;
    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    let link_origin = match &summary.link_source {
        LinkSource::Template => "template",
        LinkSource::Reused { .. } => "previous entry",
    };
    tracing::info!(
        addon = %summary.addon_id,
        hash = %summary.update_hash,
        link = %summary.update_link,
        link_origin,
        replaced = summary.replaced,
        signed = summary.signed,
        "Version {} ready",
        summary.version
    );
    tracing::debug!(
        addons = summary.manifest.addons.len(),
        written = ?summary.written,
        "Run finished"
    );
}
