//! CLI argument parsing using clap derive

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use xpi_manifest::RunOptions;

const NOTES: &str = "\
Notes:
  When using the --update-link option, you can use the placeholder @version@ to be \
replaced by the new add-on version string.

  If former versions already exist in the original update.json, all the extra \
parameters (e.g {\"applications\":{\"gecko\":{\"strict_min_version\":\"...\"}}}) \
from the latest version are re-used in the new entry.

  This is also the case for the update_link property, if not specified as command \
line parameter, with the version string being replaced in the url. For instance if \
a previous version \"1.0.1\" had update_link \"https://mysite.com/download?v=1.0.1\" \
and you add version \"1.0.2\" without specifying the update-link option, the new \
entry will automatically set update_link to \"https://mysite.com/download?v=1.0.2\".";

/// Add a packaged extension version to an update manifest
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "xpi-update")]
#[command(author, version, about, long_about = None, after_long_help = NOTES)]
pub struct Cli {
    /// Path to the packaged extension (.xpi)
    #[arg(value_name = "XPI")]
    pub archive: Option<PathBuf>,

    /// Path to the original update.json file
    #[arg(long, value_name = "PATH", env = "XPI_UPDATE_IN")]
    pub update_in: Option<PathBuf>,

    /// Path to the update.json file to be created
    #[arg(long, value_name = "PATH", env = "XPI_UPDATE_OUT")]
    pub update_out: Option<PathBuf>,

    /// Shortcut to specify both --update-in and --update-out
    #[arg(long, value_name = "PATH", env = "XPI_UPDATE")]
    pub update: Option<PathBuf>,

    /// Update link to download the new add-on version
    #[arg(long, value_name = "URL", env = "XPI_UPDATE_LINK")]
    pub update_link: Option<String>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the run inputs, or `None` when no package was given.
    ///
    /// Explicit `--update-in`/`--update-out` win over `--update`.
    pub fn run_options(&self) -> Option<RunOptions> {
        let archive = self.archive.clone()?;
        Some(RunOptions {
            archive,
            update_in: self.update_in.clone().or_else(|| self.update.clone()),
            update_out: self.update_out.clone().or_else(|| self.update.clone()),
            update_link: self.update_link.clone(),
        })
    }

    /// Default log level when `RUST_LOG` is not set.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}
