//! Error types for xpi-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from an update run
    #[error(transparent)]
    Run(#[from] xpi_manifest::Error),

    /// Logging could not be initialised
    #[error("Could not initialise logging: {0}")]
    Logging(String),

    /// The command line was incomplete; usage has been printed
    #[error("{message}")]
    Usage { message: String },
}

impl CliError {
    /// Create a new usage error with the given message
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}
