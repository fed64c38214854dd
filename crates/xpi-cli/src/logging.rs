use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber that writes to stderr.
///
/// Uses the `RUST_LOG` environment variable when set, otherwise
/// `default_level`.
pub fn init(default_level: Level) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level.as_str().to_lowercase()))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
