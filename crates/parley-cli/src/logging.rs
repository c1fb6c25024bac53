use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(name: &str) -> Result<Level> {
    Level::from_str(name.trim()).map_err(|_| anyhow!("Invalid log level: {}", name))
}

/// Install the global subscriber. `RUST_LOG` directives still apply on top of `level`.
pub fn setup_logging(level: &str) -> Result<()> {
    let level = parse_level(level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
