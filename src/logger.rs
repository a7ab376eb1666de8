//! Logger setup
//!
//! Installs a `fern` dispatch behind the `log` facade. Lines look like
//! `[12:00:00.000 INFO sqlkit::service] message` and go to stderr, plus an
//! optional file.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use log::LevelFilter;

use crate::config::LoggingConfig;

/// Parse a level name such as `"debug"` (case-insensitive).
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| anyhow!("Invalid log level '{}'", level))
}

/// Install the global logger. Does nothing when logging is disabled.
///
/// # Errors
/// Fails on an invalid level, an unwritable log file, or when a global
/// logger is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(parse_level(&config.level)?)
        .chain(std::io::stderr());

    if let Some(path) = &config.file {
        let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().map_err(|e| anyhow!("Failed to install logger: {}", e))
}
