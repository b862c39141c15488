//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Read, parse and validate an axis configuration file.
///
/// # Errors
///
/// [`ConfigError::IoError`] if the file cannot be read, otherwise whatever
/// [`parse_config`] reports.
///
/// # Example
///
/// ```rust,ignore
/// let config = axis_servo::load_config("axes.toml")?;
/// let theta = config.axis("theta").expect("theta configured");
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading axis configuration");

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(ConfigError::IoError(truncated(&e.to_string()))))?;

    let config = parse_config(&content)?;
    info!(
        path = %path.display(),
        axes = config.axes.len(),
        "axis configuration loaded"
    );
    Ok(config)
}

/// Parse and validate an axis configuration held in memory.
///
/// Every axis must pass [`validate_axis`](super::validate_axis); the first
/// offending axis aborts the whole configuration.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(e.message()))))?;

    super::validation::validate_config(&config)?;
    Ok(config)
}

/// Clip an error message to the fixed-size error string.
fn truncated(message: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in message.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
