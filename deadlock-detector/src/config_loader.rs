//! Loads a [`DetectorConfig`] from an optional TOML file, falling back to
//! defaults for any field the file omits.

use anyhow::{Context, Result};
use deadlock_core::DetectorConfig;
use std::path::Path;

pub fn load(path: Option<&Path>) -> Result<DetectorConfig> {
    let Some(path) = path else {
        return Ok(DetectorConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: DetectorConfig =
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(config)
}
