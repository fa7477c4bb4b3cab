pub mod types;

use std::path::Path;

use crate::error::{ImportError, Result};
use types::Config;

pub const BROWSER_ENABLED_ENV: &str = "LISTING_IMPORT_BROWSER_ENABLED";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ImportError::Config(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    let config: Config = serde_yml::from_str(&content)?;
    Ok(config)
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(flag) = lookup(BROWSER_ENABLED_ENV) {
        config.browser.enabled = parse_flag(&flag);
    }
    if let Some(key) = lookup(GEMINI_API_KEY_ENV)
        && !key.trim().is_empty()
    {
        config.ai.api_key = Some(key.trim().to_string());
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
