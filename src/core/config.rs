//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.biblio/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::client::DEFAULT_BASE_URL;
use crate::catalog::query::DEFAULT_RESULT_LIMIT;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BiblioConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchConfig {
    pub debounce_ms: Option<u64>,
    pub result_limit: Option<u32>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub debounce_ms: u64,
    pub result_limit: u32,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.biblio/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".biblio").join("config.toml"))
}

/// Load config from `~/.biblio/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BiblioConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BiblioConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BiblioConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BiblioConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: BiblioConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Biblio Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [catalog]
# base_url = "https://www.googleapis.com/books/v1"   # Or set BIBLIO_BASE_URL

# [search]
# debounce_ms = 500      # Delay after the last keystroke before searching
# result_limit = 20      # Books per request
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` and `cli_limit` come from CLI flags (None = not specified).
pub fn resolve(
    config: &BiblioConfig,
    cli_base_url: Option<&str>,
    cli_limit: Option<u32>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("BIBLIO_BASE_URL").ok())
        .or_else(|| config.catalog.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Debounce: env → config → default
    let debounce_ms = std::env::var("BIBLIO_DEBOUNCE_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .or(config.search.debounce_ms)
        .unwrap_or(DEFAULT_DEBOUNCE_MS);

    // Result limit: CLI → config → default
    let result_limit = cli_limit
        .or(config.search.result_limit)
        .unwrap_or(DEFAULT_RESULT_LIMIT);

    ResolvedConfig {
        base_url,
        debounce_ms,
        result_limit,
    }
}
