//! Fixer configuration module.
//!
//! Handles loading, validating, and merging `dimfix.toml`. Stock defaults
//! are overridden by an optional `dimfix.toml` in the site root.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [scan]
//! extensions = ["html", "htm", "jsx", "tsx"]  # Markup files to inspect
//! skip_dirs = ["node_modules"]                 # Directory names never entered
//! skip_hidden = true                           # Skip .git, .cache, ...
//!
//! [report]
//! max_warnings = 10         # Undetermined images listed in the summary
//! preview_width = 80        # Tag previews are cut to this many characters
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [scan]
//! skip_dirs = ["node_modules", "vendor", "dist"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILENAME: &str = "dimfix.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Contents of `dimfix.toml`; every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixConfig {
    /// Which files are treated as pages and which directories are skipped.
    pub scan: ScanConfig,
    /// Summary and diff rendering.
    pub report: ReportConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl FixConfig {
    /// Checks that survive deserialization but make no sense to run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "scan.extensions must not be empty".into(),
            ));
        }
        if self
            .scan
            .extensions
            .iter()
            .any(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(
                "scan.extensions entries must be bare extensions like \"html\"".into(),
            ));
        }
        if self.report.preview_width < 10 {
            return Err(ConfigError::Validation(
                "report.preview_width must be at least 10".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Page discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// File extensions (case-insensitive, no dot) treated as markup pages.
    pub extensions: Vec<String>,
    /// Directory names that are never descended into.
    pub skip_dirs: Vec<String>,
    /// Skip directories whose name starts with a dot.
    pub skip_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["html", "htm", "jsx", "tsx"].map(String::from).to_vec(),
            skip_dirs: vec!["node_modules".to_string()],
            skip_hidden: true,
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// How many undetermined-image warnings the summary lists.
    pub max_warnings: usize,
    /// Tag previews in the diff are truncated to this many characters.
    pub preview_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_warnings: 10,
            preview_width: 80,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Parallel page workers. Unset means one per core; larger values are
    /// clamped to the core count.
    pub max_processes: Option<usize>,
}

/// Worker threads for the page pool: `max_processes` capped at the core count.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = available_cores();
    match config.max_processes {
        Some(n) => n.clamp(1, cores),
        None => cores,
    }
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

// =============================================================================
// Loading
// =============================================================================

/// Stock defaults as TOML, the bottom layer `dimfix.toml` is laid over.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(FixConfig::default()).expect("default config must serialize")
}

/// Lay `overlay` over `base`. Tables merge per key; any other value,
/// arrays included, replaces what was there.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base), toml::Value::Table(overlay)) => {
            overlay_table(&mut base, overlay);
            toml::Value::Table(base)
        }
        (_, overlay) => overlay,
    }
}

fn overlay_table(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(nested) if base.get(&key).is_some_and(toml::Value::is_table) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    overlay_table(existing, nested);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// `dimfix.toml` from `root` over the stock defaults, validated.
///
/// No file means defaults.
pub fn load_config(root: &Path) -> Result<FixConfig, ConfigError> {
    let mut merged = stock_defaults_value();
    if let Some(user) = read_config_file(&root.join(CONFIG_FILENAME))? {
        merged = merge_toml(merged, user);
    }
    let config: FixConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(toml::from_str(&text)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns a fully-commented stock `dimfix.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dimfix Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as dimfix.toml in the site root (the directory passed
# with --root). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page discovery
# ---------------------------------------------------------------------------
[scan]
# Markup file extensions to inspect (case-insensitive, without the dot).
extensions = ["html", "htm", "jsx", "tsx"]

# Directory names that are never descended into, at any depth.
skip_dirs = ["node_modules"]

# Skip directories whose name starts with a dot (.git, .cache, ...).
skip_hidden = true

# ---------------------------------------------------------------------------
# Report
# ---------------------------------------------------------------------------
[report]
# Number of "cannot read dimensions" warnings listed in the summary.
max_warnings = 10

# Old/new tag previews are truncated to this many characters.
preview_width = 80

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel page workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
