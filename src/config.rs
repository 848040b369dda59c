//! Converter configuration.
//!
//! Handles loading, validating, and merging `simple-ico.toml`. Every option
//! has a stock default, so the file is optional and may be sparse.
//!
//! ## Config File Location
//!
//! `--config <FILE>` wins. Otherwise `simple-ico.toml` next to the executable
//! is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [icon]
//! sizes = [16, 24, 32, 48, 64, 128, 256]  # Edge lengths, strictly ascending
//!
//! [input]
//! extensions = ["png"]      # Files picked up by batch mode
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{SizeLadder, supported_input_extensions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "simple-ico.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Converter configuration loaded from `simple-ico.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IcoConfig {
    /// Which sizes go into every icon.
    pub icon: IconConfig,
    /// Which files batch mode converts.
    pub input: InputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl IcoConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// The size ladder validates itself while deserializing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "input.extensions must not be empty".into(),
            ));
        }
        let supported = supported_input_extensions();
        for ext in &self.input.extensions {
            if !supported.iter().any(|s| s.eq_ignore_ascii_case(ext)) {
                return Err(ConfigError::Validation(format!(
                    "input.extensions: no decoder for '{ext}' (supported: {})",
                    supported.join(", ")
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Icon contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconConfig {
    /// Square edge lengths to embed, smallest first.
    pub sizes: SizeLadder,
}

/// Input selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Extensions (without the dot, case-insensitive) that batch mode and
    /// single-file mode accept.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png".to_string()],
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(IcoConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<IcoConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IcoConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Parse config text (sparse TOML) over the stock defaults.
pub fn parse_config(content: &str) -> Result<IcoConfig, ConfigError> {
    let value: toml::Value = toml::from_str(content)?;
    resolve_config(Some(value))
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<IcoConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load `simple-ico.toml` from `dir`, falling back to stock defaults when
/// the file does not exist.
pub fn load_config(dir: &Path) -> Result<IcoConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `simple-ico.toml`.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-ico configuration
# ========================
#
# Every key is optional. Remove anything you don't want to change.

[icon]
# Square edge lengths embedded in every icon, smallest first.
# Values must be strictly ascending and between 1 and 65535.
# Sizes of 256 and above are stored with a 0 in the directory, as the
# format requires.
sizes = [16, 24, 32, 48, 64, 128, 256]

[input]
# File extensions (case-insensitive, no dot) that are converted.
# Supported: png, jpg, jpeg, bmp, tif, tiff, webp
extensions = ["png"]

[processing]
# Maximum number of parallel workers. Omit to use every CPU core.
# max_processes = 4
"##
}
