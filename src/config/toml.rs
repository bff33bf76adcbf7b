//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Data source section
    #[serde(default)]
    pub source: SourceSection,

    /// Timeline window section
    #[serde(default)]
    pub timeline: TimelineSection,

    /// Device filter section
    #[serde(default)]
    pub filter: FilterSection,

    /// Watch mode section
    #[serde(default)]
    pub watch: WatchSection,
}

/// Data source section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    /// Base URL of the collector API
    pub url: Option<String>,

    /// Export file to read instead of the API
    pub file: Option<PathBuf>,

    /// HTTP headers as key-value pairs
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Bearer token for Authorization header
    pub bearer: Option<String>,
}

/// Timeline window section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineSection {
    /// Lookback window in hours
    pub hours: Option<u32>,
}

/// Device filter section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Regex patterns for devices to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Regex patterns for devices to exclude
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Watch mode section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Reload interval in seconds
    pub interval: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# net-rewind configuration file

[source]
# Base URL of the collector API (one of url/file is required)
# url = "http://127.0.0.1:5000"

# Export file to read instead of the API
# file = "network_history.json"

# HTTP headers sent with every API request
# [source.headers]
# X-Custom-Header = "value"

# Bearer token for Authorization header
# bearer = "your-token-here"

[timeline]
# Lookback window in hours (default: 24)
hours = 24

[filter]
# Regex patterns for devices to include (empty = all)
# Note: CLI patterns REPLACE these entirely (not merged)
# include = ["^core-", "^edge-"]

# Regex patterns for devices to exclude
# Note: CLI patterns REPLACE these entirely (not merged)
# exclude = ["-lab$"]

[watch]
# Reload interval in seconds (default: 30)
interval = 30
"#
    .to_string()
}
