//! Tests for validated configuration.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{Mode, Position, SourceConfig, ValidatedConfig};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["net-rewind"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

/// Helper to build a config from CLI args pointing at a throwaway API source
fn api_config(args: &[&str]) -> Result<ValidatedConfig, ConfigError> {
    let mut full_args = vec!["--url", "http://collector.local"];
    full_args.extend(args);
    ValidatedConfig::from_raw(&cli(&full_args), None)
}

mod mode_tests;
mod source_tests;
