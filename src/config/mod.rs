//! Configuration layer for net-rewind.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`SourceConfig`], [`Mode`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The source is required and has no default. A CLI `--url` or `--input`
//! replaces whatever source the TOML file names. Within the TOML file,
//! setting both `source.url` and `source.file` is an error.
//!
//! For filter patterns (`include`, `exclude`), CLI patterns **replace** TOML
//! patterns entirely (not merged), includes and excludes independently.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command, KindArg};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{Mode, Position, SourceConfig, ValidatedConfig, write_default_config};
