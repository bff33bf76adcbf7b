//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use url::Url;

use crate::observation::{ObservationKind, Timestamp};
use crate::source::{FilterChain, NameRegexFilter};

use super::cli::{Cli, Command};
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Where observations are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// The collector HTTP API.
    Api {
        /// Base URL of the collector
        url: Url,
        /// Headers sent with every request
        headers: HeaderMap,
    },
    /// An export file.
    File(PathBuf),
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { url, headers } => write!(f, "api {url} ({} header(s))", headers.len()),
            Self::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Which instant `show` selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// The most recent instant of the window.
    Latest,
    /// An explicit index (0 = oldest).
    Index(usize),
    /// A slider position in percent.
    Percent(f64),
}

/// What the application does once configured.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Print the selection at one position.
    Show(Position),
    /// Compare two arbitrary instants through the source.
    Compare {
        /// Earlier instant
        first: Timestamp,
        /// Later instant
        second: Timestamp,
        /// Payload kind to compare
        kind: ObservationKind,
    },
    /// List known devices.
    Devices,
    /// Reload periodically and log changes at the latest instant.
    Watch {
        /// Reload interval
        interval: Duration,
    },
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show(Position::Latest) => f.write_str("show latest"),
            Self::Show(Position::Index(index)) => write!(f, "show index {index}"),
            Self::Show(Position::Percent(percent)) => write!(f, "show position {percent}%"),
            Self::Compare {
                first,
                second,
                kind,
            } => write!(f, "compare {kind} {first} -> {second}"),
            Self::Devices => f.write_str("devices"),
            Self::Watch { interval } => write!(f, "watch every {}s", interval.as_secs()),
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Data source (required)
    pub source: SourceConfig,

    /// Lookback window in hours
    pub hours: u32,

    /// Device filter
    pub filter: FilterChain,

    /// Selected command
    pub mode: Mode,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ source: {}, hours: {}, mode: {}, filters: {} include / {} exclude }}",
            self.source,
            self.hours,
            self.mode,
            self.filter.include_count(),
            self.filter.exclude_count(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No source is configured, or TOML configures both a URL and a file
    /// - URL is invalid or not http(s)
    /// - Regex patterns are invalid
    /// - `hours` or the watch interval is zero
    /// - The slider position is not finite
    /// - Header format is invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let source = Self::resolve_source(cli, toml)?;
        let hours = Self::resolve_hours(cli, toml)?;
        let filter = Self::build_filter(cli, toml)?;
        let mode = Self::resolve_mode(cli, toml)?;

        Ok(Self {
            source,
            hours,
            filter,
            mode,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_source(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SourceConfig, ConfigError> {
        // CLI takes precedence; clap already rejects --url with --input
        if let Some(ref path) = cli.input {
            return Ok(SourceConfig::File(path.clone()));
        }
        if let Some(ref url) = cli.url {
            return Ok(SourceConfig::Api {
                url: parse_url(url)?,
                headers: Self::resolve_headers(cli, toml)?,
            });
        }

        let section = toml.map(|t| &t.source);
        match (
            section.and_then(|s| s.url.as_deref()),
            section.and_then(|s| s.file.as_ref()),
        ) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSources),
            (Some(url), None) => Ok(SourceConfig::Api {
                url: parse_url(url)?,
                headers: Self::resolve_headers(cli, toml)?,
            }),
            (None, Some(path)) => Ok(SourceConfig::File(path.clone())),
            (None, None) => Err(ConfigError::missing(
                field::SOURCE,
                "Use --url or --input, or set source.url or source.file in config file",
            )),
        }
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        // Add TOML headers first (CLI can override)
        if let Some(toml) = toml {
            for (name, value) in &toml.source.headers {
                let header_name = parse_header_name(name)?;
                let header_value = parse_header_value(name, value)?;
                headers.insert(header_name, header_value);
            }
        }

        // Add CLI headers (override TOML)
        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            let header_name = parse_header_name(&name)?;
            let header_value = parse_header_value(&name, &value)?;
            headers.insert(header_name, header_value);
        }

        // Handle bearer token (CLI wins, then TOML)
        let bearer = cli
            .bearer
            .as_deref()
            .or_else(|| toml.and_then(|t| t.source.bearer.as_deref()));

        if let Some(token) = bearer {
            let auth_value = format!("Bearer {token}");
            let header_value = parse_header_value("Authorization", &auth_value)?;
            headers.insert(AUTHORIZATION, header_value);
        }

        Ok(headers)
    }

    fn resolve_hours(cli: &Cli, toml: Option<&TomlConfig>) -> Result<u32, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let hours = cli
            .hours
            .or_else(|| toml.and_then(|t| t.timeline.hours))
            .unwrap_or(defaults::HOURS);

        if hours == 0 {
            return Err(ConfigError::InvalidDuration {
                field: field::HOURS,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(hours)
    }

    fn build_filter(cli: &Cli, toml: Option<&TomlConfig>) -> Result<FilterChain, ConfigError> {
        // CLI patterns replace TOML patterns, includes and excludes independently
        let includes = if cli.include_devices.is_empty() {
            toml.map_or(&[][..], |t| t.filter.include.as_slice())
        } else {
            cli.include_devices.as_slice()
        };
        let excludes = if cli.exclude_devices.is_empty() {
            toml.map_or(&[][..], |t| t.filter.exclude.as_slice())
        } else {
            cli.exclude_devices.as_slice()
        };

        let mut chain = FilterChain::new();
        for pattern in includes {
            chain = chain.include(compile_pattern(pattern)?);
        }
        for pattern in excludes {
            chain = chain.exclude(compile_pattern(pattern)?);
        }

        Ok(chain)
    }

    fn resolve_mode(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Mode, ConfigError> {
        match cli.command {
            // `init` is handled before configuration is loaded
            None | Some(Command::Init { .. }) => Ok(Mode::Show(Position::Latest)),
            Some(Command::Show { index, position }) => {
                Ok(Mode::Show(resolve_position(index, position)?))
            }
            Some(Command::Compare {
                ref from,
                ref to,
                kind,
            }) => Ok(Mode::Compare {
                first: Timestamp::parse(from),
                second: Timestamp::parse(to),
                kind: kind.into(),
            }),
            Some(Command::Devices) => Ok(Mode::Devices),
            Some(Command::Watch { interval }) => Ok(Mode::Watch {
                interval: Self::resolve_watch_interval(interval, toml)?,
            }),
        }
    }

    fn resolve_watch_interval(
        cli_interval: Option<u64>,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli_interval
            .or_else(|| toml.and_then(|t| t.watch.interval))
            .unwrap_or(defaults::WATCH_INTERVAL_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: field::INTERVAL,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn resolve_position(index: Option<usize>, percent: Option<f64>) -> Result<Position, ConfigError> {
    match (index, percent) {
        (Some(index), _) => Ok(Position::Index(index)),
        (None, Some(value)) if !value.is_finite() => Err(ConfigError::InvalidPosition { value }),
        (None, Some(value)) => Ok(Position::Percent(value)),
        (None, None) => Ok(Position::Latest),
    }
}

fn parse_url(url_str: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: format!("unsupported scheme '{scheme}', expected http or https"),
        }),
    }
}

fn compile_pattern(pattern: &str) -> Result<NameRegexFilter, ConfigError> {
    NameRegexFilter::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source: e,
    })
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // Try "Key=Value" format first
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    // Try "Key: Value" format
    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::InvalidHeader {
        value: s.to_string(),
    })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
