//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::observation::ObservationKind;

use super::defaults;

/// net-rewind: network time travel
///
/// Reconstructs past network states from collector snapshots and reports
/// what changed between them.
#[derive(Debug, Parser)]
#[command(name = "net-rewind")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: show the latest instant)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the collector API
    #[arg(long, global = true, conflicts_with = "input")]
    pub url: Option<String>,

    /// Read observations from an export file instead of the API
    #[arg(long, global = true, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V", global = true)]
    pub headers: Vec<String>,

    /// Bearer token for Authorization header
    #[arg(long, global = true)]
    pub bearer: Option<String>,

    /// Lookback window in hours
    #[arg(long, global = true)]
    pub hours: Option<u32>,

    /// Regex pattern for devices to include (can be specified multiple times)
    #[arg(long = "include-device", value_name = "PATTERN", global = true)]
    pub include_devices: Vec<String>,

    /// Regex pattern for devices to exclude (can be specified multiple times)
    #[arg(long = "exclude-device", value_name = "PATTERN", global = true)]
    pub exclude_devices: Vec<String>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for net-rewind
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the state and changes at one instant of the window
    Show {
        /// Index of the instant (0 = oldest)
        #[arg(long, conflicts_with = "position")]
        index: Option<usize>,

        /// Slider position in percent (0 = oldest, 100 = latest)
        #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
        position: Option<f64>,
    },

    /// Compare two arbitrary instants
    Compare {
        /// Earlier instant
        #[arg(long)]
        from: String,

        /// Later instant
        #[arg(long)]
        to: String,

        /// Payload kind to compare
        #[arg(long = "type", value_enum, default_value_t = KindArg::RoutingTable)]
        kind: KindArg,
    },

    /// List known devices
    Devices,

    /// Reload the window periodically and log new changes
    Watch {
        /// Reload interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

/// Observation kind argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Routing tables
    #[value(name = "routing_table")]
    RoutingTable,
    /// Interface tables
    #[value(name = "interfaces")]
    Interfaces,
    /// Connectivity probes
    #[value(name = "connectivity")]
    Connectivity,
}

impl From<KindArg> for ObservationKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::RoutingTable => Self::RoutingTable,
            KindArg::Interfaces => Self::Interfaces,
            KindArg::Connectivity => Self::Connectivity,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning clap's error on failure.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid or conflicting arguments.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
