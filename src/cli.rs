//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and the lenient numeric filters.

use crate::models::{OrderBy, ReportKind, SiteId};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// multisite-report - plugin and theme usage across a multisite network
///
/// Counts, for every installed plugin or theme, how many sites of the
/// network have it active and which ones.
///
/// Examples:
///   multisite-report --snapshot network.toml plugins
///   multisite-report --snapshot network.json plugins --order-by active-sites
///   multisite-report themes --min-active-sites 2 --format json
///   multisite-report plugins --site-id 4
///   multisite-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Report to generate
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Network snapshot file (JSON or TOML)
    ///
    /// Can also be set via MULTISITE_REPORT_SNAPSHOT or [network].snapshot
    /// in .multisite-report.toml.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "MULTISITE_REPORT_SNAPSHOT",
        global = true
    )]
    pub snapshot: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .multisite-report.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, markdown)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    ///
    /// "No matches" and "nothing installed" notices are written there too.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .multisite-report.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report types.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Active plugins across the network
    Plugins(FilterArgs),
    /// Active themes across the network
    Themes(FilterArgs),
}

/// Filters shared by every report.
///
/// Numeric filters are taken as raw text: a value that is not a
/// non-negative integer is ignored with a warning instead of failing.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Order rows by name or by number of active sites
    #[arg(long, value_name = "FIELD")]
    pub order_by: Option<OrderBy>,

    /// Only items active on at least this many sites
    #[arg(long, value_name = "COUNT", allow_hyphen_values = true)]
    pub min_active_sites: Option<String>,

    /// Only items active on at most this many sites
    #[arg(long, value_name = "COUNT", allow_hyphen_values = true)]
    pub max_active_sites: Option<String>,

    /// Only items active on this site
    #[arg(long, value_name = "ID", allow_hyphen_values = true)]
    pub site_id: Option<String>,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text table (default)
    #[default]
    Table,
    /// JSON document
    Json,
    /// Markdown table
    Markdown,
}

/// Parse a numeric filter, treating malformed input as absent.
fn lenient_number<T: FromStr>(flag: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring --{}: '{}' is not a valid number", flag, raw);
            None
        }
    }
}

impl FilterArgs {
    /// `None` when the flag was not given, `Some(None)` when it was given
    /// but could not be parsed.
    pub fn min_active_sites(&self) -> Option<Option<usize>> {
        self.min_active_sites
            .as_deref()
            .map(|raw| lenient_number("min-active-sites", raw))
    }

    /// Same convention as [`FilterArgs::min_active_sites`].
    pub fn max_active_sites(&self) -> Option<Option<usize>> {
        self.max_active_sites
            .as_deref()
            .map(|raw| lenient_number("max-active-sites", raw))
    }

    /// Site filter, if given and valid.
    pub fn site_id(&self) -> Option<SiteId> {
        self.site_id
            .as_deref()
            .and_then(|raw| lenient_number("site-id", raw))
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The requested report and its filters.
    pub fn report(&self) -> Option<(ReportKind, &FilterArgs)> {
        match &self.command {
            Some(Command::Plugins(filters)) => Some((ReportKind::Plugins, filters)),
            Some(Command::Themes(filters)) => Some((ReportKind::Themes, filters)),
            None => None,
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("A report is required: 'plugins' or 'themes'".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref snapshot) = self.snapshot {
            if !snapshot.is_file() {
                return Err(format!(
                    "Snapshot file does not exist: {}",
                    snapshot.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
