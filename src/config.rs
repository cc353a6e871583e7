//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.multisite-report.toml` files.

use crate::cli::{Args, OutputFormat};
use crate::models::{FilterCriteria, OrderBy, SiteId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".multisite-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Network source settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Report defaults.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Where the network is read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Path to the network snapshot file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

/// Default filters and ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Row ordering.
    #[serde(default)]
    pub order_by: OrderBy,

    /// Minimum number of active sites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_active_sites: Option<usize>,

    /// Maximum number of active sites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_active_sites: Option<usize>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given. A numeric filter that was given but
    /// could not be parsed clears the configured value.
    pub fn merge_with_args(&mut self, args: &Args) {
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(ref snapshot) = args.snapshot {
            self.network.snapshot = Some(snapshot.clone());
        }

        if let Some((_, filters)) = args.report() {
            if let Some(order_by) = filters.order_by {
                self.report.order_by = order_by;
            }
            if let Some(min) = filters.min_active_sites() {
                self.report.min_active_sites = min;
            }
            if let Some(max) = filters.max_active_sites() {
                self.report.max_active_sites = max;
            }
        }
    }

    /// Filter criteria from the merged report settings.
    pub fn filter_criteria(&self, site_id: Option<SiteId>) -> FilterCriteria {
        FilterCriteria {
            order_by: self.report.order_by,
            min_active_sites: self.report.min_active_sites,
            max_active_sites: self.report.max_active_sites,
            site_id,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
