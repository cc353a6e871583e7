//! Data models for the multisite reporter.
//!
//! This module contains the core data structures shared by the
//! aggregation, filtering and rendering stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a site within the network.
pub type SiteId = u64;

/// A site as supplied by the site directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Unique site identifier.
    pub id: SiteId,
    /// Home URL of the site.
    #[serde(default)]
    pub url: String,
}

/// Which kind of item a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Active plugins per site
    Plugins,
    /// Active theme per site
    Themes,
}

impl ReportKind {
    /// Heading of the primary column ("Plugin" or "Theme").
    pub fn item_label(&self) -> &'static str {
        match self {
            ReportKind::Plugins => "Plugin",
            ReportKind::Themes => "Theme",
        }
    }

    /// Ordered column headings for rendered reports.
    pub fn columns(&self) -> [&'static str; 3] {
        [self.item_label(), "Active Sites", "Site IDs"]
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Plugins => write!(f, "plugins"),
            ReportKind::Themes => write!(f, "themes"),
        }
    }
}

/// Row ordering for reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OrderBy {
    /// Case-insensitive item name, ascending (default)
    #[default]
    Name,
    /// Number of active sites, descending
    ActiveSites,
}

/// Filters and ordering applied to the aggregated counts.
///
/// Every filter is optional; `None` means "not set", which is distinct
/// from a filter set to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Row ordering.
    pub order_by: OrderBy,
    /// Keep only items active on at least this many sites.
    pub min_active_sites: Option<usize>,
    /// Keep only items active on at most this many sites.
    pub max_active_sites: Option<usize>,
    /// Keep only items active on this site.
    pub site_id: Option<SiteId>,
}

/// One line of a usage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Plugin or theme identifier.
    pub label: String,
    /// Number of sites where the item is active.
    pub active_count: usize,
    /// Sites where the item is active, in enumeration order.
    pub site_ids: Vec<SiteId>,
}

impl ReportRow {
    /// Site ids joined with ", ", or `None` when the item is active nowhere.
    pub fn site_ids_display(&self) -> String {
        if self.site_ids.is_empty() {
            return "None".to_string();
        }

        self.site_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Metadata describing how a report was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Plugins or themes.
    pub kind: ReportKind,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of sites visited.
    pub sites_scanned: usize,
    /// Number of candidate items considered.
    pub candidates: usize,
    /// Filters in effect.
    pub criteria: FilterCriteria,
}

/// A filtered and sorted usage report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Rows in display order.
    pub rows: Vec<ReportRow>,
}
