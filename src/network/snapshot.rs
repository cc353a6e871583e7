//! Snapshot-backed network.
//!
//! A snapshot is a JSON or TOML export of a network: installed plugins and
//! themes plus, per site, its active plugins and active theme.

use super::{PluginHost, SiteDirectory, ThemeAuditor};
use crate::models::{Site, SiteId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One site as recorded in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Site identifier.
    pub id: SiteId,
    /// Home URL.
    #[serde(default)]
    pub url: String,
    /// Plugins activated on this site.
    #[serde(default)]
    pub active_plugins: Vec<String>,
    /// Stylesheet of the active theme.
    #[serde(default)]
    pub active_theme: Option<String>,
}

/// An exported network, usable as every network collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Whether the export came from a multisite installation.
    #[serde(default = "default_multisite")]
    pub multisite: bool,

    /// Installed plugin identifiers.
    #[serde(default)]
    pub installed_plugins: Vec<String>,

    /// Installed theme identifiers.
    #[serde(default)]
    pub installed_themes: Vec<String>,

    /// Sites in enumeration order. The first one is the main site.
    #[serde(default)]
    pub sites: Vec<SiteRecord>,

    /// Switched site contexts, innermost last.
    #[serde(skip)]
    context_stack: Vec<SiteId>,
}

fn default_multisite() -> bool {
    true
}

impl NetworkSnapshot {
    /// Load a snapshot file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        };
        let snapshot =
            parsed.with_context(|| format!("Failed to parse snapshot file: {}", path.display()))?;

        info!(
            "Loaded snapshot with {} sites, {} plugins, {} themes",
            snapshot.sites.len(),
            snapshot.installed_plugins.len(),
            snapshot.installed_themes.len()
        );

        Ok(snapshot)
    }

    /// Parse a JSON snapshot.
    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Parse a TOML snapshot.
    pub fn from_toml(content: &str) -> Result<Self> {
        let snapshot: Self = toml::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Site ids must be unique for per-item site lists to stay duplicate-free.
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for site in &self.sites {
            if !seen.insert(site.id) {
                bail!("Duplicate site id {} in snapshot", site.id);
            }
        }
        Ok(())
    }

    /// The site reads currently apply to.
    fn current_site_id(&self) -> Option<SiteId> {
        self.context_stack
            .last()
            .copied()
            .or_else(|| self.sites.first().map(|s| s.id))
    }

    fn site(&self, site_id: SiteId) -> Option<&SiteRecord> {
        self.sites.iter().find(|s| s.id == site_id)
    }
}

impl SiteDirectory for NetworkSnapshot {
    fn is_multisite(&self) -> bool {
        self.multisite
    }

    fn list_sites(&self) -> Vec<Site> {
        self.sites
            .iter()
            .map(|s| Site {
                id: s.id,
                url: s.url.clone(),
            })
            .collect()
    }

    fn installed_plugins(&self) -> Vec<String> {
        self.installed_plugins.clone()
    }

    fn installed_themes(&self) -> Vec<String> {
        self.installed_themes.clone()
    }
}

impl PluginHost for NetworkSnapshot {
    fn switch_to_site(&mut self, site_id: SiteId) {
        debug!("Switching to site {}", site_id);
        self.context_stack.push(site_id);
    }

    fn restore_current_site(&mut self) {
        self.context_stack.pop();
    }

    fn active_plugins(&self) -> Vec<String> {
        self.current_site_id()
            .and_then(|id| self.site(id))
            .map(|s| s.active_plugins.clone())
            .unwrap_or_default()
    }
}

impl ThemeAuditor for NetworkSnapshot {
    fn active_theme(&self, site_id: SiteId) -> Option<String> {
        self.site(site_id)
            .and_then(|s| s.active_theme.clone())
            .filter(|theme| !theme.is_empty())
    }
}
