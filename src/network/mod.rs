//! Access to the multisite network.
//!
//! The reporter never talks to the hosting platform directly. It goes
//! through the collaborator traits defined here, which are implemented by
//! [`NetworkSnapshot`] for snapshot files and by fakes in tests.

pub mod snapshot;

pub use snapshot::NetworkSnapshot;

use crate::models::{ReportKind, Site, SiteId};
use thiserror::Error;
use tracing::debug;

/// Conditions under which no report can be produced at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("This is not a multisite installation.")]
    NotMultisite,
    #[error("No sites found in the network.")]
    NoSites,
}

/// Enumerates sites and installed items.
pub trait SiteDirectory {
    /// Whether the installation is a multisite network.
    fn is_multisite(&self) -> bool;

    /// All sites in the network, in enumeration order. No limit applies.
    fn list_sites(&self) -> Vec<Site>;

    /// Every installed plugin identifier.
    fn installed_plugins(&self) -> Vec<String>;

    /// Every installed theme identifier.
    fn installed_themes(&self) -> Vec<String>;
}

/// Reads site-scoped plugin configuration under an ambient site context.
///
/// `switch_to_site` and `restore_current_site` mutate shared state and are
/// not reentrant. Callers should use [`enter_site_context`] rather than
/// calling them directly.
pub trait PluginHost {
    /// Make `site_id` the current site, remembering the previous one.
    fn switch_to_site(&mut self, site_id: SiteId);

    /// Return to the site that was current before the last switch.
    fn restore_current_site(&mut self);

    /// Active plugins of the current site.
    fn active_plugins(&self) -> Vec<String>;
}

/// Looks up the active theme of a site.
pub trait ThemeAuditor {
    fn active_theme(&self, site_id: SiteId) -> Option<String>;
}

/// A switched site context. Dropping it restores the previous site.
pub struct SiteContext<'a> {
    host: &'a mut dyn PluginHost,
    site_id: SiteId,
}

impl SiteContext<'_> {
    /// Active plugins of the site this context was entered for.
    pub fn active_plugins(&self) -> Vec<String> {
        self.host.active_plugins()
    }
}

impl Drop for SiteContext<'_> {
    fn drop(&mut self) {
        debug!("Restoring site context after site {}", self.site_id);
        self.host.restore_current_site();
    }
}

/// Switch the host to `site_id` for as long as the returned guard lives.
pub fn enter_site_context(host: &mut dyn PluginHost, site_id: SiteId) -> SiteContext<'_> {
    host.switch_to_site(site_id);
    SiteContext { host, site_id }
}

/// Strategy yielding the active items of one site.
pub enum ItemProvider<'a> {
    /// Active plugins, read under a switched site context.
    Plugins(&'a mut dyn PluginHost),
    /// The single active theme, looked up by site id.
    Themes(&'a dyn ThemeAuditor),
}

impl ItemProvider<'_> {
    /// The report kind this provider serves.
    pub fn kind(&self) -> ReportKind {
        match self {
            ItemProvider::Plugins(_) => ReportKind::Plugins,
            ItemProvider::Themes(_) => ReportKind::Themes,
        }
    }

    /// Hand the active items of `site_id` to `visit`.
    ///
    /// For plugins the site context stays switched while `visit` runs and
    /// is restored right after it returns, or while unwinding if it panics.
    pub fn with_site_items<R>(
        &mut self,
        site_id: SiteId,
        visit: impl FnOnce(&[String]) -> R,
    ) -> R {
        match self {
            ItemProvider::Plugins(host) => {
                let context = enter_site_context(&mut **host, site_id);
                let items = context.active_plugins();
                visit(&items)
            }
            ItemProvider::Themes(auditor) => {
                let items: Vec<String> = auditor.active_theme(site_id).into_iter().collect();
                visit(&items)
            }
        }
    }
}

/// Check the network preconditions and return its sites.
pub fn require_sites(directory: &dyn SiteDirectory) -> Result<Vec<Site>, NetworkError> {
    if !directory.is_multisite() {
        return Err(NetworkError::NotMultisite);
    }

    let sites = directory.list_sites();
    if sites.is_empty() {
        return Err(NetworkError::NoSites);
    }

    Ok(sites)
}

/// Candidate items for a report kind.
pub fn candidate_items(directory: &dyn SiteDirectory, kind: ReportKind) -> Vec<String> {
    match kind {
        ReportKind::Plugins => directory.installed_plugins(),
        ReportKind::Themes => directory.installed_themes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every context operation so pairing can be asserted.
    #[derive(Default)]
    struct RecordingHost {
        current: Vec<SiteId>,
        log: Vec<String>,
    }

    impl PluginHost for RecordingHost {
        fn switch_to_site(&mut self, site_id: SiteId) {
            self.current.push(site_id);
            self.log.push(format!("switch {}", site_id));
        }

        fn restore_current_site(&mut self) {
            self.current.pop();
            self.log.push("restore".to_string());
        }

        fn active_plugins(&self) -> Vec<String> {
            match self.current.last() {
                Some(id) => vec![format!("plugin-{}", id)],
                None => Vec::new(),
            }
        }
    }

    struct FixedThemes;

    impl ThemeAuditor for FixedThemes {
        fn active_theme(&self, site_id: SiteId) -> Option<String> {
            (site_id != 3).then(|| format!("theme-{}", site_id))
        }
    }

    struct Directory {
        multisite: bool,
        sites: Vec<Site>,
    }

    impl SiteDirectory for Directory {
        fn is_multisite(&self) -> bool {
            self.multisite
        }

        fn list_sites(&self) -> Vec<Site> {
            self.sites.clone()
        }

        fn installed_plugins(&self) -> Vec<String> {
            vec!["a".to_string()]
        }

        fn installed_themes(&self) -> Vec<String> {
            vec!["t".to_string()]
        }
    }

    #[test]
    fn test_context_restored_on_drop() {
        let mut host = RecordingHost::default();
        {
            let context = enter_site_context(&mut host, 7);
            assert_eq!(context.active_plugins(), vec!["plugin-7"]);
        }
        assert!(host.current.is_empty());
        assert_eq!(host.log, vec!["switch 7", "restore"]);
    }

    #[test]
    fn test_plugin_provider_restores_after_visit() {
        let mut host = RecordingHost::default();
        let mut provider = ItemProvider::Plugins(&mut host);

        let seen = provider.with_site_items(4, |items| items.to_vec());
        assert_eq!(seen, vec!["plugin-4"]);
        assert_eq!(provider.kind(), ReportKind::Plugins);

        drop(provider);
        assert_eq!(host.log, vec!["switch 4", "restore"]);
    }

    #[test]
    fn test_plugin_provider_restores_on_panic() {
        let mut host = RecordingHost::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut provider = ItemProvider::Plugins(&mut host);
            provider.with_site_items(2, |_| panic!("visit failed"));
        }));

        assert!(result.is_err());
        assert_eq!(host.log, vec!["switch 2", "restore"]);
    }

    #[test]
    fn test_theme_provider() {
        let auditor = FixedThemes;
        let mut provider = ItemProvider::Themes(&auditor);

        assert_eq!(provider.kind(), ReportKind::Themes);
        assert_eq!(
            provider.with_site_items(1, |items| items.to_vec()),
            vec!["theme-1"]
        );
        assert!(provider.with_site_items(3, |items| items.is_empty()));
    }

    #[test]
    fn test_require_sites() {
        let site = Site {
            id: 1,
            url: "https://example.com".to_string(),
        };

        let not_multisite = Directory {
            multisite: false,
            sites: vec![site.clone()],
        };
        assert_eq!(
            require_sites(&not_multisite),
            Err(NetworkError::NotMultisite)
        );

        let empty = Directory {
            multisite: true,
            sites: Vec::new(),
        };
        assert_eq!(require_sites(&empty), Err(NetworkError::NoSites));

        let ok = Directory {
            multisite: true,
            sites: vec![site.clone()],
        };
        assert_eq!(require_sites(&ok), Ok(vec![site]));
    }

    #[test]
    fn test_candidate_items() {
        let directory = Directory {
            multisite: true,
            sites: Vec::new(),
        };
        assert_eq!(candidate_items(&directory, ReportKind::Plugins), vec!["a"]);
        assert_eq!(candidate_items(&directory, ReportKind::Themes), vec!["t"]);
    }
}
