//! Per-item activity aggregation.
//!
//! This module walks every site of the network once and records, for each
//! plugin or theme, how many sites have it active and which ones.

use crate::models::{Site, SiteId};
use crate::network::ItemProvider;
use std::collections::HashMap;
use tracing::{debug, info};

/// Active-site counts and site lists per item.
///
/// For every item, `count(item) == site_ids(item).len()` and no site id
/// appears twice in the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityTally {
    counts: HashMap<String, usize>,
    site_ids: HashMap<String, Vec<SiteId>>,
}

impl ActivityTally {
    /// Start a tally with every candidate at zero.
    pub fn with_candidates(candidates: &[String]) -> Self {
        let mut tally = Self::default();
        for item in candidates {
            tally.counts.entry(item.clone()).or_insert(0);
            tally.site_ids.entry(item.clone()).or_default();
        }
        tally
    }

    /// Record the active items of one site.
    ///
    /// Items that were not candidates get a fresh entry. A site counts at
    /// most once per item, whether it lists the item twice or is recorded
    /// twice.
    pub fn record_site(&mut self, site_id: SiteId, items: &[String]) {
        for item in items {
            let ids = self.site_ids.entry(item.clone()).or_default();
            if ids.contains(&site_id) {
                continue;
            }
            ids.push(site_id);
            *self.counts.entry(item.clone()).or_insert(0) += 1;
        }
    }

    /// Number of sites where `item` is active, if the item is known.
    #[cfg(test)]
    pub fn count(&self, item: &str) -> Option<usize> {
        self.counts.get(item).copied()
    }

    /// Sites where `item` is active, in enumeration order.
    pub fn site_ids(&self, item: &str) -> &[SiteId] {
        self.site_ids.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(item, count)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(item, count)| (item.as_str(), *count))
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.counts.len()
    }
}

/// Aggregate item activity over `sites`.
///
/// Sites are visited strictly in order; the provider restores any switched
/// context before the next site is entered. Site ids are expected to be
/// unique; a repeated site is visited again but never counted twice.
pub fn aggregate(
    sites: &[Site],
    candidates: &[String],
    provider: &mut ItemProvider<'_>,
) -> ActivityTally {
    let mut tally = ActivityTally::with_candidates(candidates);

    info!(
        "Aggregating active {} across {} sites",
        provider.kind(),
        sites.len()
    );

    for site in sites {
        provider.with_site_items(site.id, |items| {
            debug!("Site {} has {} active items", site.id, items.len());
            tally.record_site(site.id, items);
        });
    }

    debug!("Tally holds {} distinct items", tally.item_count());
    tally
}
