//! Report filtering and ordering.

use super::aggregator::ActivityTally;
use crate::models::{FilterCriteria, OrderBy, ReportRow, SiteId};
use std::cmp::Ordering;
use tracing::debug;

/// Whether an item with `count` active sites passes the filters.
fn keep(count: usize, site_ids: &[SiteId], criteria: &FilterCriteria) -> bool {
    if criteria.min_active_sites.is_some_and(|min| count < min) {
        return false;
    }
    if criteria.max_active_sites.is_some_and(|max| count > max) {
        return false;
    }
    if let Some(site_id) = criteria.site_id {
        if !site_ids.contains(&site_id) {
            return false;
        }
    }
    true
}

/// Case-insensitive name order, falling back to the raw label so that
/// labels differing only in case still sort deterministically.
fn compare_names(a: &ReportRow, b: &ReportRow) -> Ordering {
    a.label
        .to_lowercase()
        .cmp(&b.label.to_lowercase())
        .then_with(|| a.label.cmp(&b.label))
}

/// Sort rows in place according to `order_by`.
///
/// Ties on active-site count are ordered by name.
pub fn sort_rows(rows: &mut [ReportRow], order_by: OrderBy) {
    match order_by {
        OrderBy::Name => rows.sort_by(compare_names),
        OrderBy::ActiveSites => rows.sort_by(|a, b| {
            b.active_count
                .cmp(&a.active_count)
                .then_with(|| compare_names(a, b))
        }),
    }
}

/// Apply `criteria` to the tally and return the surviving rows in order.
///
/// An empty result means nothing matched; it is not an error.
pub fn build_report(tally: &ActivityTally, criteria: &FilterCriteria) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = tally
        .iter()
        .filter(|(item, count)| keep(*count, tally.site_ids(item), criteria))
        .map(|(item, count)| ReportRow {
            label: item.to_string(),
            active_count: count,
            site_ids: tally.site_ids(item).to_vec(),
        })
        .collect();

    sort_rows(&mut rows, criteria.order_by);

    debug!(
        "{} of {} items matched the report filters",
        rows.len(),
        tally.item_count()
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sites 1:[A,B], 2:[B], 3:[] with candidates A, B, C.
    fn sample_tally() -> ActivityTally {
        let candidates: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let mut tally = ActivityTally::with_candidates(&candidates);
        tally.record_site(1, &["A".to_string(), "B".to_string()]);
        tally.record_site(2, &["B".to_string()]);
        tally.record_site(3, &[]);
        tally
    }

    fn labels(rows: &[ReportRow]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    fn criteria(
        min: Option<usize>,
        max: Option<usize>,
        site_id: Option<u64>,
        order_by: OrderBy,
    ) -> FilterCriteria {
        FilterCriteria {
            order_by,
            min_active_sites: min,
            max_active_sites: max,
            site_id,
        }
    }

    #[test]
    fn test_no_filters_by_name() {
        let rows = build_report(&sample_tally(), &FilterCriteria::default());

        assert_eq!(labels(&rows), vec!["A", "B", "C"]);
        assert_eq!(rows[0].active_count, 1);
        assert_eq!(rows[0].site_ids_display(), "1");
        assert_eq!(rows[1].active_count, 2);
        assert_eq!(rows[1].site_ids_display(), "1, 2");
        assert_eq!(rows[2].active_count, 0);
        assert_eq!(rows[2].site_ids_display(), "None");
    }

    #[test]
    fn test_order_by_active_sites() {
        let rows = build_report(
            &sample_tally(),
            &criteria(None, None, None, OrderBy::ActiveSites),
        );

        assert_eq!(labels(&rows), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_min_active_sites() {
        let rows = build_report(&sample_tally(), &criteria(Some(1), None, None, OrderBy::Name));

        assert_eq!(labels(&rows), vec!["A", "B"]);
    }

    #[test]
    fn test_max_active_sites() {
        let rows = build_report(&sample_tally(), &criteria(None, Some(1), None, OrderBy::Name));

        assert_eq!(labels(&rows), vec!["A", "C"]);
    }

    #[test]
    fn test_zero_is_a_real_filter() {
        let rows = build_report(&sample_tally(), &criteria(None, Some(0), None, OrderBy::Name));

        assert_eq!(labels(&rows), vec!["C"]);
    }

    #[test]
    fn test_site_id_filter() {
        let rows = build_report(&sample_tally(), &criteria(None, None, Some(2), OrderBy::Name));

        assert_eq!(labels(&rows), vec!["B"]);
        assert!(rows.iter().all(|r| r.site_ids.contains(&2)));
    }

    #[test]
    fn test_nothing_matches() {
        let rows = build_report(
            &sample_tally(),
            &criteria(Some(2), Some(1), Some(3), OrderBy::Name),
        );

        assert!(rows.is_empty());
    }

    #[test]
    fn test_name_order_is_case_insensitive() {
        let candidates: Vec<String> = ["beta", "Alpha", "gamma", "Delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let tally = ActivityTally::with_candidates(&candidates);

        let rows = build_report(&tally, &FilterCriteria::default());

        assert_eq!(labels(&rows), vec!["Alpha", "beta", "Delta", "gamma"]);
    }

    #[test]
    fn test_active_sites_ties_sorted_by_name() {
        let candidates: Vec<String> = ["zeta", "Eta", "theta"].iter().map(|s| s.to_string()).collect();
        let mut tally = ActivityTally::with_candidates(&candidates);
        tally.record_site(1, &candidates);
        tally.record_site(2, &["theta".to_string()]);

        let rows = build_report(&tally, &criteria(None, None, None, OrderBy::ActiveSites));

        assert_eq!(labels(&rows), vec!["theta", "Eta", "zeta"]);
    }

    #[test]
    fn test_filters_are_monotonic() {
        let tally = sample_tally();

        let mut previous = usize::MAX;
        for min in 0..4 {
            let len = build_report(&tally, &criteria(Some(min), None, None, OrderBy::Name)).len();
            assert!(len <= previous);
            previous = len;
        }

        let mut previous = usize::MAX;
        for max in (0..4).rev() {
            let len = build_report(&tally, &criteria(None, Some(max), None, OrderBy::Name)).len();
            assert!(len <= previous);
            previous = len;
        }
    }

    #[test]
    fn test_sort_rows_active_sites_non_increasing() {
        let rows = build_report(
            &sample_tally(),
            &criteria(None, None, None, OrderBy::ActiveSites),
        );

        assert!(rows
            .windows(2)
            .all(|pair| pair[0].active_count >= pair[1].active_count));
    }
}
