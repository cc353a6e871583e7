//! Usage analysis.
//!
//! Aggregation over the network followed by filtering and sorting.

pub mod aggregator;
pub mod filter;

pub use aggregator::aggregate;
pub use filter::build_report;

use crate::models::{FilterCriteria, ReportRow, Site};
use crate::network::ItemProvider;

/// Aggregate `sites` with `provider` and reduce the tally to report rows.
pub fn usage_rows(
    sites: &[Site],
    candidates: &[String],
    provider: &mut ItemProvider<'_>,
    criteria: &FilterCriteria,
) -> Vec<ReportRow> {
    let tally = aggregate(sites, candidates, provider);
    build_report(&tally, criteria)
}
