//! Report generation and output.

pub mod generator;

pub use generator::render;

use crate::analysis;
use crate::cli::OutputFormat;
use crate::models::{FilterCriteria, Report, ReportKind, ReportMetadata};
use crate::network::{self, ItemProvider, NetworkSnapshot};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a report run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// A rendered report.
    Rendered(String),
    /// Every item was filtered out.
    NoMatches(ReportKind),
    /// Nothing of this kind is installed.
    NothingInstalled(ReportKind),
}

impl ReportOutcome {
    /// Text to write to the output target.
    pub fn into_text(self) -> String {
        match self {
            ReportOutcome::Rendered(output) => output,
            ReportOutcome::NoMatches(kind) => format!("No {} match the given filters.", kind),
            ReportOutcome::NothingInstalled(kind) => format!("No {} installed.", kind),
        }
    }
}

/// Run a report of `kind` against `snapshot`.
///
/// Fails with [`network::NetworkError`] when the snapshot is not a
/// multisite network or has no sites. An empty JSON report is still
/// rendered; other formats report [`ReportOutcome::NoMatches`].
pub fn generate(
    snapshot: &mut NetworkSnapshot,
    kind: ReportKind,
    criteria: FilterCriteria,
    format: OutputFormat,
) -> Result<ReportOutcome> {
    let sites = network::require_sites(&*snapshot)?;
    let candidates = network::candidate_items(&*snapshot, kind);

    if candidates.is_empty() {
        return Ok(ReportOutcome::NothingInstalled(kind));
    }

    debug!("Filter criteria: {:?}", criteria);

    let rows = {
        let mut provider = match kind {
            ReportKind::Plugins => ItemProvider::Plugins(&mut *snapshot),
            ReportKind::Themes => ItemProvider::Themes(&*snapshot),
        };
        analysis::usage_rows(&sites, &candidates, &mut provider, &criteria)
    };

    if rows.is_empty() {
        if format != OutputFormat::Json {
            return Ok(ReportOutcome::NoMatches(kind));
        }
        warn!("No {} match the given filters", kind);
    }

    let report = Report {
        metadata: ReportMetadata {
            kind,
            generated_at: Utc::now(),
            sites_scanned: sites.len(),
            candidates: candidates.len(),
            criteria,
        },
        rows,
    };

    Ok(ReportOutcome::Rendered(render(&report, format)?))
}

/// Write the outcome to `path`, or to stdout when no path is given.
///
/// Notices are written to the same target as reports, so a file given
/// with `--output` never keeps content from an earlier run.
pub fn write_output(outcome: ReportOutcome, path: Option<&Path>) -> Result<()> {
    let text = outcome.into_text();

    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", text))
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}
