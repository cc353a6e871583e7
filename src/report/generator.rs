//! Report rendering.
//!
//! This module turns filtered report rows into a terminal table, a JSON
//! document or a Markdown table.

use crate::cli::OutputFormat;
use crate::models::{Report, ReportKind, ReportRow};
use anyhow::Result;
use serde_json::{json, Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render a report in the requested format.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    let columns = report.metadata.kind.columns();

    match format {
        OutputFormat::Table => Ok(render_table(&report.rows, &columns)),
        OutputFormat::Markdown => Ok(render_markdown(&report.rows, &columns)),
        OutputFormat::Json => generate_json_report(report),
    }
}

/// Render rows as a bordered table with the given column headings.
pub fn render_table(rows: &[ReportRow], columns: &[&str]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_string()));

    for row in rows {
        builder.push_record(row_cells(row));
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}

/// Render rows as a Markdown pipe table.
pub fn render_markdown(rows: &[ReportRow], columns: &[&str]) -> String {
    let mut output = String::new();

    output.push_str(&format!("| {} |\n", columns.join(" | ")));
    output.push_str("|:---|:---:|:---|\n");

    for row in rows {
        let [label, count, ids] = row_cells(row);
        output.push_str(&format!("| `{}` | {} | {} |\n", label, count, ids));
    }

    output
}

/// Generate a JSON report with metadata and one object per row.
pub fn generate_json_report(report: &Report) -> Result<String> {
    let rows: Vec<Value> = report
        .rows
        .iter()
        .map(|row| row_object(row, report.metadata.kind))
        .collect();

    let document = json!({
        "metadata": report.metadata,
        "rows": rows,
    });

    serde_json::to_string_pretty(&document).map_err(Into::into)
}

fn row_cells(row: &ReportRow) -> [String; 3] {
    [
        row.label.clone(),
        row.active_count.to_string(),
        row.site_ids_display(),
    ]
}

fn row_object(row: &ReportRow, kind: ReportKind) -> Value {
    let mut object = Map::new();
    object.insert(
        kind.item_label().to_lowercase(),
        Value::String(row.label.clone()),
    );
    object.insert("active_sites".to_string(), json!(row.active_count));
    object.insert("site_ids".to_string(), json!(row.site_ids_display()));
    Value::Object(object)
}
