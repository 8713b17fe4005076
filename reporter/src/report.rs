use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::chart::ChartArtifact;
use crate::error::ReportError;
use crate::model::Summary;
use crate::output::write_atomically;

pub const REPORT_FILE_NAME: &str = "report.md";
pub const REPORT_TITLE: &str = "JMeter Test Report";

#[derive(Tabled)]
struct SummaryTableRow<'a> {
    label: Cow<'a, str>,
    #[tabled(display = "float2")]
    avg_response_time: f64,
    #[tabled(display = "float2")]
    p90_response_time: f64,
    #[tabled(display = "float2")]
    max_response_time: f64,
    successes: usize,
    failures: usize,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

/// Escape the Markdown cell separator, the table style does not.
fn escape_cell(text: &str) -> Cow<'_, str> {
    if text.contains('|') {
        Cow::Owned(text.replace('|', "\\|"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Render the summary as a Markdown table, one row per label in summary order.
pub fn summary_table(summary: &Summary) -> String {
    let rows = summary
        .iter()
        .map(|(label, row)| SummaryTableRow {
            label: escape_cell(label),
            avg_response_time: row.avg_response_time,
            p90_response_time: row.p90_response_time,
            max_response_time: row.max_response_time,
            successes: row.successes,
            failures: row.failures,
        })
        .collect::<Vec<_>>();

    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table.to_string()
}

/// Compose the Markdown report: title, summary table, then one section per chart in the given
/// order.
pub fn render_report(summary: &Summary, charts: &[ChartArtifact]) -> String {
    let mut out = format!("# {REPORT_TITLE}\n\n");
    out.push_str("## Summary Table\n\n");
    out.push_str(&summary_table(summary));
    out.push_str("\n\n");

    for chart in charts {
        out.push_str(&format!("## {}\n\n", chart.title));
        out.push_str(&format!("![{0}]({0})\n\n", chart.file_name));
    }

    out
}

/// Write `report.md` into `output_dir`, replacing any previous report.
pub fn assemble(
    summary: &Summary,
    charts: &[ChartArtifact],
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let content = render_report(summary, charts);

    let path = write_atomically(output_dir, REPORT_FILE_NAME, |path| {
        std::fs::write(path, &content).map_err(|e| ReportError::io(path, e))?;
        Ok(())
    })
    .context("Write report")?;
    log::info!("Wrote report {}", path.display());

    Ok(path)
}
