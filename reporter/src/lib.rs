//! Turn a JMeter results log into per-label statistics, a fixed set of charts and a Markdown
//! report.
//!
//! The pipeline is: [`frame::read_results`] → ([`analyze::summarize`], [`chart::render_all`]) →
//! [`report::assemble`], orchestrated by [`generate_report`].

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

pub mod analyze;
pub mod chart;
pub mod config;
pub mod error;
pub mod frame;
pub mod model;
pub mod output;
pub mod partition;
pub mod report;

#[cfg(test)]
mod test_utils;

pub use self::config::ReportConfig;
pub use self::error::ReportError;

use crate::chart::{ChartArtifact, RenderOptions};
use crate::model::Summary;

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub records: usize,
    pub summary: Summary,
    pub charts: Vec<ChartArtifact>,
    pub report_path: PathBuf,
}

/// Run the whole pipeline for `config`.
///
/// Ingestion errors abort the run before the output directory is touched. Every chart is
/// attempted, and the report is only written when all of them succeeded.
pub fn generate_report(config: &ReportConfig) -> anyhow::Result<ReportOutput> {
    log::info!("Reading results from {}", config.input.display());
    let dataset = frame::read_results(&config.input).context("Read results")?;
    log::info!("Loaded {} records", dataset.len());

    let summary = analyze::summarize(&dataset).context("Summarize results")?;
    log::info!("Summarized {} labels", summary.len());

    let draw_text = match &config.font {
        Some(font) => match chart::font::register_font(font) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Charts will be drawn without text: {e:#}");
                false
            }
        },
        None => {
            log::warn!("No font configured, charts will be drawn without text");
            false
        }
    };
    let options = RenderOptions {
        bucket_width: config.bucket_width,
        draw_text,
    };

    let charts = chart::render_all(&dataset, &options, &config.output_dir)
        .context("Render charts")?;

    let report_path = report::assemble(&summary, &charts, &config.output_dir)?;

    if let Some(path) = &config.summary_json {
        let file = std::fs::File::create(path).map_err(|e| ReportError::io(path, e))?;
        serde_json::to_writer_pretty(file, &summary).context("Write summary JSON")?;
        log::info!("Wrote summary JSON {}", path.display());
    }

    Ok(ReportOutput {
        records: dataset.len(),
        summary,
        charts,
        report_path,
    })
}
