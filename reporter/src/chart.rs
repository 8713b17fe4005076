use std::path::Path;

use anyhow::Context;
use chrono::TimeDelta;
use serde::Serialize;

use crate::error::ReportError;
use crate::model::Dataset;
use crate::output::{ensure_output_dir, write_atomically};

mod draw;
pub mod font;
pub mod plot;

pub use self::plot::{Plot, TimeSeries};

/// The fixed set of charts every report contains, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartKind {
    AvgResponseTimeByLabel,
    ErrorRateOverTime,
    ResponseTimeOverTimeByLabel,
    P90ResponseTimeByLabel,
    ErrorRatePie,
    ResponseCodeDistributionPie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::AvgResponseTimeByLabel,
        ChartKind::ErrorRateOverTime,
        ChartKind::ResponseTimeOverTimeByLabel,
        ChartKind::P90ResponseTimeByLabel,
        ChartKind::ErrorRatePie,
        ChartKind::ResponseCodeDistributionPie,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::AvgResponseTimeByLabel => "avg_response_time_by_label.png",
            ChartKind::ErrorRateOverTime => "error_rate_over_time.png",
            ChartKind::ResponseTimeOverTimeByLabel => "response_time_over_time_by_label.png",
            ChartKind::P90ResponseTimeByLabel => "p90_response_time_by_label.png",
            ChartKind::ErrorRatePie => "error_rate_pie.png",
            ChartKind::ResponseCodeDistributionPie => "response_code_distribution_pie.png",
        }
    }

    /// Title drawn on the chart and used as its section heading in the report.
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::AvgResponseTimeByLabel => "Avg Response Time By Label",
            ChartKind::ErrorRateOverTime => "Error Rate Over Time",
            ChartKind::ResponseTimeOverTimeByLabel => "Response Time Over Time By Label",
            ChartKind::P90ResponseTimeByLabel => "P90 Response Time By Label",
            ChartKind::ErrorRatePie => "Error Rate Pie",
            ChartKind::ResponseCodeDistributionPie => "Response Code Distribution Pie",
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            ChartKind::AvgResponseTimeByLabel => "Avg Response Time (ms)",
            ChartKind::ErrorRateOverTime => "Error Rate",
            ChartKind::ResponseTimeOverTimeByLabel => "Response Time (ms)",
            ChartKind::P90ResponseTimeByLabel => "P90 Response Time (ms)",
            ChartKind::ErrorRatePie | ChartKind::ResponseCodeDistributionPie => "",
        }
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> (u32, u32) {
        match self {
            ChartKind::ErrorRatePie => (600, 600),
            ChartKind::ResponseCodeDistributionPie => (800, 800),
            _ => (1200, 600),
        }
    }

    /// Derive the data this chart shows from the dataset.
    pub fn plot(&self, dataset: &Dataset, options: &RenderOptions) -> anyhow::Result<Plot> {
        match self {
            ChartKind::AvgResponseTimeByLabel => plot::avg_response_time_by_label(dataset),
            ChartKind::ErrorRateOverTime => {
                plot::error_rate_over_time(dataset, options.bucket_width)
            }
            ChartKind::ResponseTimeOverTimeByLabel => {
                plot::response_time_over_time_by_label(dataset)
            }
            ChartKind::P90ResponseTimeByLabel => plot::p90_response_time_by_label(dataset),
            ChartKind::ErrorRatePie => plot::error_rate_pie(dataset),
            ChartKind::ResponseCodeDistributionPie => plot::response_code_distribution_pie(dataset),
        }
    }
}

/// A chart image written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub file_name: String,
    pub title: String,
}

impl From<ChartKind> for ChartArtifact {
    fn from(kind: ChartKind) -> Self {
        Self {
            kind,
            file_name: kind.file_name().to_string(),
            title: kind.title().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Width of the buckets of the error rate over time chart.
    pub bucket_width: TimeDelta,
    /// Whether titles, axis labels and legends are drawn. Requires a registered font.
    pub draw_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bucket_width: TimeDelta::seconds(1),
            draw_text: false,
        }
    }
}

/// Derive and draw a single chart into `output_dir`, replacing any previous image.
pub fn render_chart(
    kind: ChartKind,
    dataset: &Dataset,
    options: &RenderOptions,
    output_dir: &Path,
) -> anyhow::Result<ChartArtifact> {
    let plot = kind
        .plot(dataset, options)
        .with_context(|| format!("Derive data for {}", kind.file_name()))?;

    let path = write_atomically(output_dir, kind.file_name(), |path| {
        draw::draw(kind, &plot, path, options.draw_text)
    })
    .with_context(|| format!("Draw {}", kind.file_name()))?;
    log::debug!("Wrote chart {}", path.display());

    Ok(kind.into())
}

/// Render every chart of [`ChartKind::ALL`] into `output_dir`, creating it if missing.
///
/// All charts are attempted even if some fail, the failures are then reported together as a
/// single [`ReportError::Render`]. Charts written before a failure are left in place.
pub fn render_all(
    dataset: &Dataset,
    options: &RenderOptions,
    output_dir: &Path,
) -> anyhow::Result<Vec<ChartArtifact>> {
    ensure_output_dir(output_dir)?;

    let total = ChartKind::ALL.len();
    let mut artifacts = Vec::with_capacity(total);
    let mut reasons = vec![];

    for kind in ChartKind::ALL {
        match render_chart(kind, dataset, options, output_dir) {
            Ok(artifact) => {
                log::info!("Rendered {}", artifact.file_name);
                artifacts.push(artifact);
            }
            Err(e) => {
                log::error!("Failed to render {}: {e:?}", kind.file_name());
                reasons.push(format!("{}: {e:#}", kind.file_name()));
            }
        }
    }

    if !reasons.is_empty() {
        return Err(ReportError::Render {
            failed: reasons.len(),
            total,
            reasons,
        }
        .into());
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::dataset;

    /// Title-case the stem of a file name, `error_rate_pie.png` becomes `Error Rate Pie`.
    fn title_from_file_name(file_name: &str) -> String {
        file_name
            .trim_end_matches(".png")
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_titles_match_file_names() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.title(), title_from_file_name(kind.file_name()));
        }
    }

    #[test]
    fn test_file_names_are_unique() {
        let mut names = ChartKind::ALL.map(|k| k.file_name()).to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ChartKind::ALL.len());
    }

    #[test]
    fn test_render_all_writes_every_chart() -> anyhow::Result<()> {
        let data = dataset(&[
            (1_700_000_000_000, 100., "A", "200", true),
            (1_700_000_000_400, 200., "A", "500", false),
            (1_700_000_002_100, 300., "B", "200", true),
        ]);
        let dir = tempfile::tempdir()?;

        let artifacts = render_all(&data, &RenderOptions::default(), dir.path())?;

        assert_eq!(
            artifacts.iter().map(|a| a.kind).collect::<Vec<_>>(),
            ChartKind::ALL.to_vec()
        );
        for artifact in &artifacts {
            let path = dir.path().join(&artifact.file_name);
            assert!(path.is_file(), "Missing {}", path.display());
            let header = std::fs::read(&path)?;
            assert_eq!(&header[..4], b"\x89PNG", "{} is not a PNG", artifact.file_name);
        }
        // no temporary files are left behind
        assert_eq!(std::fs::read_dir(dir.path())?.count(), ChartKind::ALL.len());

        Ok(())
    }

    #[test]
    fn test_render_all_creates_output_dir() -> anyhow::Result<()> {
        let data = dataset(&[(0, 1., "A", "200", true)]);
        let dir = tempfile::tempdir()?;
        let output_dir = dir.path().join("nested").join("output");

        let artifacts = render_all(&data, &RenderOptions::default(), &output_dir)?;

        assert_eq!(artifacts.len(), ChartKind::ALL.len());
        assert_eq!(std::fs::read_dir(&output_dir)?.count(), ChartKind::ALL.len());

        Ok(())
    }

    #[test]
    fn test_render_all_reports_failures() -> anyhow::Result<()> {
        let data = dataset(&[(0, 1., "A", "200", true)]);
        let dir = tempfile::tempdir()?;
        let options = RenderOptions {
            bucket_width: TimeDelta::zero(),
            ..RenderOptions::default()
        };

        let err = render_all(&data, &options, dir.path()).unwrap_err();

        let Some(ReportError::Render {
            failed,
            total,
            reasons,
        }) = crate::error::find_report_error(&err)
        else {
            panic!("Expected render error, got {err:?}");
        };
        assert_eq!(*failed, 1);
        assert_eq!(*total, 6);
        assert!(reasons[0].starts_with(ChartKind::ErrorRateOverTime.file_name()));
        // the other charts were still attempted and written
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 5);

        Ok(())
    }

    #[test]
    fn test_render_all_unwritable_output_dir() -> anyhow::Result<()> {
        let data = dataset(&[(0, 1., "A", "200", true)]);
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory")?;

        let err = render_all(&data, &RenderOptions::default(), &blocker.join("output"))
            .unwrap_err();

        assert!(matches!(
            crate::error::find_report_error(&err),
            Some(ReportError::Io { .. })
        ));

        Ok(())
    }
}
