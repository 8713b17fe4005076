use std::path::PathBuf;

use chrono::TimeDelta;

/// Default directory charts and the report are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Parameters of a report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// The JMeter results log to read.
    pub input: PathBuf,
    /// Directory the charts and `report.md` are written to. Created if missing.
    pub output_dir: PathBuf,
    /// Bucket width of the error rate over time chart.
    pub bucket_width: TimeDelta,
    /// TrueType font for chart text. Charts are drawn without text when unset.
    pub font: Option<PathBuf>,
    /// Also write the summary table as JSON to this path.
    pub summary_json: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            bucket_width: TimeDelta::seconds(1),
            font: None,
            summary_json: None,
        }
    }
}

impl ReportConfig {
    /// Builds a [`ReportConfig`] with the specified input file.
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Builds a [`ReportConfig`] with the specified output directory.
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Builds a [`ReportConfig`] with the specified error rate bucket width.
    pub fn bucket_width(mut self, bucket_width: TimeDelta) -> Self {
        self.bucket_width = bucket_width;
        self
    }

    /// Builds a [`ReportConfig`] with the specified chart font.
    pub fn font(mut self, font: Option<PathBuf>) -> Self {
        self.font = font;
        self
    }

    /// Builds a [`ReportConfig`] with the specified summary JSON path.
    pub fn summary_json(mut self, path: Option<PathBuf>) -> Self {
        self.summary_json = path;
        self
    }
}
