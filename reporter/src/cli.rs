use std::path::PathBuf;

use chrono::TimeDelta;
use clap::Parser;
use jtl_reporter::chart::font::find_system_font;
use jtl_reporter::config::{ReportConfig, DEFAULT_OUTPUT_DIR};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the JMeter results log (CSV with a header row).
    pub input: PathBuf,

    /// Directory to write the charts and `report.md` to. Created if missing.
    #[arg(short, long, env = "JTL_REPORT_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Width in seconds of the buckets of the error rate over time chart.
    #[arg(
        long,
        env = "JTL_REPORT_BUCKET_SECS",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub bucket_secs: u32,

    /// TrueType font to draw chart text with.
    ///
    /// Defaults to a common system sans-serif font. Without a font, charts are drawn without
    /// titles, axis labels and legends.
    #[arg(long, env = "JTL_REPORT_FONT")]
    pub font: Option<PathBuf>,

    /// Also write the summary table as JSON to this file.
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

impl CliArgs {
    pub fn into_config(self) -> ReportConfig {
        ReportConfig::default()
            .input(self.input)
            .output_dir(self.output_dir)
            .bucket_width(TimeDelta::seconds(i64::from(self.bucket_secs)))
            .font(self.font.or_else(find_system_font))
            .summary_json(self.summary_json)
    }
}
