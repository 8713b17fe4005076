use anyhow::Context;

use crate::error::ReportError;
use crate::model::{Dataset, Summary, SummaryRow, COL_ELAPSED};
use crate::partition::partition_by_label;

/// Quantile used for the p90 figures of the summary table and the p90 chart.
pub const P90: f64 = 0.9;

/// Unrounded response time figures for one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    pub mean: f64,
    pub p90: f64,
    pub max: f64,
    pub successes: usize,
    pub failures: usize,
}

impl From<TimingStats> for SummaryRow {
    fn from(stats: TimingStats) -> Self {
        SummaryRow {
            avg_response_time: round2(stats.mean),
            p90_response_time: round2(stats.p90),
            max_response_time: round2(stats.max),
            successes: stats.successes,
            failures: stats.failures,
        }
    }
}

/// Group the records by label and compute the summary row of each group.
pub fn summarize(dataset: &Dataset) -> anyhow::Result<Summary> {
    Ok(timing_stats_by_label(dataset)?
        .into_iter()
        .map(|(label, stats)| (label, SummaryRow::from(stats)))
        .collect())
}

/// Unrounded [`TimingStats`] per label, in label order.
pub fn timing_stats_by_label(dataset: &Dataset) -> anyhow::Result<Vec<(String, TimingStats)>> {
    if dataset.is_empty() {
        return Err(ReportError::EmptyInput {
            path: "<dataset>".into(),
        }
        .into());
    }

    partition_by_label(dataset)?
        .into_iter()
        .map(|(label, partition)| {
            let stats = timing_stats(&partition)
                .with_context(|| format!("Timing stats for label {label}"))?;
            Ok((label, stats))
        })
        .collect()
}

/// Compute [`TimingStats`] over every record of a non-empty [`Dataset`].
pub fn timing_stats(dataset: &Dataset) -> anyhow::Result<TimingStats> {
    let elapsed = dataset
        .frame()
        .column(COL_ELAPSED)?
        .as_materialized_series();
    let mean = elapsed.mean().context("Mean")?;
    let max = elapsed
        .max::<f64>()
        .context("Max")?
        .context("Missing max")?;

    let mut values = dataset.elapsed()?;
    values.sort_by(f64::total_cmp);
    let p90 = percentile_sorted(&values, P90).context("Missing p90")?;

    let success = dataset.success()?;
    let successes = success.iter().filter(|&&s| s).count();

    Ok(TimingStats {
        mean,
        p90,
        max,
        successes,
        failures: success.len() - successes,
    })
}

/// Quantile `q` (0..=1) of `values` by linear interpolation between the closest order statistics.
///
/// Returns [`None`] when `values` is empty.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Round to two decimals for presentation.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
