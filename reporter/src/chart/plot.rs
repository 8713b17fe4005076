//! Chart data, derived from a [`Dataset`] without any drawing concerns.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use anyhow::Context;
use chrono::TimeDelta;
use itertools::Itertools;

use crate::analyze::{percentile, P90};
use crate::model::{Dataset, COL_ELAPSED};
use crate::partition::partition_by_label;

/// Response code shown for records without one.
pub const UNKNOWN_RESPONSE_CODE: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    /// One bar per category, drawn in the given order.
    Bars(Vec<(String, f64)>),
    /// Lines over time, x values are epoch milliseconds.
    Lines(Vec<TimeSeries>),
    /// Pie slices, drawn in the given order.
    Pie(Vec<(String, f64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<(i64, f64)>,
}

/// Mean response time per label, ascending.
pub fn avg_response_time_by_label(dataset: &Dataset) -> anyhow::Result<Plot> {
    let bars = partition_by_label(dataset)?
        .into_iter()
        .map(|(label, partition)| {
            let mean = partition
                .frame()
                .column(COL_ELAPSED)?
                .as_materialized_series()
                .mean()
                .with_context(|| format!("Mean for label {label}"))?;
            Ok((label, mean))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Plot::Bars(sort_ascending(bars)))
}

/// 90th percentile response time per label, ascending.
pub fn p90_response_time_by_label(dataset: &Dataset) -> anyhow::Result<Plot> {
    let bars = partition_by_label(dataset)?
        .into_iter()
        .map(|(label, partition)| {
            let p90 = percentile(&partition.elapsed()?, P90)
                .with_context(|| format!("P90 for label {label}"))?;
            Ok((label, p90))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Plot::Bars(sort_ascending(bars)))
}

/// Ratio of failed to total requests per time bucket.
///
/// Buckets are aligned to multiples of `bucket_width` and the series spans every bucket from the
/// first to the last record, with a rate of zero where there are no records. A run of empty
/// buckets is represented by its first and last bucket only, so the series grows with the number
/// of records rather than the length of the run.
pub fn error_rate_over_time(dataset: &Dataset, bucket_width: TimeDelta) -> anyhow::Result<Plot> {
    let width = bucket_width.num_milliseconds();
    anyhow::ensure!(width > 0, "Bucket width must be positive, got {bucket_width}");

    let timestamps = dataset.timestamps_ms()?;
    let success = dataset.success()?;

    // (total, failed) per bucket index
    let mut buckets = BTreeMap::<i64, (usize, usize)>::new();
    for (timestamp, ok) in timestamps.iter().zip(success) {
        let counts = buckets.entry(timestamp.div_euclid(width)).or_default();
        counts.0 += 1;
        if !ok {
            counts.1 += 1;
        }
    }
    anyhow::ensure!(!buckets.is_empty(), "No records to bucket");

    let mut points = Vec::with_capacity(buckets.len() * 3);
    let mut previous: Option<i64> = None;
    for (&bucket, &(total, failed)) in &buckets {
        if let Some(previous) = previous {
            let (gap_start, gap_end) = (previous + 1, bucket - 1);
            if gap_start <= gap_end {
                points.push((gap_start * width, 0.0));
            }
            if gap_start < gap_end {
                points.push((gap_end * width, 0.0));
            }
        }
        points.push((bucket * width, failed as f64 / total as f64));
        previous = Some(bucket);
    }

    Ok(Plot::Lines(vec![TimeSeries {
        name: "error rate".to_string(),
        points,
    }]))
}

/// Response time of every request against its timestamp, one series per label.
pub fn response_time_over_time_by_label(dataset: &Dataset) -> anyhow::Result<Plot> {
    let series = partition_by_label(dataset)?
        .into_iter()
        .map(|(label, partition)| {
            let points = partition
                .timestamps_ms()?
                .into_iter()
                .zip(partition.elapsed()?)
                .sorted_by_key(|(timestamp, _)| *timestamp)
                .collect();
            Ok(TimeSeries {
                name: label,
                points,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Plot::Lines(series))
}

/// Successful against failed requests, in that order.
pub fn error_rate_pie(dataset: &Dataset) -> anyhow::Result<Plot> {
    let success = dataset.success()?;
    let successes = success.iter().filter(|&&s| s).count();
    let failures = success.len() - successes;

    Ok(Plot::Pie(vec![
        ("Success".to_string(), successes as f64),
        ("Failure".to_string(), failures as f64),
    ]))
}

/// Number of requests per response code, most frequent first.
pub fn response_code_distribution_pie(dataset: &Dataset) -> anyhow::Result<Plot> {
    let slices = dataset
        .response_codes()?
        .into_iter()
        .map(|code| code.unwrap_or(UNKNOWN_RESPONSE_CODE))
        .counts()
        .into_iter()
        .sorted_by_key(|&(code, count)| (Reverse(count), code))
        .map(|(code, count)| (code.to_string(), count as f64))
        .collect();

    Ok(Plot::Pie(slices))
}

/// Stable sort by value, so equal values keep their label order.
fn sort_ascending(mut bars: Vec<(String, f64)>) -> Vec<(String, f64)> {
    bars.sort_by(|a, b| a.1.total_cmp(&b.1));
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::dataset;

    fn two_label_dataset() -> Dataset {
        dataset(&[
            (1_000, 100., "A", "200", true),
            (2_000, 200., "A", "500", false),
            (3_000, 30., "B", "200", true),
        ])
    }

    #[test]
    fn test_avg_response_time_sorted_ascending() -> anyhow::Result<()> {
        let plot = avg_response_time_by_label(&two_label_dataset())?;

        assert_eq!(
            plot,
            Plot::Bars(vec![("B".to_string(), 30.0), ("A".to_string(), 150.0)])
        );

        Ok(())
    }

    #[test]
    fn test_p90_uses_unrounded_percentile() -> anyhow::Result<()> {
        let data = dataset(&[
            (0, 100., "slow", "200", true),
            (1, 200., "slow", "200", true),
            (2, 300., "slow", "200", true),
            (3, 400., "slow", "200", true),
            (4, 500., "slow", "200", true),
            (5, 1.005, "fast", "200", true),
        ]);

        let Plot::Bars(bars) = p90_response_time_by_label(&data)? else {
            panic!("Expected bars");
        };

        assert_eq!(bars[0], ("fast".to_string(), 1.005));
        assert_eq!(bars[1].0, "slow");
        assert!((bars[1].1 - 460.0).abs() < 1e-9);

        Ok(())
    }

    #[test]
    fn test_error_rate_over_time_buckets() -> anyhow::Result<()> {
        let data = dataset(&[
            (10_100, 1., "A", "200", true),
            (10_900, 1., "A", "500", false),
            (13_200, 1., "A", "500", false),
            (13_300, 1., "B", "200", true),
            (13_400, 1., "B", "200", true),
            (13_500, 1., "B", "200", true),
        ]);

        let plot = error_rate_over_time(&data, TimeDelta::seconds(1))?;

        let Plot::Lines(series) = plot else {
            panic!("Expected lines");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].points,
            vec![(10_000, 0.5), (11_000, 0.0), (12_000, 0.0), (13_000, 0.25)]
        );

        Ok(())
    }

    #[test]
    fn test_error_rate_over_time_without_failures_is_zero() -> anyhow::Result<()> {
        let data = dataset(&[
            (0, 1., "A", "200", true),
            (4_500, 1., "A", "200", true),
            (9_999, 1., "B", "200", true),
        ]);

        let Plot::Lines(series) = error_rate_over_time(&data, TimeDelta::seconds(1))? else {
            panic!("Expected lines");
        };

        assert_eq!(
            series[0].points,
            vec![
                (0, 0.0),
                (1_000, 0.0),
                (3_000, 0.0),
                (4_000, 0.0),
                (5_000, 0.0),
                (8_000, 0.0),
                (9_000, 0.0),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_error_rate_over_time_long_gap_stays_small() -> anyhow::Result<()> {
        // a few years apart at one second buckets
        let data = dataset(&[
            (1_600_000_000_000, 1., "A", "500", false),
            (1_700_000_000_000, 1., "A", "200", true),
        ]);

        let Plot::Lines(series) = error_rate_over_time(&data, TimeDelta::seconds(1))? else {
            panic!("Expected lines");
        };

        assert_eq!(
            series[0].points,
            vec![
                (1_600_000_000_000, 1.0),
                (1_600_000_001_000, 0.0),
                (1_699_999_999_000, 0.0),
                (1_700_000_000_000, 0.0),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_response_code_defaults_to_unknown() -> anyhow::Result<()> {
        let data = crate::test_utils::dataset_with_codes(&[
            (0, 1., "A", Some("200"), true),
            (1, 1., "A", None, false),
            (2, 1., "B", None, false),
        ]);

        let plot = response_code_distribution_pie(&data)?;

        assert_eq!(
            plot,
            Plot::Pie(vec![
                (UNKNOWN_RESPONSE_CODE.to_string(), 2.0),
                ("200".to_string(), 1.0),
            ])
        );

        Ok(())
    }

    #[test]
    fn test_error_rate_over_time_wider_buckets() -> anyhow::Result<()> {
        let data = dataset(&[
            (1_000, 1., "A", "500", false),
            (25_000, 1., "A", "200", true),
        ]);

        let Plot::Lines(series) = error_rate_over_time(&data, TimeDelta::seconds(10))? else {
            panic!("Expected lines");
        };

        assert_eq!(
            series[0].points,
            vec![(0, 1.0), (10_000, 0.0), (20_000, 0.0)]
        );

        Ok(())
    }

    #[test]
    fn test_error_rate_over_time_rejects_zero_width() {
        assert!(error_rate_over_time(&two_label_dataset(), TimeDelta::zero()).is_err());
    }

    #[test]
    fn test_response_time_over_time_chronological() -> anyhow::Result<()> {
        let data = dataset(&[
            (3_000, 30., "A", "200", true),
            (1_000, 10., "A", "200", true),
            (2_000, 20., "B", "200", true),
        ]);

        let plot = response_time_over_time_by_label(&data)?;

        assert_eq!(
            plot,
            Plot::Lines(vec![
                TimeSeries {
                    name: "A".to_string(),
                    points: vec![(1_000, 10.), (3_000, 30.)],
                },
                TimeSeries {
                    name: "B".to_string(),
                    points: vec![(2_000, 20.)],
                },
            ])
        );

        Ok(())
    }

    #[test]
    fn test_error_rate_pie_success_first() -> anyhow::Result<()> {
        let plot = error_rate_pie(&two_label_dataset())?;

        assert_eq!(
            plot,
            Plot::Pie(vec![
                ("Success".to_string(), 2.0),
                ("Failure".to_string(), 1.0)
            ])
        );

        Ok(())
    }

    #[test]
    fn test_response_code_distribution() -> anyhow::Result<()> {
        let data = dataset(&[
            (0, 1., "A", "500", false),
            (1, 1., "A", "200", true),
            (2, 1., "A", "404", false),
            (3, 1., "A", "200", true),
            (4, 1., "B", "302", true),
            (5, 1., "B", "200", true),
        ]);

        let plot = response_code_distribution_pie(&data)?;

        assert_eq!(
            plot,
            Plot::Pie(vec![
                ("200".to_string(), 3.0),
                ("302".to_string(), 1.0),
                ("404".to_string(), 1.0),
                ("500".to_string(), 1.0),
            ])
        );

        Ok(())
    }
}
