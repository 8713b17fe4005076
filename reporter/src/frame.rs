use std::path::Path;

use anyhow::Context;
use polars::prelude::*;

use crate::error::ReportError;
use crate::model::{
    Dataset, COL_ELAPSED, COL_LABEL, COL_SUCCESS, COL_TIMESTAMP, REQUIRED_COLUMNS,
};

/// Load a JMeter results log (CSV with header) into a normalised [`Dataset`].
///
/// Every column is read as text and the required ones are converted explicitly, so a value that
/// does not fit its column fails the load instead of turning into a null.
pub fn read_results(path: &Path) -> anyhow::Result<Dataset> {
    if !path.is_file() {
        return Err(ReportError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    // polars refuses a zero-byte CSV, which is just another empty log here
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if size == 0 {
        return Err(ReportError::EmptyInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    log::debug!(
        "Loaded {} rows with columns {:?} from {}",
        frame.height(),
        frame.get_column_names(),
        path.display()
    );

    if frame.height() == 0 {
        return Err(ReportError::EmptyInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    normalize(frame)
}

/// Convert a frame of text columns into a [`Dataset`].
pub(crate) fn normalize(mut frame: DataFrame) -> anyhow::Result<Dataset> {
    let present = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect::<Vec<_>>();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|&&name| !present.iter().any(|p| p == name))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ReportError::schema(format!("Missing required columns {missing:?}")).into());
    }

    let timestamps = parse_timestamps(&frame)?;
    let elapsed = parse_elapsed(&frame)?;
    let success = parse_success(&frame)?;

    frame.with_column(timestamps)?;
    frame.with_column(elapsed)?;
    frame.with_column(success)?;

    let blank_labels = frame
        .column(COL_LABEL)?
        .str()?
        .into_iter()
        .filter(|label| label.map_or(true, |l| l.trim().is_empty()))
        .count();
    if blank_labels > 0 {
        return Err(ReportError::schema(format!(
            "Column `{COL_LABEL}` has {blank_labels} missing values"
        ))
        .into());
    }

    Dataset::try_from_frame(frame)
}

fn parse_timestamps(frame: &DataFrame) -> anyhow::Result<Series> {
    let raw = frame.column(COL_TIMESTAMP)?.as_materialized_series();
    let millis = raw.strict_cast(&DataType::Int64).map_err(|e| {
        ReportError::schema(format!(
            "Column `{COL_TIMESTAMP}` must hold integer epoch milliseconds: {e}"
        ))
    })?;
    if millis.null_count() > 0 {
        return Err(ReportError::schema(format!(
            "Column `{COL_TIMESTAMP}` has {} missing values",
            millis.null_count()
        ))
        .into());
    }

    Ok(millis.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}

/// Response times are finite, non-negative durations in milliseconds.
fn parse_elapsed(frame: &DataFrame) -> anyhow::Result<Series> {
    let raw = frame.column(COL_ELAPSED)?.as_materialized_series();
    let elapsed = raw.strict_cast(&DataType::Float64).map_err(|e| {
        ReportError::schema(format!("Column `{COL_ELAPSED}` must be numeric: {e}"))
    })?;

    let invalid = elapsed
        .f64()?
        .into_iter()
        .enumerate()
        .find(|(_, value)| !value.is_some_and(|v| v.is_finite() && v >= 0.0));
    if let Some((row, value)) = invalid {
        let value = value.map_or_else(|| "missing".to_string(), |v| v.to_string());
        return Err(ReportError::schema(format!(
            "Invalid `{COL_ELAPSED}` value {value} in data row {}, expected a non-negative duration",
            row + 1
        ))
        .into());
    }

    Ok(elapsed)
}

/// JMeter writes the success flag as the literals `true` and `false`.
fn parse_success(frame: &DataFrame) -> anyhow::Result<Series> {
    let raw = frame.column(COL_SUCCESS)?.str()?;

    let values = raw
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            parse_success_flag(value).ok_or_else(|| {
                ReportError::schema(format!(
                    "Unrecognized `{COL_SUCCESS}` value {:?} in data row {}, expected `true` or `false`",
                    value.unwrap_or_default(),
                    row + 1
                ))
            })
        })
        .collect::<Result<Vec<bool>, _>>()?;

    Ok(Series::new(COL_SUCCESS.into(), values))
}

fn parse_success_flag(value: Option<&str>) -> Option<bool> {
    let value = value?.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
