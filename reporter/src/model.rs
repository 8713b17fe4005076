use std::collections::BTreeMap;

use anyhow::Context;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const COL_TIMESTAMP: &str = "timeStamp";
pub const COL_ELAPSED: &str = "elapsed";
pub const COL_LABEL: &str = "label";
pub const COL_RESPONSE_CODE: &str = "responseCode";
pub const COL_SUCCESS: &str = "success";

/// Columns every results log must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_TIMESTAMP,
    COL_ELAPSED,
    COL_LABEL,
    COL_RESPONSE_CODE,
    COL_SUCCESS,
];

/// A normalised load-test results log.
///
/// Wraps a [`DataFrame`] whose required columns have been validated and converted:
///
/// - `timeStamp`: `Datetime(Milliseconds)`
/// - `elapsed`: `Float64`
/// - `label`, `responseCode`: `String`
/// - `success`: `Boolean`
///
/// A [`Dataset`] is only built by [`crate::frame::read_results`] or [`Dataset::try_from_frame`],
/// both of which guarantee `label`, `elapsed`, `success` and `timeStamp` are non-null.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Wrap an already normalised frame, checking the column types and null invariants.
    pub fn try_from_frame(frame: DataFrame) -> anyhow::Result<Self> {
        let expected = [
            (
                COL_TIMESTAMP,
                DataType::Datetime(TimeUnit::Milliseconds, None),
            ),
            (COL_ELAPSED, DataType::Float64),
            (COL_LABEL, DataType::String),
            (COL_RESPONSE_CODE, DataType::String),
            (COL_SUCCESS, DataType::Boolean),
        ];

        for (name, dtype) in expected {
            let column = frame
                .column(name)
                .map_err(|_| crate::ReportError::schema(format!("Missing column `{name}`")))?;
            if column.dtype() != &dtype {
                return Err(crate::ReportError::schema(format!(
                    "Column `{name}` has type {}, expected {dtype}",
                    column.dtype()
                ))
                .into());
            }
            if name != COL_RESPONSE_CODE && column.null_count() > 0 {
                return Err(crate::ReportError::schema(format!(
                    "Column `{name}` has {} missing values",
                    column.null_count()
                ))
                .into());
            }
        }

        Ok(Self { frame })
    }

    /// Wrap a row subset of an existing [`Dataset`], which keeps its schema and invariants.
    pub(crate) fn from_subset(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn labels(&self) -> anyhow::Result<Vec<&str>> {
        Ok(self
            .frame
            .column(COL_LABEL)?
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    pub fn elapsed(&self) -> anyhow::Result<Vec<f64>> {
        Ok(self
            .frame
            .column(COL_ELAPSED)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    pub fn success(&self) -> anyhow::Result<Vec<bool>> {
        Ok(self
            .frame
            .column(COL_SUCCESS)?
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    /// Request start times as milliseconds since the Unix epoch.
    pub fn timestamps_ms(&self) -> anyhow::Result<Vec<i64>> {
        let physical = self
            .frame
            .column(COL_TIMESTAMP)?
            .as_materialized_series()
            .cast(&DataType::Int64)
            .context("Timestamp to epoch milliseconds")?;

        Ok(physical
            .i64()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    pub fn response_codes(&self) -> anyhow::Result<Vec<Option<&str>>> {
        Ok(self
            .frame
            .column(COL_RESPONSE_CODE)?
            .str()?
            .into_iter()
            .collect())
    }
}

/// Per-label response time figures, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub avg_response_time: f64,
    pub p90_response_time: f64,
    pub max_response_time: f64,
    pub successes: usize,
    pub failures: usize,
}

impl SummaryRow {
    pub fn requests(&self) -> usize {
        self.successes + self.failures
    }
}

/// Summary rows keyed by label, in label order.
pub type Summary = BTreeMap<String, SummaryRow>;
