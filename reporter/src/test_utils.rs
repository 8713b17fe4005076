use polars::prelude::*;

use crate::model::*;

/// Build a [`Dataset`] from `(timestamp_ms, elapsed, label, response_code, success)` rows.
pub(crate) fn dataset(rows: &[(i64, f64, &str, &str, bool)]) -> Dataset {
    let rows = rows
        .iter()
        .map(|&(timestamp, elapsed, label, code, success)| {
            (timestamp, elapsed, label, Some(code), success)
        })
        .collect::<Vec<_>>();
    dataset_with_codes(&rows)
}

/// Like [`dataset`], but a row may lack its response code.
pub(crate) fn dataset_with_codes(rows: &[(i64, f64, &str, Option<&str>, bool)]) -> Dataset {
    let frame = df![
        COL_TIMESTAMP => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        COL_ELAPSED => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        COL_LABEL => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        COL_RESPONSE_CODE => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
        COL_SUCCESS => rows.iter().map(|r| r.4).collect::<Vec<_>>(),
    ]
    .unwrap()
    .lazy()
    .with_column(col(COL_TIMESTAMP).cast(DataType::Datetime(TimeUnit::Milliseconds, None)))
    .collect()
    .unwrap();

    Dataset::try_from_frame(frame).unwrap()
}
