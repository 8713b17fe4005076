use std::collections::BTreeMap;

use polars::prelude::{col, lit, IntoLazy, UniqueKeepStrategy};

use crate::model::{Dataset, COL_LABEL};

/// Partition the [`Dataset`] by the distinct values of the `label` column.
///
/// Returns one sub-[`Dataset`] per label as a [`BTreeMap`] keyed by the label, so iteration is in
/// label order. Rows keep their original relative order inside each partition.
pub fn partition_by_label(dataset: &Dataset) -> anyhow::Result<BTreeMap<String, Dataset>> {
    let frame = dataset.frame();
    let selectors = frame
        .clone()
        .lazy()
        .select([col(COL_LABEL)])
        .unique(Some(vec![COL_LABEL.to_string()]), UniqueKeepStrategy::Any)
        .collect()?;

    let mut partitioned = BTreeMap::new();
    for label in selectors.column(COL_LABEL)?.str()?.into_iter().flatten() {
        log::debug!("Partition for {COL_LABEL}={label}");

        let filtered = frame
            .clone()
            .lazy()
            .filter(col(COL_LABEL).eq(lit(label)))
            .collect()?;

        partitioned.insert(label.to_string(), Dataset::from_subset(filtered));
    }

    Ok(partitioned)
}
