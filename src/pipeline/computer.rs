// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::config::consts::CHAIN_TAG_KEY;
use crate::errors::QueryError;
use crate::pipeline::{MetricRow, SourceDescriptor};
use crate::scoring::Tags;
use crate::warehouse::{Query, QueryRunner};

/// Computes per-asset transaction dominance for a source.
pub struct MetricComputer {
    runner: QueryRunner,
}

impl MetricComputer {
    pub fn new(runner: QueryRunner) -> Self {
        Self { runner }
    }

    /// One row per `(asset, partition day)` present in the source's network
    /// table, valued at the asset's share of that day's transactions.
    ///
    /// Rows are ordered by `(partition_time, entity_id)` and tagged with the
    /// chain name. Missing days are not filled in.
    pub async fn compute_dominance(
        &self,
        descriptor: &SourceDescriptor,
    ) -> Result<Vec<MetricRow>, QueryError> {
        let query = Query::transaction_counts(&descriptor.schema_name, &descriptor.network_table);
        let result = self.runner.run(&query).await?;

        let mut counts = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            counts.push((
                row.date("partition_date")?,
                row.i64("asset_id")?,
                row.count("tx_count")?,
            ));
        }

        let mut metadata = Tags::new();
        metadata.insert(CHAIN_TAG_KEY.to_string(), descriptor.chain_name.clone());

        Ok(dominance_shares(counts)
            .into_iter()
            .map(|(partition_time, entity_id, value)| MetricRow {
                partition_time,
                entity_id,
                value,
                metadata: metadata.clone(),
            })
            .collect())
    }
}

/// Normalize raw `(day, entity, count)` triples into per-day shares.
///
/// Repeated `(day, entity)` pairs are summed first. Each day's shares sum to
/// 1.0, except a day whose total is zero, where every share is 0.0.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use spacejar::pipeline::dominance_shares;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let shares = dominance_shares(vec![(day, 2, 1), (day, 1, 3)]);
/// assert_eq!(shares, vec![(day, 1, 0.75), (day, 2, 0.25)]);
/// ```
pub fn dominance_shares<I>(counts: I) -> Vec<(NaiveDate, i64, f64)>
where
    I: IntoIterator<Item = (NaiveDate, i64, u64)>,
{
    // u128 sums so large warehouse counts cannot overflow.
    let mut grouped: BTreeMap<(NaiveDate, i64), u128> = BTreeMap::new();
    let mut totals: BTreeMap<NaiveDate, u128> = BTreeMap::new();
    for (day, entity, count) in counts {
        *grouped.entry((day, entity)).or_default() += u128::from(count);
        *totals.entry(day).or_default() += u128::from(count);
    }

    grouped
        .into_iter()
        .map(|((day, entity), count)| {
            let total = totals.get(&day).copied().unwrap_or(0);
            let share = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            (day, entity, share)
        })
        .collect()
}
