// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use serde::Serialize;

use crate::scoring::Tags;

/// A chain source with its resolved asset universe.
///
/// Created by the `MetadataResolver` once per run and owned by the
/// orchestrator for that run. `asset_ids` is strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub chain_name: String,
    pub schema_name: String,
    pub network_table: String,
    pub ledger_table: String,
    pub quote_currency: String,
    pub asset_ids: Vec<i64>,
}

/// One metric value for an entity within a partition day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub partition_time: NaiveDate,
    pub entity_id: i64,
    pub value: f64,
    pub metadata: Tags,
}
