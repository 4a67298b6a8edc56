// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::config::consts::WHITELIST_TABLE;

/// A query the pipeline issues against the warehouse.
///
/// Queries are typed so in-process executors can evaluate them directly;
/// `Display` renders the SQL a remote warehouse client would send.
///
/// # Example
/// ```
/// use spacejar::warehouse::Query;
///
/// let query = Query::transaction_counts("ethereum", "erc20_network");
/// assert_eq!(
///     query.to_string(),
///     "SELECT count(*) AS tx_count, asset_id, partition_date \
///      FROM ethereum.erc20_network GROUP BY asset_id, partition_date"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Every non-model whitelist row: `asset_id, chain_id, name, symbol`.
    Whitelist,
    /// Transaction counts grouped by `(asset_id, partition_date)` for one ledger.
    TransactionCounts {
        schema: String,
        network_table: String,
    },
}

impl Query {
    pub fn whitelist() -> Self {
        Query::Whitelist
    }

    pub fn transaction_counts(schema: &str, network_table: &str) -> Self {
        Query::TransactionCounts {
            schema: schema.to_string(),
            network_table: network_table.to_string(),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Query::Whitelist => "whitelist",
            Query::TransactionCounts { .. } => "transaction_counts",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Whitelist => write!(
                f,
                "SELECT asset_id, chain_id, name, symbol FROM {} WHERE is_model = false",
                WHITELIST_TABLE
            ),
            Query::TransactionCounts {
                schema,
                network_table,
            } => write!(
                f,
                "SELECT count(*) AS tx_count, asset_id, partition_date \
                 FROM {}.{} GROUP BY asset_id, partition_date",
                schema, network_table
            ),
        }
    }
}
