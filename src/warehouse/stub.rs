// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles for the warehouse side of the pipeline.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::QueryError;
use crate::traits::QueryExecutor;
use crate::warehouse::{
    InMemoryWarehouse, LedgerTable, Query, QueryResult, TransferRecord, WarehouseFixture,
    WhitelistEntry,
};

impl WarehouseFixture {
    /// Three chains with two whitelisted assets each over two days.
    ///
    /// Counts per day are uneven (3:1 then 1:1) so shares are not all 0.5.
    /// Each chain's whitelist rows include a duplicate id and a model asset.
    pub(crate) fn sample() -> Self {
        let chains: [(&str, &str, &str, i64); 3] = [
            ("ethereum", "ethereum", "erc20_network", 100),
            ("cardano", "prod_cardano", "gold_transfer_network", 200),
            ("polygon", "polygon", "erc20_network", 300),
        ];

        let mut whitelist = Vec::new();
        let mut tables = Vec::new();
        for (chain, schema, table, base) in chains {
            // Listed out of order and with a duplicate and a string id.
            whitelist.push(entry(Value::from(base + 2), chain, false));
            whitelist.push(entry(Value::from((base + 1).to_string()), chain, false));
            whitelist.push(entry(Value::from(base + 2), chain, false));
            whitelist.push(entry(Value::from(base + 9), chain, true));

            let day1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let day2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
            let transfers = [
                (base + 1, day1),
                (base + 1, day1),
                (base + 1, day1),
                (base + 2, day1),
                (base + 1, day2),
                (base + 2, day2),
            ]
            .into_iter()
            .map(|(asset_id, partition_date)| TransferRecord {
                asset_id,
                partition_date,
            })
            .collect();

            tables.push(LedgerTable {
                schema: schema.to_string(),
                table: table.to_string(),
                transfers,
            });
        }

        Self { whitelist, tables }
    }
}

fn entry(asset_id: Value, chain: &str, is_model: bool) -> WhitelistEntry {
    WhitelistEntry {
        asset_id,
        chain_id: chain.to_string(),
        name: format!("{} token", chain),
        symbol: chain.to_uppercase(),
        is_model,
    }
}

/// Executor that fails the `fail_on`-th (1-based) transaction count query and
/// delegates everything else to an in-memory warehouse.
pub(crate) struct FailingExecutor {
    inner: InMemoryWarehouse,
    fail_on: usize,
    count_queries: AtomicUsize,
}

impl FailingExecutor {
    pub(crate) fn new(fixture: WarehouseFixture, fail_on: usize) -> Self {
        Self {
            inner: InMemoryWarehouse::new(fixture),
            fail_on,
            count_queries: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, query: &Query) -> Result<QueryResult, QueryError> {
        if let Query::TransactionCounts { .. } = query {
            let seen = self.count_queries.fetch_add(1, Ordering::SeqCst) + 1;
            if seen == self.fail_on {
                return Err(QueryError::Execution(format!(
                    "warehouse unavailable on query {}",
                    seen
                )));
            }
        }
        self.inner.execute(query).await
    }
}
