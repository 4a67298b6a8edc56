// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{ConfigurationError, QueryError};
use crate::traits::QueryExecutor;
use crate::warehouse::{Query, QueryResult, Row};

/// Bytes charged per scanned fixture row.
pub const ROW_WIDTH_BYTES: u64 = 64;

/// One row of the token whitelist.
///
/// `asset_id` is kept as a raw value so fixtures can reproduce warehouses that
/// return ids as numeric strings.
#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistEntry {
    pub asset_id: Value,
    pub chain_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub is_model: bool,
}

/// A single ledger transfer.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub asset_id: i64,
    pub partition_date: NaiveDate,
}

/// A ledger network table, addressed as `schema.table`.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerTable {
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

/// Warehouse contents for the in-memory executor.
///
/// # Example
/// ```yaml
/// whitelist:
///   - { asset_id: 101, chain_id: ethereum, name: Tether, symbol: USDT }
///   - { asset_id: "102", chain_id: ethereum, name: USD Coin, symbol: USDC }
/// tables:
///   - schema: ethereum
///     table: erc20_network
///     transfers:
///       - { asset_id: 101, partition_date: 2024-01-01 }
///       - { asset_id: 102, partition_date: 2024-01-01 }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseFixture {
    #[serde(default)]
    pub whitelist: Vec<WhitelistEntry>,
    #[serde(default)]
    pub tables: Vec<LedgerTable>,
}

impl WarehouseFixture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn table(&self, schema: &str, table: &str) -> Option<&LedgerTable> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.table == table)
    }
}

/// Fixture-backed [`QueryExecutor`] that evaluates the pipeline's two query
/// shapes directly instead of parsing SQL.
#[derive(Debug)]
pub struct InMemoryWarehouse {
    fixture: WarehouseFixture,
    executed: AtomicUsize,
}

impl InMemoryWarehouse {
    pub fn new(fixture: WarehouseFixture) -> Self {
        Self {
            fixture,
            executed: AtomicUsize::new(0),
        }
    }

    /// Number of queries executed so far, successful or not.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    fn whitelist(&self) -> QueryResult {
        let rows = self
            .fixture
            .whitelist
            .iter()
            .filter(|entry| !entry.is_model)
            .map(|entry| {
                Row::new()
                    .with("asset_id", entry.asset_id.clone())
                    .with("chain_id", entry.chain_id.as_str())
                    .with("name", entry.name.as_str())
                    .with("symbol", entry.symbol.as_str())
            })
            .collect();

        let scanned = self.fixture.whitelist.len() as u64;
        QueryResult::new(rows, scanned * ROW_WIDTH_BYTES)
    }

    fn transaction_counts(&self, schema: &str, table: &str) -> Result<QueryResult, QueryError> {
        let ledger = self
            .fixture
            .table(schema, table)
            .ok_or_else(|| QueryError::UnknownTable {
                schema: schema.to_string(),
                table: table.to_string(),
            })?;

        let mut counts: BTreeMap<(NaiveDate, i64), u64> = BTreeMap::new();
        for transfer in &ledger.transfers {
            *counts
                .entry((transfer.partition_date, transfer.asset_id))
                .or_default() += 1;
        }

        let rows = counts
            .into_iter()
            .map(|((date, asset_id), tx_count)| {
                Row::new()
                    .with("tx_count", tx_count)
                    .with("asset_id", asset_id)
                    .with("partition_date", date.format("%Y-%m-%d").to_string())
            })
            .collect();

        let scanned = ledger.transfers.len() as u64;
        Ok(QueryResult::new(rows, scanned * ROW_WIDTH_BYTES))
    }
}

#[async_trait]
impl QueryExecutor for InMemoryWarehouse {
    async fn execute(&self, query: &Query) -> Result<QueryResult, QueryError> {
        self.executed.fetch_add(1, Ordering::SeqCst);

        match query {
            Query::Whitelist => Ok(self.whitelist()),
            Query::TransactionCounts {
                schema,
                network_table,
            } => self.transaction_counts(schema, network_table),
        }
    }
}
