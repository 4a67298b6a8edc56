// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Warehouse side of the pipeline: the typed query model, result rows,
//! per-run byte accounting, the query runner and an in-memory executor.

mod accounting;
mod memory;
mod query;
mod result;
mod runner;

#[cfg(test)]
pub(crate) mod stub;

pub use accounting::ByteAccounting;
pub use memory::{
    InMemoryWarehouse, LedgerTable, TransferRecord, WarehouseFixture, WhitelistEntry,
    ROW_WIDTH_BYTES,
};
pub use query::Query;
pub use result::{QueryResult, Row};
pub use runner::QueryRunner;
