// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::QueryError;
use crate::warehouse::{Query, QueryResult};

/// External query engine or warehouse client.
///
/// The pipeline depends only on this signature. A remote client sends
/// `query.to_string()` (the rendered SQL) to its warehouse; an in-process
/// executor may evaluate the typed query directly.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query and return its rows together with the bytes it processed.
    async fn execute(&self, query: &Query) -> Result<QueryResult, QueryError>;
}
