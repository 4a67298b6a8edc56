// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for query execution and cost accounting.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Query finished and its cost was recorded.
///
/// # Log Level
/// `info!` when the runner is verbose, `debug!` otherwise
///
/// # Example
/// ```
/// use spacejar::observability::messages::query::QueryCompleted;
///
/// let msg = QueryCompleted {
///     query: "transaction_counts",
///     rows: 120,
///     gigabytes: 1.5,
///     verbose: true,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Query 'transaction_counts' returned 120 rows; equivalent in gigabytes: 1.50 GB"
/// );
/// ```
pub struct QueryCompleted<'a> {
    pub query: &'a str,
    pub rows: usize,
    pub gigabytes: f64,
    pub verbose: bool,
}

impl Display for QueryCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Query '{}' returned {} rows; equivalent in gigabytes: {:.2} GB",
            self.query, self.rows, self.gigabytes
        )
    }
}

impl StructuredLog for QueryCompleted<'_> {
    fn log(&self) {
        if self.verbose {
            tracing::info!(
                query = self.query,
                rows = self.rows,
                gigabytes = self.gigabytes,
                "{}", self
            );
        } else {
            tracing::debug!(
                query = self.query,
                rows = self.rows,
                gigabytes = self.gigabytes,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "query_completed",
            span_name = name,
            query = self.query,
            rows = self.rows,
            gigabytes = self.gigabytes,
        )
    }
}

/// Query execution failed; the error is propagated unchanged.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct QueryFailed<'a> {
    pub query: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for QueryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "An error occurred running query '{}': {}", self.query, self.error)
    }
}

impl StructuredLog for QueryFailed<'_> {
    fn log(&self) {
        tracing::error!(query = self.query, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "query_failed",
            span_name = name,
            query = self.query,
            error = %self.error,
        )
    }
}
