// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while executing warehouse queries or reading their results.

use thiserror::Error;

/// Failure of a single query invocation.
///
/// Query errors are logged by the `QueryRunner` and handed back to the caller
/// unchanged. Nothing in the pipeline retries them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The executor or its transport failed.
    #[error("Query execution failed: {0}")]
    Execution(String),

    /// The query referenced a table the warehouse does not know about.
    #[error("Unknown table '{schema}.{table}'")]
    UnknownTable { schema: String, table: String },

    /// A result row is missing a column or holds a value of the wrong shape.
    #[error("Malformed row: column '{column}' {reason}")]
    MalformedRow { column: String, reason: String },
}

impl QueryError {
    pub(crate) fn malformed(column: &str, reason: impl Into<String>) -> Self {
        QueryError::MalformedRow {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
