// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::QueryError;
use crate::observability::messages::query::{QueryCompleted, QueryFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::QueryExecutor;
use crate::warehouse::{ByteAccounting, Query, QueryResult};

/// Runs queries through an executor and books their cost.
///
/// Every successful query appends one gigabyte sample to the shared
/// [`ByteAccounting`]. Failures are logged and returned unchanged; nothing
/// here retries.
#[derive(Clone)]
pub struct QueryRunner {
    executor: Arc<dyn QueryExecutor>,
    accounting: Arc<ByteAccounting>,
    verbose: bool,
}

impl QueryRunner {
    pub fn new(executor: Arc<dyn QueryExecutor>, accounting: Arc<ByteAccounting>) -> Self {
        Self {
            executor,
            accounting,
            verbose: false,
        }
    }

    /// Log per-query cost at info level instead of debug.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub async fn run(&self, query: &Query) -> Result<QueryResult, QueryError> {
        match self.executor.execute(query).await {
            Ok(result) => {
                let gigabytes = self.accounting.record(result.bytes_processed);
                QueryCompleted {
                    query: query.name(),
                    rows: result.rows.len(),
                    gigabytes,
                    verbose: self.verbose,
                }
                .log();
                Ok(result)
            }
            Err(error) => {
                QueryFailed {
                    query: query.name(),
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }
}
