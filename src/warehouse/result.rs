// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::QueryError;

/// One result row, keyed by column name.
///
/// Warehouses disagree on how they type integers and dates, so the accessors
/// accept the common encodings: ids as JSON numbers or numeric strings, dates
/// as `YYYY-MM-DD` or RFC 3339 timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(HashMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    fn require(&self, column: &str) -> Result<&Value, QueryError> {
        self.0
            .get(column)
            .ok_or_else(|| QueryError::malformed(column, "is missing"))
    }

    /// Integer column, accepting a JSON integer or a numeric string.
    pub fn i64(&self, column: &str) -> Result<i64, QueryError> {
        match self.require(column)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| QueryError::malformed(column, format!("is not an integer: {}", n))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| QueryError::malformed(column, format!("is not an integer: '{}'", s))),
            other => Err(QueryError::malformed(
                column,
                format!("is not an integer: {}", other),
            )),
        }
    }

    /// Non-negative count column.
    pub fn count(&self, column: &str) -> Result<u64, QueryError> {
        let value = self.i64(column)?;
        u64::try_from(value)
            .map_err(|_| QueryError::malformed(column, format!("is negative: {}", value)))
    }

    pub fn str(&self, column: &str) -> Result<&str, QueryError> {
        match self.require(column)? {
            Value::String(s) => Ok(s.as_str()),
            other => Err(QueryError::malformed(
                column,
                format!("is not a string: {}", other),
            )),
        }
    }

    /// Date column, accepting `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn date(&self, column: &str) -> Result<NaiveDate, QueryError> {
        let raw = self.str(column)?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.date_naive()))
            .map_err(|_| QueryError::malformed(column, format!("is not a date: '{}'", raw)))
    }
}

/// Rows returned by one query, plus what the warehouse charged for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub bytes_processed: u64,
}

impl QueryResult {
    pub fn new(rows: Vec<Row>, bytes_processed: u64) -> Self {
        Self {
            rows,
            bytes_processed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_encodings() {
        let row = Row::new()
            .with("number", 42)
            .with("string", " 17 ")
            .with("float", 1.5)
            .with("word", "abc");

        assert_eq!(row.i64("number").unwrap(), 42);
        assert_eq!(row.i64("string").unwrap(), 17);
        assert!(matches!(row.i64("float"), Err(QueryError::MalformedRow { .. })));
        assert!(matches!(row.i64("word"), Err(QueryError::MalformedRow { .. })));
    }

    #[test]
    fn test_missing_column_names_column() {
        let err = Row::new().i64("asset_id").unwrap_err();
        assert_eq!(
            err,
            QueryError::MalformedRow {
                column: "asset_id".to_string(),
                reason: "is missing".to_string(),
            }
        );
    }

    #[test]
    fn test_count_rejects_negative() {
        let row = Row::new().with("tx_count", -1);
        assert!(row.count("tx_count").is_err());
    }

    #[test]
    fn test_date_encodings() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let row = Row::new()
            .with("plain", "2024-03-01")
            .with("timestamp", "2024-03-01T00:00:00Z")
            .with("bad", "yesterday");

        assert_eq!(row.date("plain").unwrap(), expected);
        assert_eq!(row.date("timestamp").unwrap(), expected);
        assert!(row.date("bad").is_err());
    }
}
