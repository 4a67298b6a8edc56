// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by the scoring runtime and by scoring sessions.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// The four column sequences passed to `update_score` differ in length.
    #[error(
        "Score update sequences differ in length: partition_time={partition_time}, \
         identifier={identifier}, value={value}, meta={meta}"
    )]
    Validation {
        partition_time: usize,
        identifier: usize,
        value: usize,
        meta: usize,
    },

    /// Writing, reading or decrypting stored data failed.
    #[error("Storage failure for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// A session configured to reject re-registration saw the same name twice.
    #[error("Subscore '{0}' is already registered in this session")]
    DuplicateSubscore(String),

    #[error("Unknown subscore handle {id} ('{name}')")]
    UnknownSubscore { id: u64, name: String },

    #[error("Scoring runtime is not running")]
    NotRunning,

    #[error("Scoring runtime is already running")]
    AlreadyRunning,

    /// A runtime call exceeded the session's inference timeout.
    #[error("Scoring runtime call '{operation}' timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl ScoringError {
    pub(crate) fn storage(key: &str, reason: impl Into<String>) -> Self {
        ScoringError::Storage {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
