// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{serde::ts_seconds, DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Descriptive tags attached to a metric row or score update.
pub type Tags = BTreeMap<String, String>;

/// Handle to a subscore registered with the scoring runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SubscoreHandle {
    pub id: u64,
    pub name: String,
}

impl fmt::Display for SubscoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// One forwarded score value, as the runtime stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreUpdate {
    pub partition_time: NaiveDate,
    pub identifier: i64,
    pub value: f64,
    pub meta: Tags,
}

/// Lifecycle state of a scoring runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuntimeState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeState::Starting => "starting",
            RuntimeState::Running => "running",
            RuntimeState::Stopping => "stopping",
            RuntimeState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    SubscoreOperation,
    ScoreOperation,
    DataOperation,
    SystemStatus,
}

/// Runtime event published to subscribers
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeEvent {
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub details: String,
}

impl RuntimeEvent {
    pub fn now(kind: EventKind, details: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            details: details.into(),
        }
    }
}

/// Point-in-time runtime metrics
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeMetrics {
    pub state: RuntimeState,
    pub subscores: usize,
    pub scores_stored: usize,
    pub bytes_stored: usize,
    pub uptime: Duration,
}
