// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::ScoringError;
use crate::observability::messages::scoring::{
    BlobStored, SessionClosed, SessionDroppedOpen, SessionOpened, SessionReleaseFailed,
    SubscoreRegistered,
};
use crate::observability::messages::StructuredLog;
use crate::pipeline::MetricRow;
use crate::scoring::{ModelConfig, ScoreUpdate, SubscoreHandle, SubscorePolicy, Tags};
use crate::traits::ScoringRuntime;

/// Opens scoped sessions against a scoring runtime.
pub struct ScoreForwarder {
    runtime: Arc<dyn ScoringRuntime>,
    config: ModelConfig,
    policy: SubscorePolicy,
}

impl ScoreForwarder {
    pub fn new(runtime: Arc<dyn ScoringRuntime>, config: ModelConfig) -> Self {
        Self {
            runtime,
            config,
            policy: SubscorePolicy::default(),
        }
    }

    /// How a session treats a subscore name registered twice.
    pub fn with_policy(mut self, policy: SubscorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start the runtime and hand back the session that owns it.
    ///
    /// The runtime is stopped when the session is closed. A session dropped
    /// while still open schedules the stop on the current tokio runtime.
    pub async fn open_session(&self) -> Result<ScoringSession, ScoringError> {
        let timeout = self.config.inference_timeout();
        bounded("start", timeout, self.runtime.start(&self.config)).await?;

        SessionOpened {
            policy: &format!("{:?}", self.policy),
            timeout,
        }
        .log();

        Ok(ScoringSession {
            runtime: Arc::clone(&self.runtime),
            policy: self.policy,
            timeout,
            handles: HashMap::new(),
            opened_at: Instant::now(),
            open: true,
        })
    }
}

/// A started scoring runtime, released exactly once.
///
/// Every runtime call made through the session is bounded by the configured
/// inference timeout.
pub struct ScoringSession {
    runtime: Arc<dyn ScoringRuntime>,
    policy: SubscorePolicy,
    timeout: Duration,
    handles: HashMap<String, SubscoreHandle>,
    opened_at: Instant,
    open: bool,
}

impl ScoringSession {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Register a subscore, applying the session's re-registration policy.
    pub async fn register_subscore(&mut self, name: &str) -> Result<SubscoreHandle, ScoringError> {
        if let Some(handle) = self.handles.get(name) {
            return match self.policy {
                SubscorePolicy::Reuse => {
                    SubscoreRegistered {
                        name,
                        id: handle.id,
                        reused: true,
                    }
                    .log();
                    Ok(handle.clone())
                }
                SubscorePolicy::Reject => Err(ScoringError::DuplicateSubscore(name.to_string())),
            };
        }

        let handle = bounded(
            "register_subscore",
            self.timeout,
            self.runtime.register_subscore(name),
        )
        .await?;

        SubscoreRegistered {
            name,
            id: handle.id,
            reused: false,
        }
        .log();
        self.handles.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    pub async fn store_blob(
        &self,
        key: &str,
        data: Vec<u8>,
        encrypt: bool,
    ) -> Result<(), ScoringError> {
        let bytes = data.len();
        bounded(
            "store_data",
            self.timeout,
            self.runtime.store_data(key, data, encrypt),
        )
        .await?;

        BlobStored {
            key,
            bytes,
            encrypted: encrypt,
        }
        .log();
        Ok(())
    }

    /// Read a stored blob back as plaintext.
    pub async fn retrieve_blob(&self, key: &str) -> Result<Vec<u8>, ScoringError> {
        bounded("retrieve_data", self.timeout, self.runtime.retrieve_data(key)).await
    }

    /// Forward `n` score values given as four parallel columns.
    ///
    /// All four columns must have the same length; a mismatch fails before the
    /// runtime is called. Returns the number of values forwarded.
    pub async fn update_score(
        &self,
        handle: &SubscoreHandle,
        partition_time: &[NaiveDate],
        identifier: &[i64],
        value: &[f64],
        meta: &[Tags],
    ) -> Result<usize, ScoringError> {
        let n = partition_time.len();
        if identifier.len() != n || value.len() != n || meta.len() != n {
            return Err(ScoringError::Validation {
                partition_time: n,
                identifier: identifier.len(),
                value: value.len(),
                meta: meta.len(),
            });
        }
        if n == 0 {
            return Ok(0);
        }

        let updates = partition_time
            .iter()
            .zip(identifier)
            .zip(value)
            .zip(meta)
            .map(|(((partition_time, identifier), value), meta)| ScoreUpdate {
                partition_time: *partition_time,
                identifier: *identifier,
                value: *value,
                meta: meta.clone(),
            })
            .collect();

        bounded(
            "update_score",
            self.timeout,
            self.runtime.update_score(handle, updates),
        )
        .await?;
        Ok(n)
    }

    /// Split metric rows into columns and forward them.
    pub async fn forward_rows(
        &self,
        handle: &SubscoreHandle,
        rows: &[MetricRow],
    ) -> Result<usize, ScoringError> {
        let partition_time: Vec<NaiveDate> = rows.iter().map(|r| r.partition_time).collect();
        let identifier: Vec<i64> = rows.iter().map(|r| r.entity_id).collect();
        let value: Vec<f64> = rows.iter().map(|r| r.value).collect();
        let meta: Vec<Tags> = rows.iter().map(|r| r.metadata.clone()).collect();

        self.update_score(handle, &partition_time, &identifier, &value, &meta)
            .await
    }

    /// Stop the runtime. The session is spent whether or not the stop succeeds.
    pub async fn close(mut self) -> Result<(), ScoringError> {
        self.open = false;
        bounded("stop", self.timeout, self.runtime.stop()).await?;

        SessionClosed {
            duration: self.opened_at.elapsed(),
        }
        .log();
        Ok(())
    }
}

impl Drop for ScoringSession {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let runtime = Arc::clone(&self.runtime);
                handle.spawn(async move {
                    if let Err(error) = runtime.stop().await {
                        SessionReleaseFailed { error: &error }.log();
                    }
                });
                SessionDroppedOpen {
                    background_release: true,
                }
                .log();
            }
            Err(_) => SessionDroppedOpen {
                background_release: false,
            }
            .log(),
        }
    }
}

async fn bounded<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, ScoringError>
where
    F: Future<Output = Result<T, ScoringError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ScoringError::Timeout { operation, timeout })?
}
