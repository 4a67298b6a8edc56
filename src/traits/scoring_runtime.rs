// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ScoringError;
use crate::scoring::{ModelConfig, ScoreUpdate, SubscoreHandle};

/// External scoring runtime the pipeline forwards metrics into.
///
/// Callers normally reach a runtime through a `ScoringSession`, which pairs
/// every `start` with exactly one `stop`.
#[async_trait]
pub trait ScoringRuntime: Send + Sync {
    /// Start the runtime with the given limits.
    async fn start(&self, config: &ModelConfig) -> Result<(), ScoringError>;

    /// Flush pending work and stop the runtime.
    async fn stop(&self) -> Result<(), ScoringError>;

    /// Register a named subscore stream, returning its handle.
    async fn register_subscore(&self, name: &str) -> Result<SubscoreHandle, ScoringError>;

    /// Store opaque auxiliary data, optionally encrypted at rest.
    async fn store_data(&self, key: &str, data: Vec<u8>, encrypt: bool)
        -> Result<(), ScoringError>;

    /// Read back stored data as plaintext.
    async fn retrieve_data(&self, key: &str) -> Result<Vec<u8>, ScoringError>;

    /// Append score values to a registered subscore.
    async fn update_score(
        &self,
        handle: &SubscoreHandle,
        updates: Vec<ScoreUpdate>,
    ) -> Result<(), ScoringError>;
}
