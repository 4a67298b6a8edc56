// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, OwnedSemaphorePermit, RwLock, Semaphore};

use crate::errors::ScoringError;
use crate::observability::messages::scoring::{RuntimeStarted, RuntimeStopped};
use crate::observability::messages::StructuredLog;
use crate::scoring::{
    BlobCipher, EventKind, ModelConfig, RuntimeEvent, RuntimeMetrics, RuntimeState, ScoreUpdate,
    SubscoreHandle, KEY_LEN,
};
use crate::traits::ScoringRuntime;

const EVENT_CHANNEL_CAPACITY: usize = 1000;

struct StoredBlob {
    bytes: Vec<u8>,
    encrypted: bool,
}

/// Limits and bookkeeping for the current start/stop cycle.
struct ActiveRun {
    config: ModelConfig,
    permits: Arc<Semaphore>,
    permit_count: u32,
    started_at: Instant,
}

/// In-process scoring runtime.
///
/// Implements the full [`ScoringRuntime`] contract in memory:
///
/// - **Lifecycle**: `Stopped -> Starting -> Running -> Stopping -> Stopped`.
///   Every data operation requires `Running`.
/// - **Subscores**: registration is idempotent at the runtime level; a name
///   always maps to the same handle for the runtime's lifetime.
/// - **Blobs**: optionally sealed with a [`BlobCipher`]; the total stored size
///   is capped by `ModelConfig::max_memory`.
/// - **Concurrency**: runtime calls hold one of `max_concurrent_requests`
///   semaphore permits while they run.
/// - **Events**: every operation is published on a broadcast channel.
pub struct InMemoryScoringRuntime {
    state: RwLock<RuntimeState>,
    active: RwLock<Option<ActiveRun>>,
    subscores: RwLock<HashMap<String, SubscoreHandle>>,
    next_subscore_id: AtomicU64,
    scores: RwLock<HashMap<u64, Vec<ScoreUpdate>>>,
    blobs: RwLock<HashMap<String, StoredBlob>>,
    cipher: BlobCipher,
    event_tx: broadcast::Sender<RuntimeEvent>,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
}

impl InMemoryScoringRuntime {
    /// Runtime with a randomly generated blob encryption key.
    pub fn new() -> Self {
        Self::with_cipher(BlobCipher::generate())
    }

    pub fn with_key(key: &[u8; KEY_LEN]) -> Self {
        Self::with_cipher(BlobCipher::new(key))
    }

    pub fn with_cipher(cipher: BlobCipher) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: RwLock::new(RuntimeState::Stopped),
            active: RwLock::new(None),
            subscores: RwLock::new(HashMap::new()),
            next_subscore_id: AtomicU64::new(1),
            scores: RwLock::new(HashMap::new()),
            blobs: RwLock::new(HashMap::new()),
            cipher,
            event_tx,
            start_count: AtomicUsize::new(0),
            stop_count: AtomicUsize::new(0),
        }
    }

    /// Subscribe to runtime events
    pub fn subscribe_events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.event_tx.subscribe()
    }

    pub async fn state(&self) -> RuntimeState {
        *self.state.read().await
    }

    /// Number of successful `start` calls
    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::SeqCst)
    }

    /// Number of successful `stop` calls
    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    /// Look up a registered subscore by name.
    pub async fn subscore(&self, name: &str) -> Option<SubscoreHandle> {
        self.subscores.read().await.get(name).cloned()
    }

    /// All values stored for a subscore, in arrival order.
    pub async fn scores(&self, handle: &SubscoreHandle) -> Vec<ScoreUpdate> {
        self.scores
            .read()
            .await
            .get(&handle.id)
            .cloned()
            .unwrap_or_default()
    }

    /// Raw stored bytes for a key, exactly as held at rest (sealed if encrypted).
    pub async fn raw_blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(key).map(|blob| blob.bytes.clone())
    }

    pub async fn metrics(&self) -> RuntimeMetrics {
        let uptime = self
            .active
            .read()
            .await
            .as_ref()
            .map(|run| run.started_at.elapsed())
            .unwrap_or(Duration::ZERO);

        RuntimeMetrics {
            state: self.state().await,
            subscores: self.subscores.read().await.len(),
            scores_stored: self.scores.read().await.values().map(Vec::len).sum(),
            bytes_stored: self.bytes_stored().await,
            uptime,
        }
    }

    async fn bytes_stored(&self) -> usize {
        self.blobs.read().await.values().map(|blob| blob.bytes.len()).sum()
    }

    /// Fail unless running; otherwise return the current run's limits.
    async fn ensure_running(&self) -> Result<(ModelConfig, Arc<Semaphore>), ScoringError> {
        if *self.state.read().await != RuntimeState::Running {
            return Err(ScoringError::NotRunning);
        }

        self.active
            .read()
            .await
            .as_ref()
            .map(|run| (run.config.clone(), Arc::clone(&run.permits)))
            .ok_or(ScoringError::NotRunning)
    }

    async fn acquire(&self) -> Result<(ModelConfig, OwnedSemaphorePermit), ScoringError> {
        let (config, permits) = self.ensure_running().await?;
        let permit = permits
            .acquire_owned()
            .await
            .map_err(|_| ScoringError::NotRunning)?;
        Ok((config, permit))
    }

    fn emit(&self, kind: EventKind, details: String) {
        // No subscribers is not an error.
        let _ = self.event_tx.send(RuntimeEvent::now(kind, details));
    }
}

impl Default for InMemoryScoringRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoringRuntime for InMemoryScoringRuntime {
    async fn start(&self, config: &ModelConfig) -> Result<(), ScoringError> {
        let mut state = self.state.write().await;
        if *state != RuntimeState::Stopped {
            return Err(ScoringError::AlreadyRunning);
        }

        *state = RuntimeState::Starting;
        // Limits above u32::MAX are clamped.
        let permit_count = u32::try_from(config.max_concurrent_requests).unwrap_or(u32::MAX);
        *self.active.write().await = Some(ActiveRun {
            config: config.clone(),
            permits: Arc::new(Semaphore::new(permit_count as usize)),
            permit_count,
            started_at: Instant::now(),
        });
        *state = RuntimeState::Running;
        self.start_count.fetch_add(1, Ordering::SeqCst);

        RuntimeStarted {
            max_memory: config.max_memory,
            max_concurrent_requests: config.max_concurrent_requests,
        }
        .log();
        self.emit(EventKind::SystemStatus, "Runtime started".to_string());
        Ok(())
    }

    async fn stop(&self) -> Result<(), ScoringError> {
        let mut state = self.state.write().await;
        if *state != RuntimeState::Running {
            return Err(ScoringError::NotRunning);
        }

        *state = RuntimeState::Stopping;
        let run = self.active.write().await.take();
        if let Some(run) = run {
            // Drain in-flight calls, then refuse new ones.
            let _drained = run.permits.acquire_many(run.permit_count).await;
            run.permits.close();
        }
        *state = RuntimeState::Stopped;
        self.stop_count.fetch_add(1, Ordering::SeqCst);

        RuntimeStopped {
            subscores: self.subscores.read().await.len(),
            scores_stored: self.scores.read().await.values().map(Vec::len).sum(),
        }
        .log();
        self.emit(EventKind::SystemStatus, "Runtime stopped".to_string());
        Ok(())
    }

    async fn register_subscore(&self, name: &str) -> Result<SubscoreHandle, ScoringError> {
        let (_config, _permit) = self.acquire().await?;

        let mut subscores = self.subscores.write().await;
        let handle = subscores
            .entry(name.to_string())
            .or_insert_with(|| SubscoreHandle {
                id: self.next_subscore_id.fetch_add(1, Ordering::SeqCst),
                name: name.to_string(),
            })
            .clone();

        self.emit(
            EventKind::SubscoreOperation,
            format!("Registered subscore {}", handle),
        );
        Ok(handle)
    }

    async fn store_data(
        &self,
        key: &str,
        data: Vec<u8>,
        encrypt: bool,
    ) -> Result<(), ScoringError> {
        let (config, _permit) = self.acquire().await?;

        let bytes = if encrypt {
            self.cipher.seal(key, &data)?
        } else {
            data
        };

        let mut blobs = self.blobs.write().await;
        let others: usize = blobs
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(_, blob)| blob.bytes.len())
            .sum();
        if others + bytes.len() > config.max_memory {
            return Err(ScoringError::storage(
                key,
                format!(
                    "storing {} bytes would exceed max_memory of {} bytes ({} in use)",
                    bytes.len(),
                    config.max_memory,
                    others
                ),
            ));
        }

        let stored = bytes.len();
        blobs.insert(key.to_string(), StoredBlob { bytes, encrypted: encrypt });
        drop(blobs);

        self.emit(
            EventKind::DataOperation,
            format!("Stored {} bytes with key {}", stored, key),
        );
        Ok(())
    }

    async fn retrieve_data(&self, key: &str) -> Result<Vec<u8>, ScoringError> {
        let (_config, _permit) = self.acquire().await?;

        let blobs = self.blobs.read().await;
        let blob = blobs
            .get(key)
            .ok_or_else(|| ScoringError::storage(key, "no data stored under this key"))?;

        if blob.encrypted {
            self.cipher.open(key, &blob.bytes)
        } else {
            Ok(blob.bytes.clone())
        }
    }

    async fn update_score(
        &self,
        handle: &SubscoreHandle,
        updates: Vec<ScoreUpdate>,
    ) -> Result<(), ScoringError> {
        let (_config, _permit) = self.acquire().await?;

        let known = self
            .subscores
            .read()
            .await
            .get(&handle.name)
            .map_or(false, |registered| registered.id == handle.id);
        if !known {
            return Err(ScoringError::UnknownSubscore {
                id: handle.id,
                name: handle.name.clone(),
            });
        }

        let count = updates.len();
        self.scores
            .write()
            .await
            .entry(handle.id)
            .or_default()
            .extend(updates);

        self.emit(
            EventKind::ScoreOperation,
            format!("Updated subscore {} with {} values", handle, count),
        );
        Ok(())
    }
}
