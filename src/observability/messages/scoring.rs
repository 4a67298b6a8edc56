// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scoring sessions and runtime lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Scoring session opened (runtime started).
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use spacejar::observability::messages::scoring::SessionOpened;
/// use std::time::Duration;
///
/// let msg = SessionOpened {
///     policy: "Reuse",
///     timeout: Duration::from_millis(1000),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SessionOpened<'a> {
    pub policy: &'a str,
    pub timeout: Duration,
}

impl Display for SessionOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scoring session opened: subscore_policy={}, call_timeout={:?}",
            self.policy, self.timeout
        )
    }
}

impl StructuredLog for SessionOpened<'_> {
    fn log(&self) {
        tracing::info!(
            policy = self.policy,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "scoring_session",
            span_name = name,
            policy = self.policy,
            timeout = ?self.timeout,
        )
    }
}

/// Scoring session closed (runtime stopped).
///
/// # Log Level
/// `info!` - Important operational event
pub struct SessionClosed {
    pub duration: Duration,
}

impl Display for SessionClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scoring session closed after {:?}", self.duration)
    }
}

impl StructuredLog for SessionClosed {
    fn log(&self) {
        tracing::info!(duration_ms = self.duration.as_millis() as u64, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("session_closed", span_name = name, duration = ?self.duration)
    }
}

/// An open session was dropped without `close()`; release happens in the background.
///
/// # Log Level
/// `warn!` - Unexpected but recoverable
pub struct SessionDroppedOpen {
    pub background_release: bool,
}

impl Display for SessionDroppedOpen {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.background_release {
            write!(f, "Scoring session dropped while open; releasing runtime in the background")
        } else {
            write!(f, "Scoring session dropped while open outside a tokio runtime; runtime not released")
        }
    }
}

impl StructuredLog for SessionDroppedOpen {
    fn log(&self) {
        tracing::warn!(background_release = self.background_release, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "session_dropped_open",
            span_name = name,
            background_release = self.background_release,
        )
    }
}

/// Releasing the runtime failed.
///
/// # Log Level
/// `warn!` - The run outcome is already decided; this is reported alongside it
pub struct SessionReleaseFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for SessionReleaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to release scoring runtime: {}", self.error)
    }
}

impl StructuredLog for SessionReleaseFailed<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("session_release_failed", span_name = name, error = %self.error)
    }
}

/// Subscore registered (or an existing registration reused).
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use spacejar::observability::messages::scoring::SubscoreRegistered;
///
/// let msg = SubscoreRegistered {
///     name: "dominance",
///     id: 1,
///     reused: false,
/// };
///
/// assert_eq!(msg.to_string(), "Registered subscore 'dominance' with handle 1");
/// ```
pub struct SubscoreRegistered<'a> {
    pub name: &'a str,
    pub id: u64,
    pub reused: bool,
}

impl Display for SubscoreRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.reused {
            write!(f, "Reusing subscore '{}' with handle {}", self.name, self.id)
        } else {
            write!(f, "Registered subscore '{}' with handle {}", self.name, self.id)
        }
    }
}

impl StructuredLog for SubscoreRegistered<'_> {
    fn log(&self) {
        tracing::info!(name = self.name, id = self.id, reused = self.reused, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "subscore_registered",
            span_name = name,
            subscore = self.name,
            id = self.id,
        )
    }
}

/// Auxiliary blob stored.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct BlobStored<'a> {
    pub key: &'a str,
    pub bytes: usize,
    pub encrypted: bool,
}

impl Display for BlobStored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stored {} bytes under '{}' (encrypted={})",
            self.bytes, self.key, self.encrypted
        )
    }
}

impl StructuredLog for BlobStored<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            bytes = self.bytes,
            encrypted = self.encrypted,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("blob_stored", span_name = name, key = self.key, bytes = self.bytes)
    }
}

/// Runtime transitioned to running.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RuntimeStarted {
    pub max_memory: usize,
    pub max_concurrent_requests: usize,
}

impl Display for RuntimeStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scoring runtime started: max_memory={} bytes, max_concurrent_requests={}",
            self.max_memory, self.max_concurrent_requests
        )
    }
}

impl StructuredLog for RuntimeStarted {
    fn log(&self) {
        tracing::info!(
            max_memory = self.max_memory,
            max_concurrent_requests = self.max_concurrent_requests,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "runtime_started",
            span_name = name,
            max_memory = self.max_memory,
            max_concurrent_requests = self.max_concurrent_requests,
        )
    }
}

/// Runtime flushed and stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RuntimeStopped {
    pub subscores: usize,
    pub scores_stored: usize,
}

impl Display for RuntimeStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scoring runtime stopped: {} subscores, {} score values stored",
            self.subscores, self.scores_stored
        )
    }
}

impl StructuredLog for RuntimeStopped {
    fn log(&self) {
        tracing::info!(
            subscores = self.subscores,
            scores_stored = self.scores_stored,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "runtime_stopped",
            span_name = name,
            subscores = self.subscores,
            scores_stored = self.scores_stored,
        )
    }
}
