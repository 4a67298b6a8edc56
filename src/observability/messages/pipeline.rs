// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for orchestrator lifecycle and per-source progress.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Pipeline run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use spacejar::observability::messages::pipeline::PipelineStarted;
///
/// let msg = PipelineStarted {
///     chain_count: 3,
///     quote_in_usd: false,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PipelineStarted {
    pub chain_count: usize,
    pub quote_in_usd: bool,
}

impl Display for PipelineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting dominance pipeline: {} chains, quote_in_usd={}",
            self.chain_count, self.quote_in_usd
        )
    }
}

impl StructuredLog for PipelineStarted {
    fn log(&self) {
        tracing::info!(
            chain_count = self.chain_count,
            quote_in_usd = self.quote_in_usd,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_run",
            span_name = name,
            chain_count = self.chain_count,
            quote_in_usd = self.quote_in_usd,
        )
    }
}

/// Orchestrator moved between states.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct PipelineStateChanged<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for PipelineStateChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline state {} -> {}", self.from, self.to)
    }
}

impl StructuredLog for PipelineStateChanged<'_> {
    fn log(&self) {
        tracing::debug!(from = self.from, to = self.to, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pipeline_state", span_name = name, from = self.from, to = self.to)
    }
}

/// All source descriptors resolved.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SourcesResolved<'a> {
    pub chains: &'a [&'a str],
    pub asset_count: usize,
}

impl Display for SourcesResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Resolved {} sources [{}] covering {} whitelisted assets",
            self.chains.len(),
            self.chains.join(", "),
            self.asset_count
        )
    }
}

impl StructuredLog for SourcesResolved<'_> {
    fn log(&self) {
        tracing::info!(
            source_count = self.chains.len(),
            chains = %self.chains.join(","),
            asset_count = self.asset_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "sources_resolved",
            span_name = name,
            source_count = self.chains.len(),
            asset_count = self.asset_count,
        )
    }
}

/// One source's rows were forwarded to the scoring runtime.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use spacejar::observability::messages::pipeline::SourceForwarded;
///
/// let msg = SourceForwarded {
///     chain: "ethereum",
///     subscore: "dominance",
///     rows: 12,
/// };
///
/// assert_eq!(msg.to_string(), "Forwarded 12 rows for 'ethereum' to subscore 'dominance'");
/// ```
pub struct SourceForwarded<'a> {
    pub chain: &'a str,
    pub subscore: &'a str,
    pub rows: usize,
}

impl Display for SourceForwarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Forwarded {} rows for '{}' to subscore '{}'",
            self.rows, self.chain, self.subscore
        )
    }
}

impl StructuredLog for SourceForwarded<'_> {
    fn log(&self) {
        tracing::info!(
            chain = self.chain,
            subscore = self.subscore,
            rows = self.rows,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "source_forwarded",
            span_name = name,
            chain = self.chain,
            subscore = self.subscore,
            rows = self.rows,
        )
    }
}

/// Pipeline run completed and the session closed cleanly.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineCompleted {
    pub sources: usize,
    pub rows: usize,
    pub gigabytes: f64,
    pub duration: Duration,
}

impl Display for PipelineCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dominance pipeline completed: {} sources, {} rows, {:.2} GB processed in {:?}",
            self.sources, self.rows, self.gigabytes, self.duration
        )
    }
}

impl StructuredLog for PipelineCompleted {
    fn log(&self) {
        tracing::info!(
            sources = self.sources,
            rows = self.rows,
            gigabytes = self.gigabytes,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_completed",
            span_name = name,
            sources = self.sources,
            rows = self.rows,
            duration = ?self.duration,
        )
    }
}

/// Pipeline run aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use spacejar::observability::messages::pipeline::PipelineFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "warehouse unavailable");
/// let msg = PipelineFailed {
///     state: "computing(cardano)",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct PipelineFailed<'a> {
    pub state: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PipelineFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dominance pipeline failed while {}: {}", self.state, self.error)
    }
}

impl StructuredLog for PipelineFailed<'_> {
    fn log(&self) {
        tracing::error!(state = self.state, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "pipeline_failed",
            span_name = name,
            state = self.state,
            error = %self.error,
        )
    }
}
