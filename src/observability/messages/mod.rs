// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `pipeline` - Orchestrator lifecycle and per-source progress
//! * `query` - Query execution and byte accounting
//! * `scoring` - Scoring sessions and runtime lifecycle
//!
//! # Usage Pattern
//!
//! ```rust
//! use spacejar::observability::messages::StructuredLog;
//! use spacejar::observability::messages::pipeline::PipelineStarted;
//!
//! let msg = PipelineStarted {
//!     chain_count: 3,
//!     quote_in_usd: false,
//! };
//!
//! tracing::info!("{}", msg);
//! msg.log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod pipeline;
pub mod query;
pub mod scoring;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message at its level with structured fields attached.
    fn log(&self);

    /// Build a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
