// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dominance pipeline: resolve sources, compute per-asset dominance, and
//! forward it into a scoring runtime.
//!
//! # Flow
//!
//! 1. [`MetadataResolver`] resolves every registry source's whitelisted assets.
//! 2. [`ScoreForwarder`] opens one [`ScoringSession`] for the run.
//! 3. For each source in registry order, [`MetricComputer`] computes
//!    dominance rows and the session forwards them under one subscore.
//! 4. The session is closed whether or not a source failed.
//!
//! [`PipelineOrchestrator`] drives these steps and reports the run.

mod computer;
mod forwarder;
mod orchestrator;
mod resolver;
mod types;

#[cfg(test)]
mod integration_tests;

pub use computer::{dominance_shares, MetricComputer};
pub use forwarder::{ScoreForwarder, ScoringSession};
pub use orchestrator::{
    PipelineOrchestrator, PipelineReport, PipelineState, RunSettings, SourceReport,
};
pub use resolver::MetadataResolver;
pub use types::{MetricRow, SourceDescriptor};
