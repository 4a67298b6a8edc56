// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod pipeline;
mod query;
mod scoring;

pub use config::ConfigurationError;
pub use pipeline::PipelineError;
pub use query::QueryError;
pub use scoring::ScoringError;
