// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{ConfigurationError, QueryError, ScoringError};

/// Top-level error of a pipeline run. The first error encountered aborts the
/// run and is returned as-is.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
