// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod query_executor;
pub mod scoring_runtime;

pub use query_executor::QueryExecutor;
pub use scoring_runtime::ScoringRuntime;
