// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scoring runtime collaborator: configuration, shared types, blob
//! encryption and an in-process runtime implementation.
//!
//! The pipeline only talks to a runtime through the
//! [`ScoringRuntime`](crate::traits::ScoringRuntime) trait. The
//! [`InMemoryScoringRuntime`] here backs the CLI and the test suite.

mod cipher;
mod config;
mod memory;
mod types;

pub use cipher::{BlobCipher, KEY_LEN, NONCE_LEN};
pub use config::{ModelConfig, SubscorePolicy, MAX_CONCURRENT_REQUESTS};
pub use memory::InMemoryScoringRuntime;
pub use types::{
    EventKind, RuntimeEvent, RuntimeMetrics, RuntimeState, ScoreUpdate, SubscoreHandle, Tags,
};
