// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // pipeline config + chain registry
pub mod errors;     // error handling
pub mod observability;
pub mod pipeline;   // resolver, computer, forwarder, orchestrator
pub mod scoring;    // scoring runtime types + in-memory runtime
pub mod traits;     // collaborator abstractions
pub mod warehouse;  // queries, results, byte accounting
