// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic line the crate emits goes through a message type in
//! [`messages`]. Message types are plain structs that implement `Display` for
//! the human-readable line and [`messages::StructuredLog`] for the structured
//! fields, so log text never lives as a magic string at the call site.
//!
//! # Usage
//!
//! ```rust
//! use spacejar::observability::messages::StructuredLog;
//! use spacejar::observability::messages::query::QueryFailed;
//! use spacejar::errors::QueryError;
//!
//! let error = QueryError::Execution("connection reset".into());
//! QueryFailed {
//!     query: "whitelist",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; falls back to `fallback_level`, then to `info`. Calling
/// it more than once is harmless.
pub fn init_tracing(fallback_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
