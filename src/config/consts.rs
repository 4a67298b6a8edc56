// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Subscore name the pipeline registers when none is configured
pub const DEFAULT_SUBSCORE_NAME: &str = "dominance";
/// Label attached to every forwarded dominance row
pub const DEFAULT_METRIC_LABEL: &str = "Transaction Dominance";
/// Metadata key holding the metric label
pub const METRIC_LABEL_KEY: &str = "param_name";
/// Metadata key holding the source chain name
pub const CHAIN_TAG_KEY: &str = "chain";
/// Quote currency used when quoting in USD is requested
pub const USD_QUOTE: &str = "USD";
/// Fully qualified whitelist table
pub const WHITELIST_TABLE: &str = "crypto_data.token_whitelist";
/// Bytes per gigabyte used by query cost accounting
pub const BYTES_PER_GIGABYTE: f64 = 1_073_741_824.0;
/// Default scoring runtime memory budget (1 GiB)
pub const DEFAULT_MAX_MEMORY: usize = 1024 * 1024 * 1024;
/// Default scoring runtime concurrency limit
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;
/// Default per-call scoring runtime timeout in milliseconds
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 1000;
