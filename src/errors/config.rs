// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors in static configuration: the chain registry, scoring runtime
/// settings, and the YAML files they are loaded from.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A registry lookup used an index outside `[0, len)`.
    #[error("Registry index {index} is out of range (registry has {len} chains)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Chain registry must contain at least one chain")]
    EmptyRegistry,

    /// Two registry entries share a chain name.
    #[error("Duplicate chain name in registry: '{0}'")]
    DuplicateChain(String),

    /// A registry entry left a required field blank.
    #[error("Chain entry {index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },

    /// More chains were requested than the registry holds.
    #[error("chain_count {requested} exceeds the {available} chains in the registry")]
    ChainCountTooLarge { requested: usize, available: usize },

    #[error("Invalid scoring configuration: {0}")]
    InvalidModelConfig(String),

    #[error("Invalid encryption key: {0}")]
    InvalidEncryptionKey(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}
