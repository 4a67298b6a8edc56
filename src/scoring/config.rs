// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::time::Duration;

use crate::config::consts::{
    DEFAULT_INFERENCE_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_MEMORY,
};
use crate::errors::ConfigurationError;

/// Largest concurrency limit a session accepts. Stopping a session drains
/// every permit in a single `u32` acquisition.
pub const MAX_CONCURRENT_REQUESTS: usize = u32::MAX as usize;

/// Limits handed to the scoring runtime when a session starts.
///
/// # Fields
/// * `max_memory` - Byte budget for data stored in the runtime (defaults to 1 GiB)
/// * `max_concurrent_requests` - Concurrent runtime calls allowed (defaults to 10)
/// * `inference_timeout_ms` - Upper bound on any single runtime call (defaults to 1000)
///
/// # Example
/// ```
/// use spacejar::scoring::ModelConfig;
/// use std::time::Duration;
///
/// let config = ModelConfig::default();
/// assert_eq!(config.max_memory, 1024 * 1024 * 1024);
/// assert_eq!(config.inference_timeout(), Duration::from_millis(1000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_max_memory")]
    pub max_memory: usize,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            inference_timeout_ms: DEFAULT_INFERENCE_TIMEOUT_MS,
        }
    }
}

impl ModelConfig {
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    /// Reject limits that would make every runtime call fail, or that the
    /// runtime cannot represent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_concurrent_requests > MAX_CONCURRENT_REQUESTS {
            return Err(ConfigurationError::InvalidModelConfig(format!(
                "max_concurrent_requests must be at most {}, got {}",
                MAX_CONCURRENT_REQUESTS, self.max_concurrent_requests
            )));
        }

        let zero_field = if self.max_memory == 0 {
            Some("max_memory")
        } else if self.max_concurrent_requests == 0 {
            Some("max_concurrent_requests")
        } else if self.inference_timeout_ms == 0 {
            Some("inference_timeout_ms")
        } else {
            None
        };

        match zero_field {
            Some(field) => Err(ConfigurationError::InvalidModelConfig(format!(
                "{} must be greater than zero",
                field
            ))),
            None => Ok(()),
        }
    }
}

fn default_max_memory() -> usize {
    DEFAULT_MAX_MEMORY
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_inference_timeout_ms() -> u64 {
    DEFAULT_INFERENCE_TIMEOUT_MS
}

/// What a scoring session does when the same subscore name is registered twice.
///
/// * `Reuse` - Return the handle from the first registration
/// * `Reject` - Fail with `ScoringError::DuplicateSubscore`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscorePolicy {
    #[default]
    Reuse,
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_driven() {
        let test_cases = vec![
            ("defaults", ModelConfig::default(), None),
            (
                "zero memory",
                ModelConfig { max_memory: 0, ..ModelConfig::default() },
                Some("max_memory"),
            ),
            (
                "zero concurrency",
                ModelConfig { max_concurrent_requests: 0, ..ModelConfig::default() },
                Some("max_concurrent_requests"),
            ),
            (
                "zero timeout",
                ModelConfig { inference_timeout_ms: 0, ..ModelConfig::default() },
                Some("inference_timeout_ms"),
            ),
            (
                "concurrency at the limit",
                ModelConfig {
                    max_concurrent_requests: MAX_CONCURRENT_REQUESTS,
                    ..ModelConfig::default()
                },
                None,
            ),
            (
                "concurrency above the limit",
                ModelConfig { max_concurrent_requests: usize::MAX, ..ModelConfig::default() },
                Some("max_concurrent_requests must be at most"),
            ),
        ];

        for (name, config, expected_field) in test_cases {
            match (config.validate(), expected_field) {
                (Ok(()), None) => {}
                (Err(e), Some(field)) => {
                    assert!(e.to_string().contains(field), "case '{}': {}", name, e)
                }
                (result, _) => panic!("case '{}': unexpected result {:?}", name, result),
            }
        }
    }

    #[test]
    fn test_policy_parsing() {
        let reuse: SubscorePolicy = serde_yaml::from_str("reuse").unwrap();
        let reject: SubscorePolicy = serde_yaml::from_str("reject").unwrap();

        assert_eq!(reuse, SubscorePolicy::Reuse);
        assert_eq!(reject, SubscorePolicy::Reject);
        assert_eq!(SubscorePolicy::default(), SubscorePolicy::Reuse);
    }
}
