// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::consts::{DEFAULT_METRIC_LABEL, DEFAULT_SUBSCORE_NAME};
use crate::config::{ChainEntry, ChainRegistry};
use crate::errors::ConfigurationError;
use crate::scoring::{ModelConfig, SubscorePolicy, KEY_LEN};

/// Main configuration structure for a dominance pipeline run.
///
/// Every field is optional; an empty document runs the three built-in chains
/// against the default scoring runtime settings.
///
/// # Fields
/// * `quote_in_usd` - Quote every source in USD instead of its native currency
/// * `chain_count` - Number of registry entries to process, from index 0 (defaults to all)
/// * `chains` - Replacement chain table (defaults to the built-in registry)
/// * `subscore` - Subscore name, row label and re-registration policy
/// * `scoring` - Scoring runtime limits
/// * `encryption_key` - Base64 encoded 32-byte key for encrypted blobs
/// * `blobs` - Auxiliary data stored once per run after the subscore is registered
/// * `verbose_queries` - Log per-query gigabytes at info instead of debug
///
/// # Example
/// ```yaml
/// quote_in_usd: false
/// chain_count: 3
/// subscore:
///   name: dominance
///   label: Transaction Dominance
///   policy: reuse
/// scoring:
///   max_memory: 1073741824
///   max_concurrent_requests: 10
///   inference_timeout_ms: 1000
/// blobs:
///   - key: custom_key
///     data: custom data
///     encrypt: true
/// ```
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub quote_in_usd: bool,
    #[serde(default)]
    pub chain_count: Option<usize>,
    #[serde(default)]
    pub chains: Option<Vec<ChainEntry>>,
    #[serde(default)]
    pub subscore: SubscoreConfig,
    #[serde(default)]
    pub scoring: ModelConfig,
    #[serde(default)]
    pub encryption_key: Option<String>,
    #[serde(default)]
    pub blobs: Vec<BlobConfig>,
    #[serde(default)]
    pub verbose_queries: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quote_in_usd: false,
            chain_count: None,
            chains: None,
            subscore: SubscoreConfig::default(),
            scoring: ModelConfig::default(),
            encryption_key: None,
            blobs: Vec::new(),
            verbose_queries: false,
        }
    }
}

impl PipelineConfig {
    /// Build the chain registry this configuration describes.
    pub fn build_registry(&self) -> Result<ChainRegistry, ConfigurationError> {
        match &self.chains {
            Some(entries) => ChainRegistry::from_entries(entries.clone()),
            None => Ok(ChainRegistry::builtin()),
        }
    }

    /// Number of sources to resolve, defaulting to the whole registry.
    pub fn chain_count(&self, registry: &ChainRegistry) -> usize {
        self.chain_count.unwrap_or_else(|| registry.len())
    }

    /// Decode the configured blob encryption key, if any.
    pub fn encryption_key_bytes(&self) -> Result<Option<[u8; KEY_LEN]>, ConfigurationError> {
        let Some(encoded) = &self.encryption_key else {
            return Ok(None);
        };

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigurationError::InvalidEncryptionKey(e.to_string()))?;

        let key = <[u8; KEY_LEN]>::try_from(decoded.as_slice()).map_err(|_| {
            ConfigurationError::InvalidEncryptionKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN,
                decoded.len()
            ))
        })?;

        Ok(Some(key))
    }

    /// Check everything that can be checked without touching a collaborator.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let registry = self.build_registry()?;

        if let Some(requested) = self.chain_count {
            if requested > registry.len() {
                return Err(ConfigurationError::ChainCountTooLarge {
                    requested,
                    available: registry.len(),
                });
            }
        }

        self.scoring.validate()?;
        self.encryption_key_bytes()?;
        Ok(())
    }
}

/// Subscore naming and registration policy.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscoreConfig {
    #[serde(default = "default_subscore_name")]
    pub name: String,
    #[serde(default = "default_metric_label")]
    pub label: String,
    #[serde(default)]
    pub policy: SubscorePolicy,
}

impl Default for SubscoreConfig {
    fn default() -> Self {
        Self {
            name: default_subscore_name(),
            label: default_metric_label(),
            policy: SubscorePolicy::default(),
        }
    }
}

fn default_subscore_name() -> String {
    DEFAULT_SUBSCORE_NAME.to_string()
}

fn default_metric_label() -> String {
    DEFAULT_METRIC_LABEL.to_string()
}

/// Auxiliary data written to the scoring runtime at the start of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    pub key: String,
    pub data: String,
    #[serde(default)]
    pub encrypt: bool,
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigurationError> {
    let content = fs::read_to_string(path)?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<PipelineConfig, ConfigurationError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let cfg: PipelineConfig = serde_yaml::from_str("{}").unwrap();

        assert!(!cfg.quote_in_usd);
        assert_eq!(cfg.subscore.name, "dominance");
        assert_eq!(cfg.subscore.label, "Transaction Dominance");
        assert_eq!(cfg.subscore.policy, SubscorePolicy::Reuse);
        assert_eq!(cfg.scoring, ModelConfig::default());
        assert!(cfg.blobs.is_empty());

        let registry = cfg.build_registry().unwrap();
        assert_eq!(cfg.chain_count(&registry), 3);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
quote_in_usd: true
chain_count: 2
subscore:
  name: dominance_v2
  policy: reject
scoring:
  max_memory: 2048
  inference_timeout_ms: 250
blobs:
  - key: custom_key
    data: custom data
    encrypt: true
"#;

        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(cfg.quote_in_usd);
        assert_eq!(cfg.chain_count, Some(2));
        assert_eq!(cfg.subscore.name, "dominance_v2");
        assert_eq!(cfg.subscore.label, "Transaction Dominance");
        assert_eq!(cfg.subscore.policy, SubscorePolicy::Reject);
        assert_eq!(cfg.scoring.max_memory, 2048);
        assert_eq!(cfg.scoring.max_concurrent_requests, 10);
        assert_eq!(cfg.scoring.inference_timeout_ms, 250);
        assert_eq!(cfg.blobs.len(), 1);
        assert!(cfg.blobs[0].encrypt);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_custom_chain_table() {
        let yaml = r#"
chains:
  - chain_name: solana
    schema_name: solana
    network_table: spl_network
    ledger_table: spl_ledger
    native_quote: SOL
"#;

        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        let registry = cfg.build_registry().unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.describe(0).unwrap().native_quote, "SOL");
    }

    #[test]
    fn test_validate_rejects_chain_count_beyond_registry() {
        let cfg: PipelineConfig = serde_yaml::from_str("chain_count: 4").unwrap();

        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ChainCountTooLarge { requested: 4, available: 3 }
        ));
    }

    #[test]
    fn test_encryption_key_decoding() {
        let key = STANDARD.encode([7u8; KEY_LEN]);
        let cfg: PipelineConfig =
            serde_yaml::from_str(&format!("encryption_key: \"{}\"", key)).unwrap();
        assert_eq!(cfg.encryption_key_bytes().unwrap(), Some([7u8; KEY_LEN]));

        let short = STANDARD.encode([7u8; 16]);
        let cfg: PipelineConfig =
            serde_yaml::from_str(&format!("encryption_key: \"{}\"", short)).unwrap();
        assert!(matches!(
            cfg.encryption_key_bytes(),
            Err(ConfigurationError::InvalidEncryptionKey(_))
        ));

        let cfg: PipelineConfig = serde_yaml::from_str("encryption_key: \"not base64!\"").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_and_validate_from_file() {
        let file = write_temp_config("quote_in_usd: true\nchain_count: 1\n");

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert!(cfg.quote_in_usd);
        assert_eq!(cfg.chain_count, Some(1));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let file = write_temp_config("scoring: [not, a, map]\n");

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/spacejar/pipeline.yaml");
        assert!(matches!(result, Err(ConfigurationError::Io(_))));
    }

    #[test]
    fn test_load_and_validate_rejects_zero_timeout() {
        let file = write_temp_config("scoring:\n  inference_timeout_ms: 0\n");

        let err = load_and_validate_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("inference_timeout_ms"));
    }
}
