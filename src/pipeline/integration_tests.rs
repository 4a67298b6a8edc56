// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end runs of the orchestrator against in-memory collaborators.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BlobConfig, ChainRegistry, PipelineConfig};
use crate::errors::{ConfigurationError, PipelineError, QueryError, ScoringError};
use crate::pipeline::{PipelineOrchestrator, PipelineState, RunSettings};
use crate::scoring::{
    InMemoryScoringRuntime, ModelConfig, ScoreUpdate, SubscoreHandle, SubscorePolicy,
};
use crate::traits::{QueryExecutor, ScoringRuntime};
use crate::warehouse::stub::FailingExecutor;
use crate::warehouse::{InMemoryWarehouse, WarehouseFixture};

fn orchestrator(
    executor: Arc<dyn QueryExecutor>,
    runtime: Arc<dyn ScoringRuntime>,
    settings: RunSettings,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        ChainRegistry::builtin(),
        executor,
        runtime,
        ModelConfig::default(),
        settings,
    )
}

fn sample_warehouse() -> Arc<InMemoryWarehouse> {
    Arc::new(InMemoryWarehouse::new(WarehouseFixture::sample()))
}

fn default_settings() -> RunSettings {
    RunSettings::for_registry(&ChainRegistry::builtin())
}

async fn dominance_scores(runtime: &InMemoryScoringRuntime) -> Vec<ScoreUpdate> {
    let handle = runtime
        .subscore("dominance")
        .await
        .expect("dominance subscore registered");
    runtime.scores(&handle).await
}

/// Scoring runtime whose score updates take longer than any sane timeout.
struct SlowRuntime {
    inner: InMemoryScoringRuntime,
    delay: Duration,
}

#[async_trait]
impl ScoringRuntime for SlowRuntime {
    async fn start(&self, config: &ModelConfig) -> Result<(), ScoringError> {
        self.inner.start(config).await
    }

    async fn stop(&self) -> Result<(), ScoringError> {
        self.inner.stop().await
    }

    async fn register_subscore(&self, name: &str) -> Result<SubscoreHandle, ScoringError> {
        self.inner.register_subscore(name).await
    }

    async fn store_data(
        &self,
        key: &str,
        data: Vec<u8>,
        encrypt: bool,
    ) -> Result<(), ScoringError> {
        self.inner.store_data(key, data, encrypt).await
    }

    async fn retrieve_data(&self, key: &str) -> Result<Vec<u8>, ScoringError> {
        self.inner.retrieve_data(key).await
    }

    async fn update_score(
        &self,
        handle: &SubscoreHandle,
        updates: Vec<ScoreUpdate>,
    ) -> Result<(), ScoringError> {
        tokio::time::sleep(self.delay).await;
        self.inner.update_score(handle, updates).await
    }
}

#[tokio::test]
async fn test_three_chains_forward_twelve_rows() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let mut pipeline = orchestrator(sample_warehouse(), runtime.clone(), default_settings());

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.rows_forwarded, 12);
    let chains: Vec<_> = report.sources.iter().map(|s| s.chain.as_str()).collect();
    assert_eq!(chains, vec!["ethereum", "cardano", "polygon"]);
    for source in &report.sources {
        assert_eq!(source.assets, 2);
        assert_eq!(source.rows_forwarded, 4);
    }

    let scores = dominance_scores(&runtime).await;
    assert_eq!(scores.len(), 12);

    let mut sums: BTreeMap<(String, NaiveDate), (usize, f64)> = BTreeMap::new();
    for score in &scores {
        assert_eq!(
            score.meta.get("param_name").map(String::as_str),
            Some("Transaction Dominance")
        );
        let chain = score.meta.get("chain").cloned().unwrap();
        let entry = sums.entry((chain, score.partition_time)).or_default();
        entry.0 += 1;
        entry.1 += score.value;
    }
    assert_eq!(sums.len(), 6);
    for ((chain, day), (count, sum)) in sums {
        assert_eq!(count, 2, "{} {}", chain, day);
        assert!((sum - 1.0).abs() < 1e-9, "{} {} sums to {}", chain, day, sum);
    }

    assert_eq!(pipeline.state(), &PipelineState::Closed);
    assert_eq!(runtime.start_count(), 1);
    assert_eq!(runtime.stop_count(), 1);
}

#[tokio::test]
async fn test_forwarding_order_matches_resolution_order() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let mut pipeline = orchestrator(sample_warehouse(), runtime.clone(), default_settings());

    pipeline.run().await.unwrap();

    let mut chains: Vec<String> = Vec::new();
    for score in dominance_scores(&runtime).await {
        let chain = score.meta.get("chain").cloned().unwrap();
        if chains.last() != Some(&chain) {
            chains.push(chain);
        }
    }
    assert_eq!(chains, vec!["ethereum", "cardano", "polygon"]);
}

#[tokio::test]
async fn test_failure_on_second_source_keeps_first_and_closes_once() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let executor = Arc::new(FailingExecutor::new(WarehouseFixture::sample(), 2));
    let mut pipeline = orchestrator(executor, runtime.clone(), default_settings());

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::Query(QueryError::Execution(_))));
    let scores = dominance_scores(&runtime).await;
    assert_eq!(scores.len(), 4);
    assert!(scores
        .iter()
        .all(|s| s.meta.get("chain").map(String::as_str) == Some("ethereum")));

    assert_eq!(pipeline.state(), &PipelineState::ClosedWithError);
    assert_eq!(runtime.start_count(), 1);
    assert_eq!(runtime.stop_count(), 1);
}

#[tokio::test]
async fn test_resolution_failure_never_opens_session() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let settings = RunSettings {
        chain_count: 4,
        ..default_settings()
    };
    let mut pipeline = orchestrator(sample_warehouse(), runtime.clone(), settings);

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Configuration(ConfigurationError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert_eq!(pipeline.state(), &PipelineState::ClosedWithError);
    assert_eq!(runtime.start_count(), 0);
    assert_eq!(runtime.stop_count(), 0);
}

#[tokio::test]
async fn test_rerun_resets_accounting_and_reuses_subscore() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let mut pipeline = orchestrator(sample_warehouse(), runtime.clone(), default_settings());

    let first = pipeline.run().await.unwrap();
    let second = pipeline.run().await.unwrap();

    // Three whitelist queries and three count queries per run.
    assert_eq!(first.gigabytes.len(), 6);
    assert_eq!(second.gigabytes.len(), 6);
    assert_eq!(first.total_gigabytes, second.total_gigabytes);
    assert_eq!(pipeline.accounting().query_count(), 6);

    assert_eq!(runtime.metrics().await.subscores, 1);
    assert_eq!(dominance_scores(&runtime).await.len(), 24);
    assert_eq!(runtime.stop_count(), 2);
}

#[tokio::test]
async fn test_configured_blobs_are_stored_encrypted() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let settings = RunSettings {
        blobs: vec![
            BlobConfig {
                key: "custom_key".to_string(),
                data: "custom data".to_string(),
                encrypt: true,
            },
            BlobConfig {
                key: "plain_key".to_string(),
                data: "plain".to_string(),
                encrypt: false,
            },
        ],
        ..default_settings()
    };
    let mut pipeline = orchestrator(sample_warehouse(), runtime.clone(), settings);

    pipeline.run().await.unwrap();

    assert_ne!(
        runtime.raw_blob("custom_key").await.unwrap(),
        b"custom data".to_vec()
    );
    assert_eq!(runtime.raw_blob("plain_key").await.unwrap(), b"plain".to_vec());

    runtime.start(&ModelConfig::default()).await.unwrap();
    assert_eq!(
        runtime.retrieve_data("custom_key").await.unwrap(),
        b"custom data".to_vec()
    );
}

#[tokio::test]
async fn test_blob_over_budget_aborts_before_forwarding() {
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let settings = RunSettings {
        blobs: vec![BlobConfig {
            key: "big".to_string(),
            data: "x".repeat(64),
            encrypt: false,
        }],
        ..default_settings()
    };
    let mut pipeline = PipelineOrchestrator::new(
        ChainRegistry::builtin(),
        sample_warehouse(),
        runtime.clone(),
        ModelConfig {
            max_memory: 16,
            ..ModelConfig::default()
        },
        settings,
    );

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::Scoring(ScoringError::Storage { .. })));
    assert!(dominance_scores(&runtime).await.is_empty());
    assert_eq!(runtime.stop_count(), 1);
}

#[tokio::test]
async fn test_slow_runtime_times_out_and_session_still_closes() {
    let runtime = Arc::new(SlowRuntime {
        inner: InMemoryScoringRuntime::new(),
        delay: Duration::from_millis(500),
    });
    let mut pipeline = PipelineOrchestrator::new(
        ChainRegistry::builtin(),
        sample_warehouse(),
        runtime.clone(),
        ModelConfig {
            inference_timeout_ms: 20,
            ..ModelConfig::default()
        },
        default_settings(),
    );

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Scoring(ScoringError::Timeout {
            operation: "update_score",
            ..
        })
    ));
    assert_eq!(pipeline.state(), &PipelineState::ClosedWithError);
    assert_eq!(runtime.inner.stop_count(), 1);
}

#[tokio::test]
async fn test_usd_quote_and_partial_chain_count_from_config() {
    let config: PipelineConfig = serde_yaml::from_str(
        r#"
quote_in_usd: true
chain_count: 2
subscore:
  name: dominance
  label: Tx Dominance
  policy: reject
"#,
    )
    .unwrap();
    let runtime = Arc::new(InMemoryScoringRuntime::new());
    let mut pipeline =
        PipelineOrchestrator::from_config(&config, sample_warehouse(), runtime.clone()).unwrap();

    assert_eq!(pipeline.settings().policy, SubscorePolicy::Reject);
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.rows_forwarded, 8);
    let scores = dominance_scores(&runtime).await;
    assert!(scores
        .iter()
        .all(|s| s.meta.get("param_name").map(String::as_str) == Some("Tx Dominance")));
}

#[tokio::test]
async fn test_from_config_rejects_invalid_model_config() {
    let config: PipelineConfig =
        serde_yaml::from_str("scoring:\n  max_concurrent_requests: 0\n").unwrap();

    let result = PipelineOrchestrator::from_config(
        &config,
        sample_warehouse(),
        Arc::new(InMemoryScoringRuntime::new()),
    );

    assert!(matches!(result, Err(ConfigurationError::InvalidModelConfig(_))));
}

#[tokio::test]
async fn test_from_config_rejects_unrepresentable_concurrency() {
    let config: PipelineConfig =
        serde_yaml::from_str("scoring:\n  max_concurrent_requests: 18446744073709551615\n")
            .unwrap();
    let runtime = Arc::new(InMemoryScoringRuntime::new());

    let result = PipelineOrchestrator::from_config(&config, sample_warehouse(), runtime.clone());

    assert!(matches!(result, Err(ConfigurationError::InvalidModelConfig(_))));
    assert_eq!(runtime.start_count(), 0);
}
