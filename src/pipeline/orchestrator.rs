// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::config::consts::{DEFAULT_METRIC_LABEL, DEFAULT_SUBSCORE_NAME, METRIC_LABEL_KEY};
use crate::config::{BlobConfig, ChainRegistry, PipelineConfig};
use crate::errors::{ConfigurationError, PipelineError};
use crate::observability::messages::pipeline::{
    PipelineCompleted, PipelineFailed, PipelineStarted, PipelineStateChanged, SourceForwarded,
};
use crate::observability::messages::scoring::SessionReleaseFailed;
use crate::observability::messages::StructuredLog;
use crate::pipeline::{
    MetadataResolver, MetricComputer, ScoreForwarder, ScoringSession, SourceDescriptor,
};
use crate::scoring::{ModelConfig, SubscorePolicy};
use crate::traits::{QueryExecutor, ScoringRuntime};
use crate::warehouse::{ByteAccounting, QueryRunner};

/// Where a run currently is.
///
/// `Idle -> Resolving -> SessionOpen -> {Computing -> Forwarding}* -> Closed`,
/// or `ClosedWithError` from any state once a failure has been propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Resolving,
    SessionOpen,
    Computing { chain: String },
    Forwarding { chain: String },
    Closed,
    ClosedWithError,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Resolving => write!(f, "resolving"),
            PipelineState::SessionOpen => write!(f, "session_open"),
            PipelineState::Computing { chain } => write!(f, "computing({})", chain),
            PipelineState::Forwarding { chain } => write!(f, "forwarding({})", chain),
            PipelineState::Closed => write!(f, "closed"),
            PipelineState::ClosedWithError => write!(f, "closed_with_error"),
        }
    }
}

/// Per-run knobs that are not collaborator configuration.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub chain_count: usize,
    pub quote_in_usd: bool,
    pub subscore_name: String,
    pub metric_label: String,
    pub policy: SubscorePolicy,
    pub blobs: Vec<BlobConfig>,
    pub verbose_queries: bool,
}

impl RunSettings {
    /// Every source of a registry, default subscore and label, no blobs.
    pub fn for_registry(registry: &ChainRegistry) -> Self {
        Self {
            chain_count: registry.len(),
            quote_in_usd: false,
            subscore_name: DEFAULT_SUBSCORE_NAME.to_string(),
            metric_label: DEFAULT_METRIC_LABEL.to_string(),
            policy: SubscorePolicy::default(),
            blobs: Vec::new(),
            verbose_queries: false,
        }
    }
}

/// Outcome for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub chain: String,
    pub assets: usize,
    pub rows_forwarded: usize,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub sources: Vec<SourceReport>,
    pub rows_forwarded: usize,
    /// One gigabyte sample per query, in execution order.
    pub gigabytes: Vec<f64>,
    pub total_gigabytes: f64,
    pub duration: Duration,
}

/// Drives a dominance run end to end.
///
/// Sources are resolved in registry order and then computed and forwarded in
/// that same order, one at a time. One scoring session spans the run and is
/// closed on success and on failure. The first error aborts the run; rows
/// already forwarded are kept.
pub struct PipelineOrchestrator {
    resolver: MetadataResolver,
    computer: MetricComputer,
    forwarder: ScoreForwarder,
    accounting: Arc<ByteAccounting>,
    settings: RunSettings,
    state: PipelineState,
}

impl PipelineOrchestrator {
    pub fn new(
        registry: ChainRegistry,
        executor: Arc<dyn QueryExecutor>,
        runtime: Arc<dyn ScoringRuntime>,
        model_config: ModelConfig,
        settings: RunSettings,
    ) -> Self {
        let accounting = Arc::new(ByteAccounting::new());
        let runner = QueryRunner::new(executor, Arc::clone(&accounting))
            .verbose(settings.verbose_queries);

        Self {
            resolver: MetadataResolver::new(registry, runner.clone()),
            computer: MetricComputer::new(runner),
            forwarder: ScoreForwarder::new(runtime, model_config).with_policy(settings.policy),
            accounting,
            settings,
            state: PipelineState::Idle,
        }
    }

    /// Build an orchestrator from a validated pipeline configuration.
    pub fn from_config(
        config: &PipelineConfig,
        executor: Arc<dyn QueryExecutor>,
        runtime: Arc<dyn ScoringRuntime>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let registry = config.build_registry()?;

        let settings = RunSettings {
            chain_count: config.chain_count(&registry),
            quote_in_usd: config.quote_in_usd,
            subscore_name: config.subscore.name.clone(),
            metric_label: config.subscore.label.clone(),
            policy: config.subscore.policy,
            blobs: config.blobs.clone(),
            verbose_queries: config.verbose_queries,
        };

        Ok(Self::new(
            registry,
            executor,
            runtime,
            config.scoring.clone(),
            settings,
        ))
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn accounting(&self) -> &Arc<ByteAccounting> {
        &self.accounting
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run the pipeline once. May be called again after it returns.
    pub async fn run(&mut self) -> Result<PipelineReport, PipelineError> {
        let started = PipelineStarted {
            chain_count: self.settings.chain_count,
            quote_in_usd: self.settings.quote_in_usd,
        };
        started.log();
        let span = started.span("run");
        let started_at = Instant::now();

        self.state = PipelineState::Idle;
        let result = self.run_inner().instrument(span).await;

        match result {
            Ok((sources, rows_forwarded)) => {
                enter(&mut self.state, PipelineState::Closed);
                let report = PipelineReport {
                    sources,
                    rows_forwarded,
                    gigabytes: self.accounting.samples(),
                    total_gigabytes: self.accounting.total_gigabytes(),
                    duration: started_at.elapsed(),
                };
                PipelineCompleted {
                    sources: report.sources.len(),
                    rows: report.rows_forwarded,
                    gigabytes: report.total_gigabytes,
                    duration: report.duration,
                }
                .log();
                Ok(report)
            }
            Err(error) => {
                // The state is left where the failure happened.
                let failed_state = self.state.to_string();
                PipelineFailed {
                    state: &failed_state,
                    error: &error,
                }
                .log();
                enter(&mut self.state, PipelineState::ClosedWithError);
                Err(error)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<(Vec<SourceReport>, usize), PipelineError> {
        let Self {
            resolver,
            computer,
            forwarder,
            accounting,
            settings,
            state,
        } = self;

        accounting.reset();

        enter(state, PipelineState::Resolving);
        let sources = resolver
            .resolve_all(settings.chain_count, settings.quote_in_usd)
            .await?;

        let mut session = forwarder.open_session().await?;
        enter(state, PipelineState::SessionOpen);

        let outcome = forward_sources(computer, &mut session, state, settings, &sources).await;

        let closed = session.close().await;
        match (outcome, closed) {
            (Ok(done), Ok(())) => Ok(done),
            (Ok(_), Err(close_error)) => Err(close_error.into()),
            (Err(error), close_result) => {
                if let Err(close_error) = close_result {
                    SessionReleaseFailed { error: &close_error }.log();
                }
                Err(error)
            }
        }
    }
}

async fn forward_sources(
    computer: &MetricComputer,
    session: &mut ScoringSession,
    state: &mut PipelineState,
    settings: &RunSettings,
    sources: &[SourceDescriptor],
) -> Result<(Vec<SourceReport>, usize), PipelineError> {
    let handle = session.register_subscore(&settings.subscore_name).await?;

    for blob in &settings.blobs {
        session
            .store_blob(&blob.key, blob.data.as_bytes().to_vec(), blob.encrypt)
            .await?;
    }

    let mut reports = Vec::with_capacity(sources.len());
    let mut total = 0;
    for source in sources {
        enter(
            state,
            PipelineState::Computing {
                chain: source.chain_name.clone(),
            },
        );
        let mut rows = computer.compute_dominance(source).await?;
        for row in &mut rows {
            row.metadata
                .insert(METRIC_LABEL_KEY.to_string(), settings.metric_label.clone());
        }

        enter(
            state,
            PipelineState::Forwarding {
                chain: source.chain_name.clone(),
            },
        );
        let forwarded = session.forward_rows(&handle, &rows).await?;
        SourceForwarded {
            chain: &source.chain_name,
            subscore: &handle.name,
            rows: forwarded,
        }
        .log();

        total += forwarded;
        reports.push(SourceReport {
            chain: source.chain_name.clone(),
            assets: source.asset_ids.len(),
            rows_forwarded: forwarded,
        });
    }

    Ok((reports, total))
}

fn enter(state: &mut PipelineState, next: PipelineState) {
    PipelineStateChanged {
        from: &state.to_string(),
        to: &next.to_string(),
    }
    .log();
    *state = next;
}
