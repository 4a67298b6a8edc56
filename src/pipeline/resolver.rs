// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use crate::config::consts::USD_QUOTE;
use crate::config::ChainRegistry;
use crate::errors::PipelineError;
use crate::observability::messages::pipeline::SourcesResolved;
use crate::observability::messages::StructuredLog;
use crate::pipeline::SourceDescriptor;
use crate::warehouse::{Query, QueryRunner};

/// Resolves each registry source's whitelisted asset universe.
pub struct MetadataResolver {
    registry: ChainRegistry,
    runner: QueryRunner,
}

impl MetadataResolver {
    pub fn new(registry: ChainRegistry, runner: QueryRunner) -> Self {
        Self { registry, runner }
    }

    /// Resolve the source at `index`.
    ///
    /// Runs the whitelist query, keeps rows whose `chain_id` is this chain,
    /// and returns their asset ids deduplicated in ascending order. The quote
    /// currency is `USD` when `quote_in_usd` is set, otherwise the chain's
    /// native quote.
    pub async fn resolve(
        &self,
        index: usize,
        quote_in_usd: bool,
    ) -> Result<SourceDescriptor, PipelineError> {
        let entry = self.registry.describe(index)?;
        let whitelist = self.runner.run(&Query::whitelist()).await?;

        let mut asset_ids = BTreeSet::new();
        for row in &whitelist.rows {
            if row.str("chain_id")? != entry.chain_name {
                continue;
            }
            asset_ids.insert(row.i64("asset_id")?);
        }

        let quote_currency = if quote_in_usd {
            USD_QUOTE.to_string()
        } else {
            entry.native_quote.clone()
        };

        Ok(SourceDescriptor {
            chain_name: entry.chain_name.clone(),
            schema_name: entry.schema_name.clone(),
            network_table: entry.network_table.clone(),
            ledger_table: entry.ledger_table.clone(),
            quote_currency,
            asset_ids: asset_ids.into_iter().collect(),
        })
    }

    /// Resolve sources `0..count` in index order.
    ///
    /// The returned order is the order sources are scored in. A repeated
    /// chain name replaces the earlier descriptor at its original position.
    pub async fn resolve_all(
        &self,
        count: usize,
        quote_in_usd: bool,
    ) -> Result<Vec<SourceDescriptor>, PipelineError> {
        let mut sources = Vec::with_capacity(count);
        for index in 0..count {
            let descriptor = self.resolve(index, quote_in_usd).await?;
            upsert(&mut sources, descriptor);
        }

        let chains: Vec<&str> = sources.iter().map(|s| s.chain_name.as_str()).collect();
        SourcesResolved {
            chains: &chains,
            asset_count: sources.iter().map(|s| s.asset_ids.len()).sum(),
        }
        .log();

        Ok(sources)
    }
}

fn upsert(sources: &mut Vec<SourceDescriptor>, descriptor: SourceDescriptor) {
    match sources
        .iter_mut()
        .find(|existing| existing.chain_name == descriptor.chain_name)
    {
        Some(existing) => *existing = descriptor,
        None => sources.push(descriptor),
    }
}
