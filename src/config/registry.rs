// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashSet;

use crate::errors::ConfigurationError;

/// Built-in chain table: (chain, schema, network table, ledger table, native quote).
const BUILTIN_CHAINS: [(&str, &str, &str, &str, &str); 3] = [
    ("ethereum", "ethereum", "erc20_network", "erc20_ledger", "ETH"),
    ("cardano", "prod_cardano", "gold_transfer_network", "gold_transfer_ledger", "ADA"),
    ("polygon", "polygon", "erc20_network", "erc20_ledger", "MATIC"),
];

/// Static description of one ledger data source.
///
/// This is the template a `SourceDescriptor` is resolved from; it carries
/// everything except the asset universe and the chosen quote currency.
///
/// # Example
/// ```yaml
/// chain_name: ethereum
/// schema_name: ethereum
/// network_table: erc20_network
/// ledger_table: erc20_ledger
/// native_quote: ETH
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainEntry {
    pub chain_name: String,
    pub schema_name: String,
    pub network_table: String,
    pub ledger_table: String,
    pub native_quote: String,
}

impl ChainEntry {
    pub fn new(
        chain_name: &str,
        schema_name: &str,
        network_table: &str,
        ledger_table: &str,
        native_quote: &str,
    ) -> Self {
        Self {
            chain_name: chain_name.to_string(),
            schema_name: schema_name.to_string(),
            network_table: network_table.to_string(),
            ledger_table: ledger_table.to_string(),
            native_quote: native_quote.to_string(),
        }
    }
}

/// Fixed, index-addressed table of chain sources.
///
/// Chain names are unique and non-empty by construction, so anything keyed by
/// chain name downstream never sees a collision.
///
/// # Examples
/// ```
/// use spacejar::config::ChainRegistry;
///
/// let registry = ChainRegistry::builtin();
/// assert_eq!(registry.len(), 3);
/// assert_eq!(registry.describe(1).unwrap().schema_name, "prod_cardano");
/// assert!(registry.describe(3).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    entries: Vec<ChainEntry>,
}

impl ChainRegistry {
    /// The three production chains: ethereum, cardano and polygon.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CHAINS
            .iter()
            .map(|(chain, schema, network, ledger, quote)| {
                ChainEntry::new(chain, schema, network, ledger, quote)
            })
            .collect();
        Self { entries }
    }

    /// Build a registry from explicit entries, rejecting empty tables, blank
    /// names and duplicate chains.
    pub fn from_entries(entries: Vec<ChainEntry>) -> Result<Self, ConfigurationError> {
        if entries.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let required = [
                ("chain_name", &entry.chain_name),
                ("schema_name", &entry.schema_name),
                ("network_table", &entry.network_table),
                ("ledger_table", &entry.ledger_table),
                ("native_quote", &entry.native_quote),
            ];
            if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
                return Err(ConfigurationError::EmptyField {
                    index,
                    field: *field,
                });
            }
            if !seen.insert(entry.chain_name.as_str()) {
                return Err(ConfigurationError::DuplicateChain(entry.chain_name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Look up the source template at `index`.
    pub fn describe(&self, index: usize) -> Result<&ChainEntry, ConfigurationError> {
        self.entries
            .get(index)
            .ok_or(ConfigurationError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainEntry> {
        self.entries.iter()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
