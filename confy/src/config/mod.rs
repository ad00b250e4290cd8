//! Resolved configuration and its builder.

mod builder;
mod layer;
mod pipeline;

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use camino::Utf8Path;

pub use builder::ConfigBuilder;
pub use layer::LayerSource;

use crate::dotenv::DotenvOutcome;
use crate::provenance::{ProvenanceEntry, ProvenanceLedger};
use crate::tree::ConfigTree;

/// A configuration tree resolved from layered sources.
///
/// Dereferences to its root [`ConfigTree`] for reads and writes. Provenance
/// reflects the resolution pass only; later mutation is not recorded.
#[derive(Clone, Debug)]
pub struct Config {
    tree: ConfigTree,
    ledger: Option<ProvenanceLedger>,
    layers: Vec<LayerSource>,
    dotenv: Option<DotenvOutcome>,
}

impl Config {
    /// Start configuring a resolution pass.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Borrow the resolved tree.
    #[must_use]
    pub const fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Consume the configuration, keeping only the tree.
    #[must_use]
    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }

    /// The winning provenance entry for `key`, when tracking was enabled.
    #[must_use]
    pub fn provenance(&self, key: &str) -> Option<&ProvenanceEntry> {
        self.ledger.as_ref()?.get(key)
    }

    /// Every entry recorded for `key`, oldest first.
    #[must_use]
    pub fn provenance_history(&self, key: &str) -> Vec<&ProvenanceEntry> {
        self.ledger
            .as_ref()
            .map(|ledger| ledger.history(key))
            .unwrap_or_default()
    }

    /// Source label of the winning value for every recorded key.
    ///
    /// Empty when tracking was disabled.
    #[must_use]
    pub fn provenance_dump(&self) -> BTreeMap<String, String> {
        self.ledger
            .iter()
            .flat_map(ProvenanceLedger::iter)
            .map(|entry| (entry.key.clone(), entry.source.clone()))
            .collect()
    }

    /// The full ledger, when tracking was enabled.
    #[must_use]
    pub const fn provenance_ledger(&self) -> Option<&ProvenanceLedger> {
        self.ledger.as_ref()
    }

    /// Count of winning values per source category.
    #[must_use]
    pub fn sources_summary(&self) -> BTreeMap<String, usize> {
        self.ledger
            .as_ref()
            .map(ProvenanceLedger::sources_summary)
            .unwrap_or_default()
    }

    /// Layers merged during resolution, lowest precedence first.
    #[must_use]
    pub fn layers(&self) -> &[LayerSource] {
        &self.layers
    }

    /// Configuration files that were found and merged, in merge order.
    pub fn loaded_files(&self) -> impl Iterator<Item = &Utf8Path> {
        self.layers.iter().filter_map(LayerSource::path)
    }

    /// The dotenv file loaded before reading the environment, if any.
    #[must_use]
    pub fn dotenv_file(&self) -> Option<&Path> {
        self.dotenv.as_ref().map(|outcome| outcome.path.as_path())
    }
}

impl Deref for Config {
    type Target = ConfigTree;

    fn deref(&self) -> &ConfigTree {
        &self.tree
    }
}

impl DerefMut for Config {
    fn deref_mut(&mut self) -> &mut ConfigTree {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests;
