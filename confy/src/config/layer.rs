//! Layer labels and the accumulator that folds layers in precedence order.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::debug;

use crate::ProvenanceLedger;
use crate::merge::merge_into;

/// Origin of one configuration layer.
///
/// The [`Display`](fmt::Display) form is the label stored in provenance
/// entries.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum LayerSource {
    /// Programmatic defaults.
    Defaults,
    /// Defaults registered for one application namespace.
    AppDefaults(String),
    /// Initial data supplied by the caller.
    Initial,
    /// A structured configuration file.
    File(Utf8PathBuf),
    /// Environment variables selected by a prefix; empty for all variables.
    Environment(String),
    /// Explicit dot-path overrides.
    Overrides,
}

impl LayerSource {
    /// Path of the file when this is a file layer.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => f.write_str("defaults"),
            Self::AppDefaults(namespace) => write!(f, "app_defaults:{namespace}"),
            Self::Initial => f.write_str("initial"),
            Self::File(path) => write!(f, "file:{path}"),
            Self::Environment(prefix) if prefix.is_empty() => f.write_str("env:*"),
            Self::Environment(prefix) => write!(f, "env:{}_*", prefix.trim_end_matches('_')),
            Self::Overrides => f.write_str("overrides_dict"),
        }
    }
}

/// Accumulates layers from lowest to highest precedence.
#[derive(Debug, Default)]
pub(crate) struct LayerStack {
    merged: Map<String, Value>,
    ledger: Option<ProvenanceLedger>,
    applied: Vec<LayerSource>,
}

impl LayerStack {
    pub(crate) fn new(track_provenance: bool) -> Self {
        Self {
            merged: Map::new(),
            ledger: track_provenance.then(ProvenanceLedger::new),
            applied: Vec::new(),
        }
    }

    /// Merge `layer` over everything pushed so far.
    pub(crate) fn push(&mut self, source: LayerSource, layer: Map<String, Value>) {
        let label = source.to_string();
        debug!(source = %label, keys = layer.len(), "merging configuration layer");
        merge_into(&mut self.merged, layer, &label, self.ledger.as_mut());
        self.applied.push(source);
    }

    /// The merged state so far.
    pub(crate) const fn state(&self) -> &Map<String, Value> {
        &self.merged
    }

    pub(crate) fn into_parts(self) -> (Map<String, Value>, Option<ProvenanceLedger>, Vec<LayerSource>) {
        (self.merged, self.ledger, self.applied)
    }
}
