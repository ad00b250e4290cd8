//! The resolution pass behind [`super::ConfigBuilder::build`].

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::builder::{ConfigBuilder, FileEntry};
use super::layer::{LayerSource, LayerStack};
use super::Config;
use crate::dotenv::DotenvOutcome;
use crate::env::{self, EnvSnapshot, RemapFallback};
use crate::file::{FileLoader, expand_path};
use crate::namespace::apply_namespace;
use crate::tree::{ConfigTree, Node};
use crate::value::parse_value;
use crate::{ConfigError, ConfigResult, path};

/// Require `value` to be a mapping.
fn into_layer(value: Value, source: &LayerSource) -> ConfigResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Arc::new(ConfigError::InvalidLayer {
            layer: source.to_string(),
            found: Node::from(other).kind(),
        })),
    }
}

fn nest(namespace: &str, map: Map<String, Value>) -> Map<String, Value> {
    let mut nested = Map::new();
    nested.insert(namespace.to_owned(), Value::Object(map));
    nested
}

type LayerSourced = (LayerSource, Map<String, Value>);

/// Load one configured file, returning `None` for a skipped extra file.
fn load_entry(loader: &dyn FileLoader, entry: &FileEntry) -> ConfigResult<Option<LayerSourced>> {
    let expanded = expand_path(&entry.path);
    let map = match loader.load(&expanded) {
        Ok(map) => map,
        Err(err) if err.is_not_found() && !entry.primary => {
            warn!(path = %expanded, "skipping missing configuration file");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let layer = match entry.namespace.as_deref() {
        Some(namespace) => apply_namespace(map, namespace),
        None => map,
    };
    Ok(Some((LayerSource::File(expanded), layer)))
}

/// Build the environment layer for `prefix`, nested under `namespace` when
/// routed to one application.
fn env_layer(
    snapshot: &EnvSnapshot,
    prefix: &str,
    known: &Map<String, Value>,
    namespace: Option<&str>,
    dotenv_loaded: bool,
) -> Map<String, Value> {
    let overlay = env::collect(snapshot, Some(prefix));
    let mut layer = Map::new();
    if overlay.is_empty() {
        return layer;
    }
    let fallback = RemapFallback::for_source(prefix.is_empty(), dotenv_loaded);
    for (target, value) in env::remap(&overlay, known, fallback) {
        let dot_path = match namespace {
            Some(ns) => format!("{ns}.{target}"),
            None => target,
        };
        if let Err(err) = path::set(&mut layer, &dot_path, value, true) {
            warn!(path = %dot_path, %err, "dropping environment value");
        }
    }
    layer
}

fn overrides_layer(overrides: Vec<(String, Value)>) -> Map<String, Value> {
    let mut layer = Map::new();
    for (dot_path, raw) in overrides {
        if let Err(err) = path::set(&mut layer, &dot_path, parse_value(raw), true) {
            warn!(path = %dot_path, %err, "dropping override");
        }
    }
    layer
}

fn load_dotenv(builder: &ConfigBuilder) -> Option<DotenvOutcome> {
    if !builder.load_dotenv_file {
        return None;
    }
    builder.dotenv_loader.load(builder.dotenv_path.as_deref())
}

fn snapshot_for(injected: Option<EnvSnapshot>, dotenv: Option<&DotenvOutcome>) -> EnvSnapshot {
    match injected {
        Some(mut snapshot) => {
            if let Some(outcome) = dotenv {
                snapshot.fill_missing(outcome.entries.iter().cloned());
            }
            snapshot
        }
        None => EnvSnapshot::capture(),
    }
}

fn validate_mandatory(tree: &ConfigTree, mandatory: &[String]) -> ConfigResult<()> {
    let missing: Vec<String> = mandatory
        .iter()
        .filter(|key| !tree.contains(key))
        .cloned()
        .collect();
    if missing.is_empty() {
        debug!(count = mandatory.len(), "all mandatory keys present");
        Ok(())
    } else {
        Err(Arc::new(ConfigError::MissingMandatory { keys: missing }))
    }
}

pub(super) fn resolve(builder: ConfigBuilder) -> ConfigResult<Config> {
    let dotenv = load_dotenv(&builder);
    let ConfigBuilder {
        defaults,
        initial,
        files,
        app_defaults,
        prefix,
        app_prefixes,
        overrides,
        mandatory,
        track_provenance,
        file_loader,
        env_snapshot,
        ..
    } = builder;
    let snapshot = snapshot_for(env_snapshot, dotenv.as_ref());
    let mut stack = LayerStack::new(track_provenance);

    if let Some(value) = defaults {
        let source = LayerSource::Defaults;
        let layer = into_layer(value, &source)?;
        stack.push(source, layer);
    }
    for (namespace, value) in app_defaults {
        let source = LayerSource::AppDefaults(namespace.clone());
        let layer = into_layer(value, &source)?;
        stack.push(source, nest(&namespace, layer));
    }
    for value in initial {
        let source = LayerSource::Initial;
        let layer = into_layer(value, &source)?;
        stack.push(source, layer);
    }
    for entry in &files {
        if let Some((source, layer)) = load_entry(file_loader.as_ref(), entry)? {
            stack.push(source, layer);
        }
    }

    let known = stack.state().clone();
    let dotenv_loaded = dotenv.is_some();
    if let Some(global) = prefix.as_deref() {
        let layer = env_layer(&snapshot, global, &known, None, dotenv_loaded);
        stack.push(LayerSource::Environment(global.to_owned()), layer);
    }
    for (namespace, app_prefix) in &app_prefixes {
        let app_known = known
            .get(namespace)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let layer = env_layer(&snapshot, app_prefix, &app_known, Some(namespace), dotenv_loaded);
        stack.push(LayerSource::Environment(app_prefix.clone()), layer);
    }
    if !overrides.is_empty() {
        stack.push(LayerSource::Overrides, overrides_layer(overrides));
    }

    let (merged, ledger, layers) = stack.into_parts();
    let tree = ConfigTree::from(merged);
    validate_mandatory(&tree, &mandatory)?;
    debug!(keys = tree.len(), layers = layers.len(), "configuration resolved");
    Ok(Config {
        tree,
        ledger,
        layers,
        dotenv,
    })
}
