//! Reconciling candidate env dot-paths with the real key structure.
//!
//! Environment variable names cannot tell a nesting underscore from an
//! underscore inside a key. `APP_FEATURE_FLAGS_NEW_UI` yields the candidate
//! `feature.flags.new.ui`, while the configuration may really hold
//! `feature_flags.new_ui`. The remapper resolves this against the keys that
//! defaults and files already define.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::debug;

/// What to do with an overlay path that matches no known key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemapFallback {
    /// Keep the candidate dot-path as nested keys.
    PreserveDots,
    /// Collapse the candidate into one underscore-joined top-level key.
    Flatten,
}

impl RemapFallback {
    /// Fallback for a collection pass.
    ///
    /// Unprefixed collection and dotenv-backed environments keep the nested
    /// form; a prefixed scan of the raw process environment flattens.
    #[must_use]
    pub const fn for_source(prefix_is_empty: bool, dotenv_loaded: bool) -> Self {
        if prefix_is_empty || dotenv_loaded {
            Self::PreserveDots
        } else {
            Self::Flatten
        }
    }
}

/// Every dot-path in `tree`, mapped to whether the node there is a mapping.
fn known_paths(tree: &Map<String, Value>) -> BTreeMap<String, bool> {
    fn walk(prefix: &str, tree: &Map<String, Value>, out: &mut BTreeMap<String, bool>) {
        for (key, value) in tree {
            let dot_path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if let Value::Object(nested) = value {
                out.insert(dot_path.clone(), true);
                walk(&dot_path, nested, out);
            } else {
                out.insert(dot_path, false);
            }
        }
    }
    let mut out = BTreeMap::new();
    walk("", tree, &mut out);
    out
}

/// Leaf segments and values of `overlay`.
fn overlay_leaves(overlay: &Map<String, Value>) -> Vec<(Vec<String>, Value)> {
    fn walk(prefix: &[String], tree: &Map<String, Value>, out: &mut Vec<(Vec<String>, Value)>) {
        for (key, value) in tree {
            let mut segments = prefix.to_vec();
            segments.push(key.clone());
            match value {
                Value::Object(nested) if !nested.is_empty() => walk(&segments, nested, out),
                other => out.push((segments, other.clone())),
            }
        }
    }
    let mut out = Vec::new();
    walk(&[], overlay, &mut out);
    out
}

/// Resolve one candidate path against the known structure.
fn resolve(segments: &[String], known: &BTreeMap<String, bool>) -> Option<String> {
    let joined = segments.join("_");
    let rooted = joined
        .split_once('_')
        .map_or_else(|| joined.clone(), |(root, rest)| format!("{root}.{rest}"));
    if known.contains_key(&rooted) {
        return Some(rooted);
    }
    known
        .iter()
        .filter(|(_, is_mapping)| **is_mapping)
        .filter_map(|(key, _)| {
            let flat = key.replace('.', "_");
            let rest = joined.strip_prefix(&flat)?.strip_prefix('_')?;
            (!rest.is_empty()).then(|| (flat.len(), format!("{key}.{rest}")))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, target)| target)
}

/// Map every leaf of `overlay` to its target dot-path.
///
/// Leaves are processed deepest first. Each is matched, in order, against:
///
/// 1. the known key formed by splitting its underscore-joined form at the
///    first underscore;
/// 2. the longest known mapping whose underscore-joined path prefixes it,
///    keeping the remainder as one underscore-joined key;
/// 3. the `fallback`.
///
/// A target claimed by an earlier leaf is never reassigned.
///
/// # Examples
///
/// ```
/// use confy::env::{RemapFallback, remap};
/// use serde_json::json;
///
/// let known = json!({"feature_flags": {"beta_feature": false}});
/// let overlay = json!({"feature": {"flags_beta": {"feature": true}}});
/// let remapped = remap(
///     overlay.as_object().expect("object"),
///     known.as_object().expect("object"),
///     RemapFallback::Flatten,
/// );
/// assert_eq!(remapped.get("feature_flags.beta_feature"), Some(&json!(true)));
/// ```
#[must_use]
pub fn remap(
    overlay: &Map<String, Value>,
    known_structure: &Map<String, Value>,
    fallback: RemapFallback,
) -> BTreeMap<String, Value> {
    let known = known_paths(known_structure);
    let mut leaves = overlay_leaves(overlay);
    leaves.sort_by_key(|(segments, _)| Reverse(segments.len()));

    let mut claimed = BTreeSet::new();
    let mut remapped = BTreeMap::new();
    for (segments, value) in leaves {
        let candidate = segments.join(".");
        let target = resolve(&segments, &known).unwrap_or_else(|| match fallback {
            RemapFallback::PreserveDots => candidate.clone(),
            RemapFallback::Flatten => segments.join("_"),
        });
        if !claimed.insert(target.clone()) {
            debug!(%candidate, %target, "target already claimed by a deeper variable");
            continue;
        }
        debug!(%candidate, %target, "remapped environment key");
        remapped.insert(target, value);
    }
    remapped
}
