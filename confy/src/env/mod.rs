//! Environment variable collection.
//!
//! Variables are read from an [`EnvSnapshot`] captured once per resolution
//! pass rather than from the live process environment, so the pipeline is a
//! pure function of its inputs.

mod denylist;
mod remap;
mod snapshot;

use serde_json::{Map, Value};
use tracing::{debug, warn};
use uncased::UncasedStr;

pub use remap::{RemapFallback, remap};
pub use snapshot::EnvSnapshot;

use crate::path;
use crate::value::parse_str;

const LITERAL_UNDERSCORE: char = '\u{0}';

/// Normalise `prefix` so that it ends with exactly one underscore.
///
/// Returns `None` for the empty prefix, which selects every variable not on
/// the system deny-list.
#[must_use]
pub fn normalize_prefix(prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        None
    } else {
        Some(format!("{}_", prefix.trim_end_matches('_')))
    }
}

/// Convert the post-prefix part of a variable name into a candidate
/// dot-path.
///
/// The name is lowercased and every `_` becomes a nesting boundary, except
/// that `__` stands for one literal underscore inside a key.
///
/// ```
/// use confy::env::candidate_path;
///
/// assert_eq!(candidate_path("DB_PORT"), "db.port");
/// assert_eq!(candidate_path("FEATURE_FLAGS__BETA_FEATURE"), "feature.flags_beta.feature");
/// ```
#[must_use]
pub fn candidate_path(remainder: &str) -> String {
    remainder
        .to_lowercase()
        .replace("__", &LITERAL_UNDERSCORE.to_string())
        .replace('_', ".")
        .replace(LITERAL_UNDERSCORE, "_")
}

fn strip_prefix<'a>(name: &'a str, normalized: &str) -> Option<&'a str> {
    let head = name.get(..normalized.len())?;
    if UncasedStr::new(head) == UncasedStr::new(normalized) {
        name.get(normalized.len()..)
    } else {
        None
    }
}

/// Build the nested overlay contributed by `snapshot` for `prefix`.
///
/// With no prefix nothing is collected. The empty prefix selects every
/// variable not on the system deny-list; any other prefix selects variables
/// whose names start with it, ignoring case. Values pass through
/// [`parse_str`].
///
/// # Examples
///
/// ```
/// use confy::env::{EnvSnapshot, collect};
/// use serde_json::{Value, json};
///
/// let snapshot = EnvSnapshot::from_iter([("APP_DB_PORT", "6000"), ("OTHER", "x")]);
/// let overlay = collect(&snapshot, Some("app"));
/// assert_eq!(Value::Object(overlay), json!({"db": {"port": 6000}}));
/// ```
#[must_use]
pub fn collect(snapshot: &EnvSnapshot, prefix: Option<&str>) -> Map<String, Value> {
    let mut overlay = Map::new();
    let Some(raw_prefix) = prefix else {
        return overlay;
    };
    let normalized = normalize_prefix(raw_prefix);
    let mut collected = 0_usize;
    for (name, raw) in snapshot.iter() {
        let remainder = match normalized.as_deref() {
            Some(p) => match strip_prefix(name, p) {
                Some(rest) => rest,
                None => continue,
            },
            None if denylist::is_denied(name) => continue,
            None => name,
        };
        if remainder.is_empty() {
            continue;
        }
        let dot_path = candidate_path(remainder);
        if let Err(err) = path::set(&mut overlay, &dot_path, parse_str(raw), true) {
            warn!(variable = name, %err, "skipping environment variable");
            continue;
        }
        collected += 1;
    }
    debug!(
        prefix = normalized.as_deref().unwrap_or("*"),
        collected,
        "collected environment variables"
    );
    overlay
}
