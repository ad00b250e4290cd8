//! Right-biased recursive merge of mapping trees.
//!
//! Mappings merge key by key. Every other value, sequences included,
//! replaces whatever the base held. When a ledger is supplied each leaf that
//! the update installs is recorded under its full dot-path; mappings
//! themselves are never recorded.

use serde_json::{Map, Value};

use crate::ProvenanceLedger;

/// Merge `updates` over `base`, returning a new mapping.
///
/// Neither input is modified.
///
/// # Examples
///
/// ```
/// use confy::merge::deep_merge;
/// use serde_json::{Value, json};
///
/// let base = json!({"db": {"host": "localhost", "port": 5432}, "items": [1, 2, 3]});
/// let updates = json!({"db": {"host": "db.example.com"}, "items": [4, 5]});
/// let merged = deep_merge(
///     base.as_object().expect("object"),
///     updates.as_object().expect("object"),
/// );
/// assert_eq!(
///     Value::Object(merged),
///     json!({"db": {"host": "db.example.com", "port": 5432}, "items": [4, 5]}),
/// );
/// ```
#[must_use]
pub fn deep_merge(base: &Map<String, Value>, updates: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    merge_object(&mut merged, updates.clone(), "", None);
    merged
}

/// Merge `updates` over `base`, recording each installed leaf in `ledger`
/// under the label `source`.
#[must_use]
pub fn deep_merge_tracked(
    base: &Map<String, Value>,
    updates: &Map<String, Value>,
    source: &str,
    ledger: &mut ProvenanceLedger,
) -> Map<String, Value> {
    let mut merged = base.clone();
    merge_object(
        &mut merged,
        updates.clone(),
        "",
        Some(Tracker { source, ledger }),
    );
    merged
}

/// Merge `updates` into `target` in place, optionally recording leaves.
///
/// The resolution pipeline owns its accumulator, so it merges in place
/// rather than copying at every layer.
pub(crate) fn merge_into(
    target: &mut Map<String, Value>,
    updates: Map<String, Value>,
    source: &str,
    ledger: Option<&mut ProvenanceLedger>,
) {
    let tracker = ledger.map(|active| Tracker {
        source,
        ledger: active,
    });
    merge_object(target, updates, "", tracker);
}

struct Tracker<'a> {
    source: &'a str,
    ledger: &'a mut ProvenanceLedger,
}

impl Tracker<'_> {
    fn reborrow(&mut self) -> Tracker<'_> {
        Tracker {
            source: self.source,
            ledger: &mut *self.ledger,
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn merge_object(
    target: &mut Map<String, Value>,
    updates: Map<String, Value>,
    prefix: &str,
    mut tracker: Option<Tracker<'_>>,
) {
    for (key, value) in updates {
        let dot_path = join(prefix, &key);
        match value {
            Value::Object(nested) => {
                let slot = target
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(slot_map) = slot {
                    merge_object(
                        slot_map,
                        nested,
                        &dot_path,
                        tracker.as_mut().map(Tracker::reborrow),
                    );
                }
            }
            leaf => {
                if let Some(active) = tracker.as_mut() {
                    active.ledger.record(dot_path, leaf.clone(), active.source);
                }
                target.insert(key, leaf);
            }
        }
    }
}
