//! Record of which source produced each configuration value.
//!
//! The ledger is append-only: recording a key that already has a current
//! entry moves that entry into the key's history before installing the new
//! one, so the history plus the current entry always reconstructs the full
//! override chain.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// The origin of one value installed at a dot-path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProvenanceEntry {
    /// Value that was installed.
    pub value: Value,
    /// Label of the source that supplied it, such as `file:/etc/app.toml`.
    pub source: String,
    /// Full dot-path of the value.
    pub key: String,
}

impl ProvenanceEntry {
    /// Source category: the part of the label before its first `:`.
    #[must_use]
    pub fn category(&self) -> &str {
        self.source
            .split_once(':')
            .map_or(self.source.as_str(), |(category, _)| category)
    }
}

impl fmt::Display for ProvenanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}  \u{2190} {}", self.key, self.value, self.source)
    }
}

/// Current and superseded provenance entries, keyed by dot-path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProvenanceLedger {
    current: BTreeMap<String, ProvenanceEntry>,
    history: BTreeMap<String, Vec<ProvenanceEntry>>,
}

impl ProvenanceLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: BTreeMap::new(),
            history: BTreeMap::new(),
        }
    }

    /// Record that `source` set `key` to `value`.
    ///
    /// ```
    /// use confy::ProvenanceLedger;
    /// use serde_json::json;
    ///
    /// let mut ledger = ProvenanceLedger::new();
    /// ledger.record("db.port", json!(5432), "defaults");
    /// ledger.record("db.port", json!(6000), "env:APP_*");
    /// assert_eq!(ledger.get("db.port").map(|e| e.source.as_str()), Some("env:APP_*"));
    /// assert_eq!(ledger.history("db.port").len(), 2);
    /// ```
    pub fn record(&mut self, key: impl Into<String>, value: Value, source: impl Into<String>) {
        let dot_path: String = key.into();
        let entry = ProvenanceEntry {
            value,
            source: source.into(),
            key: dot_path.clone(),
        };
        if let Some(previous) = self.current.insert(dot_path.clone(), entry) {
            self.history.entry(dot_path).or_default().push(previous);
        }
    }

    /// The winning entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProvenanceEntry> {
        self.current.get(key)
    }

    /// Every entry recorded for `key`, oldest first, ending with the current
    /// one. Empty when `key` was never recorded.
    #[must_use]
    pub fn history(&self, key: &str) -> Vec<&ProvenanceEntry> {
        self.history
            .get(key)
            .into_iter()
            .flatten()
            .chain(self.current.get(key))
            .collect()
    }

    /// Snapshot of the current entry for every key.
    #[must_use]
    pub fn all_entries(&self) -> BTreeMap<String, ProvenanceEntry> {
        self.current.clone()
    }

    /// Iterate over current entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ProvenanceEntry> {
        self.current.values()
    }

    /// Number of keys with a current entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Count current entries per source category.
    ///
    /// `file:/etc/app.toml` and `file:local.json` both count towards `file`.
    #[must_use]
    pub fn sources_summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.current.values() {
            *counts.entry(entry.category().to_owned()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn unknown_key_has_no_history() {
        let ledger = ProvenanceLedger::new();
        assert!(ledger.get("missing").is_none());
        assert!(ledger.history("missing").is_empty());
        assert!(ledger.is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn history_length_matches_record_count(#[case] n: i64) {
        let mut ledger = ProvenanceLedger::new();
        for i in 0..n {
            ledger.record("key", json!(i), format!("source{i}"));
        }
        let history = ledger.history("key");
        let values: Vec<_> = history.iter().map(|e| e.value.clone()).collect();
        let expected: Vec<_> = (0..n).map(|i| json!(i)).collect();
        assert_eq!(values, expected);
        assert_eq!(history.last().copied(), ledger.get("key"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn summary_groups_by_category() {
        let mut ledger = ProvenanceLedger::new();
        ledger.record("a", json!(1), "defaults");
        ledger.record("b", json!(2), "file:one.toml");
        ledger.record("c", json!(3), "file:two.json");
        ledger.record("d", json!(4), "app_defaults:myapp");
        ledger.record("a", json!(5), "overrides_dict");

        let summary = ledger.sources_summary();
        assert_eq!(summary.get("file"), Some(&2));
        assert_eq!(summary.get("app_defaults"), Some(&1));
        assert_eq!(summary.get("overrides_dict"), Some(&1));
        assert_eq!(summary.get("defaults"), None);
    }

    #[test]
    fn entries_snapshot_is_detached() {
        let mut ledger = ProvenanceLedger::new();
        ledger.record("a", json!(1), "defaults");
        let snapshot = ledger.all_entries();
        ledger.record("a", json!(2), "initial");
        assert_eq!(snapshot.get("a").map(|e| &e.value), Some(&json!(1)));
    }

    #[test]
    fn entry_display_names_key_value_and_source() {
        let entry = ProvenanceEntry {
            value: json!("localhost"),
            source: "file:app.toml".into(),
            key: "db.host".into(),
        };
        assert_eq!(entry.to_string(), "db.host = \"localhost\"  \u{2190} file:app.toml");
        assert_eq!(entry.category(), "file");
    }
}
