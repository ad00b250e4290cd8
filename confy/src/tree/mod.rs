//! The resolved configuration tree and its two access surfaces.
//!
//! Name-based access ([`ConfigTree::field`], [`ConfigTree::insert`], ...)
//! addresses a single key of one mapping. Path-based access
//! ([`ConfigTree::get`], [`ConfigTree::set`], ...) walks dot-paths through
//! nested mappings. Both operate on the same underlying storage.

mod node;

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use indexmap::map;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub use node::Node;

use crate::path::{self, PathTable};
use crate::{ConfigError, ConfigResult, ConfigResultExt, PathError};

static EMPTY: LazyLock<ConfigTree> = LazyLock::new(ConfigTree::new);

/// A string-keyed mapping of configuration [`Node`]s.
///
/// Keys keep their insertion order, so a tree built from a file displays in
/// the file's order. Every nested mapping is itself a `ConfigTree`,
/// whichever way it was inserted.
///
/// # Examples
///
/// ```
/// use confy::ConfigTree;
/// use serde_json::json;
///
/// let mut tree = ConfigTree::try_from(json!({"db": {"port": 5432}}))?;
/// assert_eq!(tree.get("db.port").and_then(|n| n.as_i64()), Some(5432));
///
/// tree.set("db.pool.size", 8_i64);
/// assert!(tree.contains("db.pool.size"));
/// assert!(tree.field("db").and_then(|n| n.as_tree()).is_some());
/// # Ok::<(), std::sync::Arc<confy::ConfigError>>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    entries: IndexMap<String, Node>,
}

impl ConfigTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the tree has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over top-level entries in insertion order.
    pub fn iter(&self) -> map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    /// Borrow the node stored directly under `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    /// Mutably borrow the node stored directly under `name`.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries.get_mut(name)
    }

    /// Store `value` directly under `name`, returning any previous node.
    ///
    /// Replacing a key keeps its position; a new key goes last.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.entries.insert(name.into(), value.into())
    }

    /// Remove and return the node stored directly under `name`, keeping the
    /// order of the remaining keys.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.entries.shift_remove(name)
    }

    /// Resolve a dot-path, folding any failure into `None`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Node> {
        self.try_get(path).ok()
    }

    /// Resolve a dot-path and deserialise the node into `T`.
    ///
    /// Returns `None` when the path is absent or the node has the wrong
    /// shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|node| node.extract().ok())
    }

    /// Resolve a dot-path, returning a copy of `default` when it is absent.
    #[must_use]
    pub fn get_or(&self, path: &str, default: impl Into<Node>) -> Node {
        self.get(path).cloned().unwrap_or_else(|| default.into())
    }

    /// Resolve a dot-path, reporting where resolution stopped.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when a segment is missing or a non-mapping is
    /// indexed.
    pub fn try_get(&self, path: &str) -> Result<&Node, PathError> {
        path::get(self, path)
    }

    /// Returns `true` when `path` resolves.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        path::contains(self, path)
    }

    /// Install `value` at `path`, creating intermediate mappings.
    ///
    /// A scalar or sequence standing where an intermediate mapping is needed
    /// is replaced by an empty mapping.
    pub fn set(&mut self, path: &str, value: impl Into<Node>) {
        if let Err(err) = path::set(self, path, value.into(), true) {
            warn!(path, %err, "failed to set configuration value");
        }
    }

    /// Install `value` at `path` without creating intermediates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Path`] when an intermediate segment is absent
    /// or is not a mapping.
    pub fn try_set(&mut self, path: &str, value: impl Into<Node>) -> ConfigResult<()> {
        path::set(self, path, value.into(), false).into_config()
    }

    /// The subtree stored under the namespace `tag`.
    ///
    /// Returns a shared empty tree when `tag` is absent or not a mapping.
    /// The returned reference borrows from `self`, so repeated calls observe
    /// the same subtree.
    #[must_use]
    pub fn app(&self, tag: &str) -> &Self {
        self.field(tag).and_then(Node::as_tree).unwrap_or(&*EMPTY)
    }

    /// Independent plain copy of the whole tree.
    #[must_use]
    pub fn to_plain_tree(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(key, node)| (key.clone(), node.to_value()))
            .collect()
    }

    /// Consume the tree into plain `serde_json` data.
    #[must_use]
    pub fn into_plain_tree(self) -> Map<String, Value> {
        self.entries
            .into_iter()
            .map(|(key, node)| (key, Value::from(node)))
            .collect()
    }

    /// Deserialise the whole tree into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Deserialize`] when the tree does not
    /// match `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_json::from_value(Value::Object(self.to_plain_tree())).into_config()
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().map(|(key, value)| (key, Node::from(value))).collect()
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = Arc<ConfigError>;

    fn try_from(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(Arc::new(ConfigError::InvalidLayer {
                layer: "tree".to_owned(),
                found: Node::from(other).kind(),
            })),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, node)| (key.into(), node)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConfigTree {
    type Item = (&'a String, &'a Node);
    type IntoIter = map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq<Map<String, Value>> for ConfigTree {
    fn eq(&self, other: &Map<String, Value>) -> bool {
        self.len() == other.len()
            && other
                .iter()
                .all(|(key, value)| self.field(key).is_some_and(|node| node == value))
    }
}

impl PathTable for ConfigTree {
    type Node = Node;

    fn entry(&self, key: &str) -> Option<&Node> {
        self.field(key)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.field_mut(key)
    }

    fn put(&mut self, key: String, node: Node) {
        self.entries.insert(key, node);
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "ConfigTree({rendered})")
    }
}
