//! Dot-path addressing over nested mapping trees.
//!
//! A dot-path such as `database.host` names one mapping key per segment.
//! Splitting is purely syntactic: keys containing a literal `.` cannot be
//! addressed.
//!
//! The algorithms are generic over [`PathTable`] and [`PathNode`] so that
//! the same code serves raw `serde_json` maps during resolution and the
//! wrapped [`crate::ConfigTree`] afterwards.

use serde_json::{Map, Value};
use tracing::warn;

use crate::PathError;

/// A string-keyed mapping that can be walked by dot-path.
pub trait PathTable: Default {
    /// Node type stored under each key.
    type Node: PathNode<Table = Self>;

    /// Borrow the node stored under `key`.
    fn entry(&self, key: &str) -> Option<&Self::Node>;

    /// Mutably borrow the node stored under `key`.
    fn entry_mut(&mut self, key: &str) -> Option<&mut Self::Node>;

    /// Insert or replace the node stored under `key`.
    fn put(&mut self, key: String, node: Self::Node);
}

/// A tree node that may itself hold a [`PathTable`].
pub trait PathNode: Sized {
    /// Mapping type nested inside this node.
    type Table: PathTable<Node = Self>;

    /// View the node as a mapping when it is one.
    fn as_table(&self) -> Option<&Self::Table>;

    /// Mutable view of the node as a mapping when it is one.
    fn as_table_mut(&mut self) -> Option<&mut Self::Table>;

    /// Wrap a mapping into a node.
    fn from_table(table: Self::Table) -> Self;
}

impl PathTable for Map<String, Value> {
    type Node = Value;

    fn entry(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.get_mut(key)
    }

    fn put(&mut self, key: String, node: Value) {
        self.insert(key, node);
    }
}

impl PathNode for Value {
    type Table = Map<String, Value>;

    fn as_table(&self) -> Option<&Self::Table> {
        self.as_object()
    }

    fn as_table_mut(&mut self) -> Option<&mut Self::Table> {
        self.as_object_mut()
    }

    fn from_table(table: Self::Table) -> Self {
        Self::Object(table)
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Resolve `path` inside `table`.
///
/// # Errors
///
/// Returns [`PathError::KeyNotFound`] naming the first missing segment and
/// [`PathError::NotTraversable`] when a scalar or sequence is indexed as if
/// it were a mapping.
///
/// # Examples
///
/// ```
/// use confy::path;
/// use serde_json::json;
///
/// let tree = json!({"db": {"port": 5432}});
/// let table = tree.as_object().expect("object");
/// assert_eq!(path::get(table, "db.port").ok(), Some(&json!(5432)));
/// assert!(path::get(table, "db.host").is_err());
/// ```
pub fn get<'a, T: PathTable>(table: &'a T, path: &str) -> Result<&'a T::Node, PathError> {
    let segments = split(path);
    let Some((last, parents)) = segments.split_last() else {
        return Err(PathError::key_not_found(path, path, &[]));
    };
    let mut current = table;
    for (depth, segment) in parents.iter().enumerate() {
        let step = Step::new(parents, depth, last);
        let node = current
            .entry(segment)
            .ok_or_else(|| PathError::key_not_found(path, segment, step.before))?;
        current = node
            .as_table()
            .ok_or_else(|| PathError::not_traversable(path, step.next, step.through))?;
    }
    current
        .entry(last)
        .ok_or_else(|| PathError::key_not_found(path, last, parents))
}

/// Returns `true` when [`get`] would succeed.
#[must_use]
pub fn contains<T: PathTable>(table: &T, path: &str) -> bool {
    get(table, path).is_ok()
}

/// Install `value` at `path`.
///
/// With `create_missing` set, absent intermediate segments become empty
/// mappings and a non-mapping intermediate is overwritten by an empty
/// mapping. Without it, intermediates must already be mappings. The final
/// segment is always inserted or replaced.
///
/// # Errors
///
/// Only when `create_missing` is `false`: the same errors as [`get`] for the
/// intermediate segments.
///
/// # Examples
///
/// ```
/// use confy::path;
/// use serde_json::{Map, Value, json};
///
/// let mut table = Map::new();
/// path::set(&mut table, "a.b.c", json!(1), true).expect("created");
/// assert_eq!(Value::Object(table), json!({"a": {"b": {"c": 1}}}));
/// ```
pub fn set<T: PathTable>(
    table: &mut T,
    path: &str,
    value: T::Node,
    create_missing: bool,
) -> Result<(), PathError> {
    let segments = split(path);
    let Some((last, parents)) = segments.split_last() else {
        return Err(PathError::key_not_found(path, path, &[]));
    };
    let mut current = table;
    for (depth, segment) in parents.iter().enumerate() {
        let step = Step::new(parents, depth, last);
        current = descend(current, path, segment, &step, create_missing)?;
    }
    current.put((*last).to_owned(), value);
    Ok(())
}

/// Position of one intermediate segment within a split path.
struct Step<'p> {
    /// Segments preceding the current one.
    before: &'p [&'p str],
    /// Segments up to and including the current one.
    through: &'p [&'p str],
    /// Segment applied after the current one.
    next: &'p str,
}

impl<'p> Step<'p> {
    fn new(parents: &'p [&'p str], depth: usize, last: &'p str) -> Self {
        Self {
            before: parents.get(..depth).unwrap_or_default(),
            through: parents.get(..=depth).unwrap_or_default(),
            next: parents.get(depth + 1).copied().unwrap_or(last),
        }
    }
}

fn descend<'a, T: PathTable>(
    table: &'a mut T,
    path: &str,
    segment: &str,
    step: &Step<'_>,
    create_missing: bool,
) -> Result<&'a mut T, PathError> {
    let traversable = table.entry(segment).map(|node| node.as_table().is_some());
    match traversable {
        Some(true) => {}
        None if create_missing => table.put(segment.to_owned(), T::Node::from_table(T::default())),
        Some(false) if create_missing => {
            warn!(path, segment, "overwriting non-mapping value with an empty mapping");
            table.put(segment.to_owned(), T::Node::from_table(T::default()));
        }
        None => return Err(PathError::key_not_found(path, segment, step.before)),
        Some(false) => return Err(PathError::not_traversable(path, step.next, step.through)),
    }
    table
        .entry_mut(segment)
        .and_then(PathNode::as_table_mut)
        .ok_or_else(|| PathError::key_not_found(path, segment, step.before))
}
