//! Individual nodes of a resolved configuration tree.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use super::ConfigTree;
use crate::path::PathNode;
use crate::{ConfigResult, ConfigResultExt};

/// A value inside a [`ConfigTree`].
///
/// Mappings are always represented by [`Node::Mapping`], including those
/// nested inside sequences, so every mapping reachable from the root offers
/// the same access surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Explicit null.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer or floating-point scalar.
    Number(Number),
    /// String scalar.
    String(String),
    /// Ordered sequence of nodes.
    Sequence(Vec<Node>),
    /// Nested mapping.
    Mapping(ConfigTree),
}

impl Node {
    /// Borrow the nested mapping.
    #[must_use]
    pub const fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            Self::Mapping(tree) => Some(tree),
            _ => None,
        }
    }

    /// Mutably borrow the nested mapping.
    #[must_use]
    pub const fn as_tree_mut(&mut self) -> Option<&mut ConfigTree> {
        match self {
            Self::Mapping(tree) => Some(tree),
            _ => None,
        }
    }

    /// Borrow the string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Copy out the boolean scalar.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number as `i64` when it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// The number as `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Borrow the sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for [`Node::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the node's kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Independent plain copy of this node.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Mapping(tree) => Value::Object(tree.to_plain_tree()),
        }
    }

    /// Deserialise this node into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Deserialize`] when the shape does not
    /// match `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_json::from_value(self.to_value()).into_config()
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(ConfigTree::from(map)),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Null => Self::Null,
            Node::Bool(b) => Self::Bool(b),
            Node::Number(n) => Self::Number(n),
            Node::String(s) => Self::String(s),
            Node::Sequence(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Node::Mapping(tree) => Self::Object(tree.into_plain_tree()),
        }
    }
}

impl From<ConfigTree> for Node {
    fn from(tree: ConfigTree) -> Self {
        Self::Mapping(tree)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Vec<Self>> for Node {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }
}

impl PartialEq<Value> for Node {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Value::Null) => true,
            (Self::Bool(a), Value::Bool(b)) => a == b,
            (Self::Number(a), Value::Number(b)) => a == b,
            (Self::String(a), Value::String(b)) => a == b,
            (Self::Sequence(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (Self::Mapping(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl PathNode for Node {
    type Table = ConfigTree;

    fn as_table(&self) -> Option<&ConfigTree> {
        self.as_tree()
    }

    fn as_table_mut(&mut self) -> Option<&mut ConfigTree> {
        self.as_tree_mut()
    }

    fn from_table(table: ConfigTree) -> Self {
        Self::Mapping(table)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(items) => items.serialize(serializer),
            Self::Mapping(tree) => tree.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}
