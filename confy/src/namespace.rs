//! Nesting a file's content under an application namespace.

use serde_json::{Map, Value};
use tracing::debug;

/// Key under which pyproject-style files group per-tool sections.
const TOOL_KEY: &str = "tool";

/// Nest `data` under `tag`, unless the file already did so.
///
/// Detection order:
///
/// 1. A top-level mapping named `tag`: only that mapping is kept.
/// 2. A `tool.<tag>` mapping: it is lifted to `tag`.
/// 3. Otherwise the whole of `data` is wrapped.
///
/// # Examples
///
/// ```
/// use confy::namespace::apply_namespace;
/// use serde_json::{Value, json};
///
/// let Value::Object(data) = json!({"tool": {"myapp": {"level": 3}}}) else { unreachable!() };
/// let tagged = apply_namespace(data, "myapp");
/// assert_eq!(Value::Object(tagged), json!({"myapp": {"level": 3}}));
/// ```
#[must_use]
pub fn apply_namespace(mut data: Map<String, Value>, tag: &str) -> Map<String, Value> {
    let inner = match data.get_mut(tag) {
        Some(Value::Object(own)) => {
            debug!(tag, "file is already namespaced");
            std::mem::take(own)
        }
        _ => take_tool_section(&mut data, tag).unwrap_or(data),
    };
    let mut tagged = Map::new();
    tagged.insert(tag.to_owned(), Value::Object(inner));
    tagged
}

fn take_tool_section(data: &mut Map<String, Value>, tag: &str) -> Option<Map<String, Value>> {
    match data.get_mut(TOOL_KEY)?.get_mut(tag)? {
        Value::Object(section) => {
            debug!(tag, "lifting tool section");
            Some(std::mem::take(section))
        }
        _ => None,
    }
}
