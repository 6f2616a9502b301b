//! Slash-separated store paths and JSON tree navigation.

use serde_json::{Map, Value};

use crate::core::StoreError;

/// Root under which match records live.
pub const GAMES_ROOT: &str = "games";

/// Path of a room's match record.
#[must_use]
pub fn match_path(room_id: &str) -> String {
    format!("{GAMES_ROOT}/{room_id}")
}

/// Split a path into segments. Empty paths and empty segments are rejected.
pub fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let parts: Vec<&str> = path.split('/').collect();
    if path.is_empty() || parts.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// Whether a write at `written` can change the value seen at `watched`.
///
/// True when either path is a prefix of the other, segment-wise.
#[must_use]
pub fn touches(written: &[String], watched: &[String]) -> bool {
    written.iter().zip(watched).all(|(a, b)| a == b)
}

/// Value at `path`, if present and not null.
#[must_use]
pub fn get_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for seg in path {
        node = node.as_object()?.get(*seg)?;
    }
    (!node.is_null()).then_some(node)
}

/// Set the value at `path`, creating intermediate objects.
///
/// Writing `Null` deletes the key, and is a no-op when any node on the way
/// is missing. A non-object found on the way is replaced by an object.
pub fn set_at(root: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    if value.is_null() {
        remove_at(root, parents, last);
        return;
    }

    let mut node = root;
    for seg in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else { return };
        node = map
            .entry((*seg).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        map.insert((*last).to_string(), value);
    }
}

fn remove_at(root: &mut Value, parents: &[&str], last: &str) {
    let mut node = root;
    for seg in parents {
        let Some(child) = node.as_object_mut().and_then(|map| map.get_mut(*seg)) else {
            return;
        };
        node = child;
    }
    if let Some(map) = node.as_object_mut() {
        map.remove(last);
    }
}
