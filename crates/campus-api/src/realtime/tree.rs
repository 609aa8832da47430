// ── Local subtree mirror ──
//
// Applies `put` / `patch` updates at relative paths to a JSON tree.
// Empty objects collapse to `null`, matching a store in which empty
// nodes do not exist.

use serde_json::{Map, Value};

use super::path_segments;

/// Replace the node at `path` (relative to `root`) with `data`.
/// Writing `null` deletes the node.
pub(crate) fn put(root: &mut Value, path: &str, data: Value) {
    set_at(root, &path_segments(path), data);
}

/// Merge each child of `data` into the node at `path`.
pub(crate) fn patch(root: &mut Value, path: &str, data: Value) {
    let Value::Object(children) = data else {
        put(root, path, data);
        return;
    };
    let base = path_segments(path);
    for (key, value) in children {
        let mut segments = base.clone();
        segments.push(key.as_str());
        set_at(root, &segments, value);
    }
}

/// Value of the node at `path`, or `null`.
pub(crate) fn get<'a>(root: &'a Value, path: &str) -> &'a Value {
    path_segments(path)
        .into_iter()
        .try_fold(root, |node, segment| node.get(segment))
        .unwrap_or(&Value::Null)
}

fn set_at(node: &mut Value, segments: &[&str], data: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = data;
        return;
    };

    if !node.is_object() {
        if data.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() && data.is_null() {
        map.remove(*first);
    } else {
        let now_empty = {
            let child = map.entry((*first).to_owned()).or_insert(Value::Null);
            set_at(child, rest, data);
            child.is_null()
        };
        if now_empty {
            map.remove(*first);
        }
    }

    if map.is_empty() {
        *node = Value::Null;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn put_at_root_replaces_everything() {
        let mut tree = json!({ "a": 1 });
        put(&mut tree, "/", json!({ "b": 2 }));
        assert_eq!(tree, json!({ "b": 2 }));
    }

    #[test]
    fn put_nested_creates_parents() {
        let mut tree = Value::Null;
        put(&mut tree, "/D118-1/status", json!("ON"));
        assert_eq!(tree, json!({ "D118-1": { "status": "ON" } }));
    }

    #[test]
    fn put_null_deletes_and_collapses() {
        let mut tree = json!({ "D118-1": { "status": "ON" } });
        put(&mut tree, "/D118-1/status", Value::Null);
        assert_eq!(tree, Value::Null);
    }

    #[test]
    fn patch_merges_children() {
        let mut tree = json!({
            "D118-1": { "status": "OFF" },
            "D118-2": { "status": "OFF" },
        });
        patch(
            &mut tree,
            "/",
            json!({ "D118-1": { "status": "ON" }, "D118-3": { "status": "ON" } }),
        );
        assert_eq!(
            tree,
            json!({
                "D118-1": { "status": "ON" },
                "D118-2": { "status": "OFF" },
                "D118-3": { "status": "ON" },
            })
        );
    }

    #[test]
    fn get_walks_segments() {
        let tree = json!({ "D118": { "D118-1": { "status": "ON" } } });
        assert_eq!(get(&tree, "D118/D118-1"), &json!({ "status": "ON" }));
        assert_eq!(get(&tree, "D117"), &Value::Null);
        assert_eq!(get(&tree, ""), &tree);
    }
}
