//! Flat/nested transform for JSON locale documents
//!
//! Locale files are nested JSON objects:
//!
//! ```json
//! { "menu": { "file": "File", "edit": "Edit" }, "title": "Editor" }
//! ```
//!
//! The synchronizer works on the flattened form, where every leaf is keyed by
//! the `/`-joined path of its ancestors:
//!
//! ```text
//! menu/file -> File
//! menu/edit -> Edit
//! title     -> Editor
//! ```
//!
//! [`nest`] reverses [`flatten`], and [`canonicalize`] sorts every object so
//! that serialized output does not depend on map iteration order.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{DocumentError, DocumentResult};

/// Separator between segments of a key-path
pub const PATH_SEPARATOR: char = '/';

/// Flat mapping from key-path to string value, in document order
pub type FlatEntries = IndexMap<String, String>;

/// Flatten a nested JSON tree into key-path entries
///
/// The root must be an object. Strings are taken verbatim, numbers and
/// booleans use their JSON text. `null`, arrays, empty keys and keys that
/// contain `/` are rejected, since they would not survive [`nest`].
///
/// Empty objects have no leaves and produce no entries, so `{"group": {}}`
/// comes back from [`nest`] without `group`.
pub fn flatten(tree: &Value) -> DocumentResult<FlatEntries> {
    let root = tree.as_object().ok_or_else(|| {
        DocumentError::MalformedDocument("root must be a JSON object".to_string())
    })?;

    let mut entries = FlatEntries::new();
    flatten_into(root, "", &mut entries)?;
    Ok(entries)
}

fn flatten_into(
    object: &Map<String, Value>,
    prefix: &str,
    out: &mut FlatEntries,
) -> DocumentResult<()> {
    for (key, value) in object {
        if key.is_empty() {
            return Err(DocumentError::MalformedDocument(format!(
                "empty key under '{}'",
                display_prefix(prefix)
            )));
        }
        if key.contains(PATH_SEPARATOR) {
            return Err(DocumentError::MalformedDocument(format!(
                "key '{}' under '{}' contains '{}'",
                key,
                display_prefix(prefix),
                PATH_SEPARATOR
            )));
        }

        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, PATH_SEPARATOR, key)
        };

        match value {
            Value::Object(child) => flatten_into(child, &path, out)?,
            leaf => {
                let text = stringify_leaf(leaf).ok_or_else(|| {
                    DocumentError::MalformedDocument(format!(
                        "value at '{}' is not a string, number or boolean",
                        path
                    ))
                })?;
                out.insert(path, text);
            }
        }
    }
    Ok(())
}

fn stringify_leaf(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() { "<root>" } else { prefix }
}

/// Rebuild a nested JSON tree from key-path entries
///
/// Intermediate objects are created on demand. A path that is used both as a
/// leaf and as a group (`a` and `a/b`) is a [`DocumentError::ConflictingPath`].
pub fn nest<'a, I>(entries: I) -> DocumentResult<Value>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut root = Map::new();

    for (path, value) in entries {
        if path.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(DocumentError::MalformedDocument(format!(
                "key path '{}' has an empty segment",
                path
            )));
        }

        let (parents, last): (Vec<&str>, &str) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((group, leaf)) => (group.split(PATH_SEPARATOR).collect(), leaf),
            None => (Vec::new(), path.as_str()),
        };

        let mut current = &mut root;
        for (depth, segment) in parents.iter().enumerate() {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match slot {
                Value::Object(child) => child,
                _ => {
                    return Err(DocumentError::ConflictingPath(
                        parents[..=depth].join("/"),
                    ));
                }
            };
        }

        if current.contains_key(last) {
            // Either a group already lives here or the path was duplicated.
            return Err(DocumentError::ConflictingPath(path.clone()));
        }
        current.insert(last.to_string(), Value::String(value.clone()));
    }

    Ok(Value::Object(root))
}

/// Sort object keys byte-wise at every level; leaves are left as they are
pub fn canonicalize(tree: Value) -> Value {
    match tree {
        Value::Object(map) => {
            let mut pairs: Vec<(String, Value)> = map.into_iter().collect();
            pairs.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        other => other,
    }
}

/// Serialize flat entries as canonical, pretty-printed JSON
///
/// Output uses two-space indentation and ends with a newline. Equal entry
/// sets always produce identical text, whatever their insertion order.
pub fn to_canonical_json(entries: &FlatEntries) -> DocumentResult<String> {
    let tree = canonicalize(nest(entries)?);
    let mut text = serde_json::to_string_pretty(&tree).map_err(|e| {
        DocumentError::MalformedDocument(format!("failed to serialize document: {}", e))
    })?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(pairs: &[(&str, &str)]) -> FlatEntries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flatten_nested_object() {
        let tree = json!({
            "title": "Editor",
            "menu": { "file": "File", "edit": { "undo": "Undo" } }
        });
        let flat = flatten(&tree).unwrap();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat["title"], "Editor");
        assert_eq!(flat["menu/file"], "File");
        assert_eq!(flat["menu/edit/undo"], "Undo");
    }

    #[test]
    fn test_flatten_keeps_document_order() {
        let tree: Value = serde_json::from_str(r#"{"z": "1", "a": {"y": "2", "b": "3"}}"#).unwrap();
        let flat = flatten(&tree).unwrap();
        let keys: Vec<&String> = flat.keys().collect();
        assert_eq!(keys, vec!["z", "a/y", "a/b"]);
    }

    #[test]
    fn test_flatten_stringifies_scalars() {
        let tree = json!({ "count": 3, "ratio": 1.5, "enabled": true });
        let flat = flatten(&tree).unwrap();
        assert_eq!(flat["count"], "3");
        assert_eq!(flat["ratio"], "1.5");
        assert_eq!(flat["enabled"], "true");
    }

    #[test]
    fn test_flatten_rejects_unstringifiable_leaves() {
        for tree in [json!({ "a": null }), json!({ "a": ["x", "y"] })] {
            match flatten(&tree) {
                Err(DocumentError::MalformedDocument(msg)) => assert!(msg.contains("'a'")),
                other => panic!("Expected MalformedDocument, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_flatten_rejects_bad_keys() {
        assert!(matches!(
            flatten(&json!({ "": "x" })),
            Err(DocumentError::MalformedDocument(_))
        ));
        assert!(matches!(
            flatten(&json!({ "a": { "": "x" } })),
            Err(DocumentError::MalformedDocument(_))
        ));
        // "a/b" as a literal key would collide with the nested path a -> b
        assert!(matches!(
            flatten(&json!({ "a/b": "x", "a": { "b": "y" } })),
            Err(DocumentError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_flatten_rejects_non_object_root() {
        assert!(flatten(&json!(["a"])).is_err());
        assert!(flatten(&json!("a")).is_err());
    }

    #[test]
    fn test_flatten_empty_object_yields_nothing() {
        let flat = flatten(&json!({ "group": {} })).unwrap();
        assert!(flat.is_empty());
    }

    #[test]
    fn test_nest_builds_groups() {
        let flat = entries(&[("menu/file", "File"), ("menu/edit", "Edit"), ("title", "T")]);
        let tree = nest(&flat).unwrap();
        assert_eq!(
            tree,
            json!({ "menu": { "file": "File", "edit": "Edit" }, "title": "T" })
        );
    }

    #[test]
    fn test_nest_conflict_leaf_then_group() {
        let flat = entries(&[("a", "x"), ("a/b", "y")]);
        match nest(&flat) {
            Err(DocumentError::ConflictingPath(path)) => assert_eq!(path, "a"),
            other => panic!("Expected ConflictingPath, got {:?}", other),
        }
    }

    #[test]
    fn test_nest_conflict_group_then_leaf() {
        let flat = entries(&[("a/b", "y"), ("a", "x")]);
        match nest(&flat) {
            Err(DocumentError::ConflictingPath(path)) => assert_eq!(path, "a"),
            other => panic!("Expected ConflictingPath, got {:?}", other),
        }
    }

    #[test]
    fn test_nest_conflict_reports_deepest_leaf() {
        let flat = entries(&[("a/b", "x"), ("a/b/c", "y")]);
        match nest(&flat) {
            Err(DocumentError::ConflictingPath(path)) => assert_eq!(path, "a/b"),
            other => panic!("Expected ConflictingPath, got {:?}", other),
        }
    }

    #[test]
    fn test_nest_rejects_empty_segment() {
        for path in ["a//b", "/a", "a/"] {
            let flat = entries(&[(path, "x")]);
            assert!(
                matches!(nest(&flat), Err(DocumentError::MalformedDocument(_))),
                "path {:?} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_round_trip_law() {
        let tree: Value = serde_json::from_str(
            r#"{
                "zeta": "last",
                "nav": { "home": "Home", "about": { "team": "Team", "jobs": "Jobs" } },
                "alpha": "first"
            }"#,
        )
        .unwrap();

        let flat = flatten(&tree).unwrap();
        let nested = nest(&flat).unwrap();
        assert_eq!(nested, canonicalize(tree.clone()));
        assert_eq!(flatten(&nested).unwrap(), flat);
    }

    #[test]
    fn test_canonicalize_sorts_every_level() {
        let tree: Value =
            serde_json::from_str(r#"{"b": {"y": "1", "x": "2"}, "a": "3", "B": "4"}"#).unwrap();
        let text = serde_json::to_string(&canonicalize(tree)).unwrap();
        assert_eq!(text, r#"{"B":"4","a":"3","b":{"x":"2","y":"1"}}"#);
    }

    #[test]
    fn test_canonical_json_is_order_independent() {
        let first = entries(&[("b", "2"), ("a/y", "1"), ("a/x", "0")]);
        let second = entries(&[("a/x", "0"), ("b", "2"), ("a/y", "1")]);
        let text = to_canonical_json(&first).unwrap();
        assert_eq!(text, to_canonical_json(&second).unwrap());
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"x\": \"0\",\n    \"y\": \"1\"\n  },\n  \"b\": \"2\"\n}\n"
        );
    }
}
