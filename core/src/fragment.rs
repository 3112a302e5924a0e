//! Fragment parsing: one file's bytes into an untyped tree and a typed model.
//!
//! Both representations go through the same YAML-to-JSON conversion, so
//! they agree on key normalization (numeric response codes become string
//! keys, YAML tags are dropped). JSON input is accepted as a YAML subset.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::{MergeError, Result};
use crate::types::ApiDocument;

/// Separator between a fragment's tag and the rest of its file name.
pub const TAG_SEPARATOR: char = '.';

/// One parsed input file.
///
/// `untyped` keeps every field of the source; `typed` keeps only what
/// [`ApiDocument`] declares.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// File name the fragment was read from (e.g. `mailboxes.yaml`).
    pub name: String,
    /// Tag injected into this fragment's operations, if its name has one.
    pub tag: Option<String>,
    pub untyped: Value,
    pub typed: ApiDocument,
}

impl Fragment {
    /// Parses both representations of a fragment from the same bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Parse`] naming the fragment if the bytes are not
    /// a valid document or do not fit the typed model.
    ///
    /// # Examples
    ///
    /// ```
    /// use openapi_fragments_core::Fragment;
    ///
    /// let yaml = b"openapi: 3.0.1\ninfo: {title: t, version: '1'}\npaths: {}\n";
    /// let fragment = Fragment::parse("users.yaml", yaml).unwrap();
    /// assert_eq!(fragment.tag.as_deref(), Some("users"));
    /// assert!(fragment.typed.paths.is_empty());
    /// ```
    pub fn parse(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let untyped = parse_untyped(&name, bytes)?;
        let typed = typed_from_tree(&name, untyped.clone())?;
        Ok(Self {
            tag: derive_tag(&name),
            name,
            untyped,
            typed,
        })
    }
}

/// Derives the operation tag from a fragment file name.
///
/// The tag is everything before the first `.`; a name without one yields
/// no tag.
///
/// # Examples
///
/// ```
/// use openapi_fragments_core::derive_tag;
///
/// assert_eq!(derive_tag("mailboxes.extra.yaml").as_deref(), Some("mailboxes"));
/// assert_eq!(derive_tag("readme"), None);
/// ```
pub fn derive_tag(name: &str) -> Option<String> {
    name.split_once(TAG_SEPARATOR).map(|(tag, _)| tag.to_string())
}

/// Parses bytes into a generic tree preserving every field.
///
/// Merge keys (`<<: *anchor`) are expanded before conversion.
pub fn parse_untyped(name: &str, bytes: &[u8]) -> Result<Value> {
    let mut yaml: YamlValue =
        serde_yaml::from_slice(bytes).map_err(|e| MergeError::parse(name, e))?;
    yaml.apply_merge().map_err(|e| MergeError::parse(name, e))?;
    yaml_to_json(yaml).map_err(|e| MergeError::parse(name, e))
}

/// Parses bytes into the constrained typed model.
pub fn parse_typed(name: &str, bytes: &[u8]) -> Result<ApiDocument> {
    typed_from_tree(name, parse_untyped(name, bytes)?)
}

/// Serializes a typed model back into tree shape for comparison.
pub fn serialize_tree(document: &ApiDocument) -> Result<Value> {
    serde_json::to_value(document).map_err(|e| MergeError::Serialize(e.to_string()))
}

/// Serializes a document as YAML for output.
pub fn to_yaml(document: &ApiDocument) -> Result<String> {
    serde_yaml::to_string(document).map_err(|e| MergeError::Serialize(e.to_string()))
}

fn typed_from_tree(name: &str, tree: Value) -> Result<ApiDocument> {
    serde_json::from_value(tree).map_err(|e| MergeError::parse(name, e))
}

fn yaml_to_json(value: YamlValue) -> std::result::Result<Value, String> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => Value::Number(yaml_number(&n)?),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<_, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = yaml_key(key)?;
                if object.contains_key(&key) {
                    return Err(format!("duplicate key '{key}'"));
                }
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> std::result::Result<Number, String> {
    if let Some(i) = n.as_i64() {
        Ok(Number::from(i))
    } else if let Some(u) = n.as_u64() {
        Ok(Number::from(u))
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| format!("unsupported number '{n}'"))
    }
}

fn yaml_key(key: YamlValue) -> std::result::Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_derive_tag_uses_first_separator() {
        assert_eq!(derive_tag("mailboxes.extra.yaml").as_deref(), Some("mailboxes"));
        assert_eq!(derive_tag("users.yaml").as_deref(), Some("users"));
        assert_eq!(derive_tag(".hidden").as_deref(), Some(""));
        assert_eq!(derive_tag("readme"), None);
    }

    #[test]
    fn test_numeric_keys_become_strings() {
        let tree = parse_untyped("f", b"responses:\n  200:\n    description: ok\n").unwrap();
        assert_eq!(tree, json!({"responses": {"200": {"description": "ok"}}}));
    }

    #[test]
    fn test_json_input_is_accepted() {
        let tree = parse_untyped("f.json", br#"{"paths": {}, "x": [1, 2.5, true, null]}"#).unwrap();
        assert_eq!(tree, json!({"paths": {}, "x": [1, 2.5, true, null]}));
    }

    #[test]
    fn test_tags_are_stripped() {
        let tree = parse_untyped("f", b"value: !custom {a: 1}\n").unwrap();
        assert_eq!(tree, json!({"value": {"a": 1}}));
    }

    #[test]
    fn test_merge_keys_are_expanded() {
        let yaml = "\
base: &base {summary: s, responses: {}}
op:
  <<: *base
  operationId: createA
";
        let tree = parse_untyped("f", yaml.as_bytes()).unwrap();
        assert_eq!(
            tree["op"],
            json!({"summary": "s", "responses": {}, "operationId": "createA"})
        );
    }

    #[test]
    fn test_colliding_keys_are_rejected() {
        let err = parse_untyped("f", b"200: a\n'200': b\n").unwrap_err();
        assert!(matches!(err, MergeError::Parse { ref fragment, .. } if fragment == "f"));
    }

    #[test]
    fn test_complex_keys_are_rejected() {
        assert!(parse_untyped("f", b"? [a, b]\n: c\n").is_err());
    }

    #[test]
    fn test_invalid_yaml_names_fragment() {
        let err = parse_untyped("broken.yaml", b"paths: [unclosed\n").unwrap_err();
        assert_eq!(err.fragment(), Some("broken.yaml"));
    }

    #[test]
    fn test_typed_parse_rejects_wrong_shape() {
        let err = parse_typed("bad.yaml", b"paths:\n  /a: [1, 2]\n").unwrap_err();
        assert!(matches!(err, MergeError::Parse { .. }));
    }

    #[test]
    fn test_to_yaml_omits_absent_components() {
        let doc = ApiDocument::new("3.0.1", "t", "1");
        let yaml = to_yaml(&doc).unwrap();
        assert!(yaml.contains("3.0.1"));
        assert!(!yaml.contains("components"));
    }
}
