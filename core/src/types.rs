//! Typed model for OpenAPI fragments and the merged document.
//!
//! Only the fields the merger needs are declared. Deeply nested content
//! (request bodies, parameters, responses, component schema bodies) is kept
//! as raw [`serde_json::Value`] trees so it passes through untouched and the
//! fidelity check can still prove nothing was lost.
//!
//! Which fields are always serialized matters: a field that is always
//! written back shows up as an added value in the fidelity report when a
//! fragment omits it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Operations of a single path, keyed by HTTP method (`get`, `post`, ...).
pub type PathItem = BTreeMap<String, Operation>;

/// Top-level API document.
///
/// # Examples
///
/// ```
/// use openapi_fragments_core::ApiDocument;
///
/// let doc = ApiDocument::new("3.0.1", "My API", "1.0.0");
/// assert_eq!(doc.info.title, "My API");
/// assert!(doc.paths.is_empty());
/// assert_eq!(doc.operation_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiDocument {
    /// Format version (e.g. `"3.0.1"`).
    #[serde(default)]
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl ApiDocument {
    /// Creates an empty document with the given metadata.
    pub fn new(
        openapi: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            openapi: openapi.into(),
            info: Info {
                title: title.into(),
                version: version.into(),
            },
            paths: BTreeMap::new(),
            components: None,
        }
    }

    /// Returns the operation registered for `path` and `method`.
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    /// Returns a component schema body by name.
    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.components
            .as_ref()
            .and_then(|components| components.schemas.get(name))
    }

    /// Total number of path+method entries.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(BTreeMap::len).sum()
    }

    /// Number of named component schemas.
    pub fn schema_count(&self) -> usize {
        self.components
            .as_ref()
            .map_or(0, |components| components.schemas.len())
    }
}

/// Document metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

/// One HTTP-method handler under one path.
///
/// `request_body`, `parameters` and `responses` are opaque passthrough
/// blocks; they are carried as-is and never interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub summary: String,
    #[serde(
        rename = "operationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// `Some(Value::Null)` keeps an explicit `requestBody: null`.
    #[serde(
        rename = "requestBody",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Value>>,
    #[serde(default)]
    pub responses: Value,
}

/// Deserializes a field that is present in the source, null included.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Reusable components. Only `schemas` is modeled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    /// Schema bodies keyed by their unique name.
    #[serde(default)]
    pub schemas: BTreeMap<String, Value>,
}
