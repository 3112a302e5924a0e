//! Merging fragments into one combined document.
//!
//! Path operations are unioned and tagged with their source fragment's tag.
//! Component schemas are unioned by name; a repeated name is fatal. A
//! repeated path+method is, by default, silently replaced by the later
//! fragment (see [`PathCollisionPolicy`]).
//!
//! Both collision behaviors depend on fragment order, so fragments must be
//! added in a fixed order. [`merge`] sorts by fragment name.
//!
//! # Example
//!
//! ```
//! use openapi_fragments_core::{Fragment, MergeConfig, merge};
//!
//! let a = Fragment::parse(
//!     "users.yaml",
//!     b"paths:\n  /users:\n    get: {summary: list, responses: {}}\n",
//! ).unwrap();
//! let b = Fragment::parse(
//!     "groups.yaml",
//!     b"paths:\n  /groups:\n    post: {summary: create, responses: {}}\n",
//! ).unwrap();
//!
//! let merged = merge(&MergeConfig::default(), vec![a, b]).unwrap();
//! assert_eq!(merged.operation_count(), 2);
//! assert_eq!(
//!     merged.operation("/users", "get").unwrap().tags,
//!     Some(vec!["users".to_string()]),
//! );
//! ```

use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MergeError, Result};
use crate::fragment::Fragment;
use crate::types::{ApiDocument, Components};

/// Format version written to the merged document by default.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.1";
/// Title written to the merged document by default.
pub const DEFAULT_TITLE: &str = "Apache JAMES Web Admin API";
/// API version written to the merged document by default.
pub const DEFAULT_API_VERSION: &str = "3.8.0";

/// What happens when two fragments define the same path and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathCollisionPolicy {
    /// The later fragment's operation replaces the earlier one.
    #[default]
    Overwrite,
    /// A repeated path+method fails the merge. This is stricter than the
    /// historical behavior and changes which inputs are accepted.
    Reject,
}

/// Fixed output metadata and collision behavior for a merge.
///
/// The metadata never comes from fragments.
///
/// # Examples
///
/// ```
/// use openapi_fragments_core::{MergeConfig, PathCollisionPolicy};
///
/// let config: MergeConfig = serde_yaml::from_str("title: Internal API\n").unwrap();
/// assert_eq!(config.title, "Internal API");
/// assert_eq!(config.openapi, "3.0.1");
/// assert_eq!(config.path_collisions, PathCollisionPolicy::Overwrite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub openapi: String,
    pub title: String,
    pub version: String,
    pub path_collisions: PathCollisionPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            path_collisions: PathCollisionPolicy::default(),
        }
    }
}

/// Incremental merger. Add fragments in a deterministic order, then
/// [`finish`](Merger::finish).
#[derive(Debug)]
pub struct Merger {
    policy: PathCollisionPolicy,
    combined: ApiDocument,
    schemas: Components,
}

impl Merger {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            policy: config.path_collisions,
            combined: ApiDocument::new(&config.openapi, &config.title, &config.version),
            schemas: Components::default(),
        }
    }

    /// Adds one fragment's operations and component schemas.
    ///
    /// Operations get their tag list replaced by `[tag]` when the fragment
    /// name yields a tag; otherwise their declared tags are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::DuplicateSchemaName`] if a schema name was
    /// already added, or [`MergeError::DuplicateOperation`] if a path+method
    /// repeats under [`PathCollisionPolicy::Reject`]. The merger must not be
    /// used further after an error.
    pub fn add(&mut self, fragment: &Fragment) -> Result<()> {
        debug!(fragment = %fragment.name, tag = ?fragment.tag, "merging fragment");

        for (path, item) in &fragment.typed.paths {
            let combined_item = self.combined.paths.entry(path.clone()).or_default();
            for (method, operation) in item {
                let mut operation = operation.clone();
                if let Some(tag) = &fragment.tag {
                    operation.tags = Some(vec![tag.clone()]);
                }

                match combined_item.entry(method.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(operation);
                    }
                    Entry::Occupied(mut slot) => match self.policy {
                        PathCollisionPolicy::Overwrite => {
                            warn!(
                                fragment = %fragment.name,
                                %path,
                                %method,
                                "operation replaces one from an earlier fragment"
                            );
                            slot.insert(operation);
                        }
                        PathCollisionPolicy::Reject => {
                            return Err(MergeError::DuplicateOperation {
                                path: path.clone(),
                                method: method.clone(),
                                fragment: fragment.name.clone(),
                            });
                        }
                    },
                }
            }
        }

        if let Some(components) = &fragment.typed.components {
            for (name, body) in &components.schemas {
                match self.schemas.schemas.entry(name.clone()) {
                    Entry::Occupied(_) => {
                        return Err(MergeError::DuplicateSchemaName {
                            schema: name.clone(),
                            fragment: fragment.name.clone(),
                        });
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(body.clone());
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the combined document. It always carries a `components`
    /// block, possibly with no schemas.
    pub fn finish(self) -> ApiDocument {
        let mut combined = self.combined;
        combined.components = Some(self.schemas);
        combined
    }
}

/// Merges fragments after sorting them by name.
///
/// # Errors
///
/// Fails on the first collision encountered in name order; see
/// [`Merger::add`].
pub fn merge(config: &MergeConfig, mut fragments: Vec<Fragment>) -> Result<ApiDocument> {
    fragments.sort_by(|a, b| a.name.cmp(&b.name));
    let mut merger = Merger::new(config);
    for fragment in &fragments {
        merger.add(fragment)?;
    }
    Ok(merger.finish())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fragment(name: &str, body: &str) -> Fragment {
        Fragment::parse(name, body.as_bytes()).unwrap()
    }

    #[test]
    fn test_disjoint_union() {
        let a = fragment(
            "a.yaml",
            "paths:\n  /a:\n    get: {summary: a, responses: {}}\ncomponents:\n  schemas:\n    Foo: {type: string}\n",
        );
        let b = fragment(
            "b.yaml",
            "paths:\n  /b:\n    post: {summary: b, responses: {}}\ncomponents:\n  schemas:\n    Bar: {type: integer}\n",
        );

        let merged = merge(&MergeConfig::default(), vec![a, b]).unwrap();
        let paths: Vec<(&str, Vec<&str>)> = merged
            .paths
            .iter()
            .map(|(p, item)| (p.as_str(), item.keys().map(String::as_str).collect()))
            .collect();
        assert_eq!(paths, vec![("/a", vec!["get"]), ("/b", vec!["post"])]);

        let schemas: Vec<&str> = merged
            .components
            .as_ref()
            .unwrap()
            .schemas
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(schemas, vec!["Bar", "Foo"]);
    }

    #[test]
    fn test_duplicate_schema_is_rejected() {
        let a = fragment("a.yaml", "paths: {}\ncomponents:\n  schemas:\n    X: {type: string}\n");
        let b = fragment("b.yaml", "paths: {}\ncomponents:\n  schemas:\n    X: {type: object}\n");

        let err = merge(&MergeConfig::default(), vec![b, a]).unwrap_err();
        match err {
            MergeError::DuplicateSchemaName { schema, fragment } => {
                assert_eq!(schema, "X");
                assert_eq!(fragment, "b.yaml");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tag_injection_overwrites_declared_tags() {
        let f = fragment(
            "mailboxes.extra.yaml",
            "paths:\n  /mailboxes:\n    get: {summary: s, tags: [legacy, other], responses: {}}\n    delete: {summary: d, responses: {}}\n",
        );
        let merged = merge(&MergeConfig::default(), vec![f]).unwrap();
        for op in merged.paths["/mailboxes"].values() {
            assert_eq!(op.tags, Some(vec!["mailboxes".to_string()]));
        }
    }

    #[test]
    fn test_untagged_fragment_gets_no_injected_tag() {
        let f = fragment("readme", "paths:\n  /health:\n    get: {summary: s, responses: {}}\n");
        let merged = merge(&MergeConfig::default(), vec![f]).unwrap();
        assert_eq!(merged.operation("/health", "get").unwrap().tags, None);
    }

    #[test]
    fn test_untagged_fragment_keeps_declared_tags() {
        let f = fragment(
            "readme",
            "paths:\n  /health:\n    get: {summary: s, tags: [ops], responses: {}}\n",
        );
        let merged = merge(&MergeConfig::default(), vec![f]).unwrap();
        assert_eq!(
            merged.operation("/health", "get").unwrap().tags,
            Some(vec!["ops".to_string()])
        );
    }

    #[test]
    fn test_path_overwrite_keeps_later_fragment() {
        let early = fragment("a.yaml", "paths:\n  /x:\n    get: {summary: first, responses: {}}\n");
        let late = fragment("b.yaml", "paths:\n  /x:\n    get: {summary: second, responses: {}}\n");

        let merged = merge(&MergeConfig::default(), vec![late, early]).unwrap();
        let op = merged.operation("/x", "get").unwrap();
        assert_eq!(op.summary, "second");
        assert_eq!(op.tags, Some(vec!["b".to_string()]));
    }

    #[test]
    fn test_same_path_different_methods_are_combined() {
        let a = fragment("a.yaml", "paths:\n  /x:\n    get: {summary: g, responses: {}}\n");
        let b = fragment("b.yaml", "paths:\n  /x:\n    post: {summary: p, responses: {}}\n");

        let merged = merge(&MergeConfig::default(), vec![a, b]).unwrap();
        assert_eq!(merged.paths["/x"].len(), 2);
    }

    #[test]
    fn test_reject_policy_fails_on_repeated_operation() {
        let config = MergeConfig {
            path_collisions: PathCollisionPolicy::Reject,
            ..MergeConfig::default()
        };
        let a = fragment("a.yaml", "paths:\n  /x:\n    get: {summary: first, responses: {}}\n");
        let b = fragment("b.yaml", "paths:\n  /x:\n    get: {summary: second, responses: {}}\n");

        let err = merge(&config, vec![a, b]).unwrap_err();
        assert!(matches!(
            err,
            MergeError::DuplicateOperation { ref path, ref method, ref fragment }
                if path == "/x" && method == "get" && fragment == "b.yaml"
        ));
    }

    #[test]
    fn test_metadata_comes_from_config() {
        let f = fragment(
            "a.yaml",
            "openapi: 3.1.0\ninfo: {title: Fragment title, version: '9'}\npaths: {}\n",
        );
        let config = MergeConfig {
            title: "Custom".into(),
            ..MergeConfig::default()
        };
        let merged = merge(&config, vec![f]).unwrap();
        assert_eq!(merged.openapi, "3.0.1");
        assert_eq!(merged.info.title, "Custom");
        assert_eq!(merged.info.version, "3.8.0");
    }

    #[test]
    fn test_passthrough_blocks_are_preserved() {
        let f = fragment(
            "a.yaml",
            "paths:\n  /a:\n    get:\n      summary: s\n      parameters: [{name: q, in: query}]\n      responses: {200: {description: ok}}\n",
        );
        let merged = merge(&MergeConfig::default(), vec![f]).unwrap();
        let op = merged.operation("/a", "get").unwrap();
        assert_eq!(op.parameters, Some(vec![json!({"name": "q", "in": "query"})]));
        assert_eq!(op.responses, json!({"200": {"description": "ok"}}));
    }

    #[test]
    fn test_empty_input_still_has_components() {
        let merged = merge(&MergeConfig::default(), Vec::new()).unwrap();
        assert!(merged.paths.is_empty());
        assert_eq!(merged.components, Some(Components::default()));
    }
}
