//! Round-trip fidelity checking.
//!
//! The typed model only declares the fields merging needs. [`check`]
//! serializes the typed model back into tree form and structurally compares
//! it with the untyped tree parsed from the same bytes, so any field the
//! model dropped or reshaped is reported instead of silently lost.
//!
//! Objects compare by key regardless of order; arrays compare position by
//! position.
//!
//! # Example
//!
//! ```
//! use openapi_fragments_core::{Fragment, MergeError, fidelity};
//!
//! let yaml = b"openapi: 3.0.1\ninfo: {title: t, version: '1'}\npaths: {}\nx-extra: 1\n";
//! let fragment = Fragment::parse("users.yaml", yaml).unwrap();
//!
//! match fidelity::check(&fragment) {
//!     Err(MergeError::FidelityViolation(report)) => {
//!         assert_eq!(report.first_path().unwrap().to_string(), "$.x-extra");
//!     }
//!     other => panic!("expected violation, got {other:?}"),
//! }
//! ```

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::{MergeError, Result};
use crate::fragment::{Fragment, serialize_tree};

/// One step into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a tree, rendered as `$.paths["/a"].get.tags[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePath(Vec<Segment>);

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Index(i) => write!(f, "[{i}]")?,
                Segment::Key(key) if is_plain_key(key) => write!(f, ".{key}")?,
                Segment::Key(key) => write!(f, "[{}]", Value::String(key.clone()))?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// How a location differs between the source tree and the typed round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum DifferenceKind {
    /// Present only in the typed round trip.
    Added(Value),
    /// Present only in the source; the typed model dropped it.
    Removed(Value),
    /// Present in both with different values.
    Changed { before: Value, after: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    pub path: TreePath,
    pub kind: DifferenceKind,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DifferenceKind::Added(value) => write!(f, "+ {}: {value}", self.path),
            DifferenceKind::Removed(value) => write!(f, "- {}: {value}", self.path),
            DifferenceKind::Changed { before, after } => {
                write!(f, "~ {}: {before} -> {after}", self.path)
            }
        }
    }
}

/// Every divergence found for one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct FidelityReport {
    pub fragment: String,
    pub differences: Vec<Difference>,
}

impl FidelityReport {
    /// First divergent location, in tree walk order.
    pub fn first_path(&self) -> Option<&TreePath> {
        self.differences.first().map(|d| &d.path)
    }

    /// Returns `true` if `path` (rendered form) is among the differences.
    pub fn contains_path(&self, path: &str) -> bool {
        self.differences.iter().any(|d| d.path.to_string() == path)
    }
}

impl fmt::Display for FidelityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fragment '{}' is not preserved by the typed model ({} difference(s))",
            self.fragment,
            self.differences.len()
        )?;
        for difference in &self.differences {
            write!(f, "\n  {difference}")?;
        }
        Ok(())
    }
}

/// Verifies that a fragment's typed model reproduces its untyped tree.
///
/// # Errors
///
/// Returns [`MergeError::FidelityViolation`] listing every difference, or
/// [`MergeError::Serialize`] if the typed model cannot be serialized.
pub fn check(fragment: &Fragment) -> Result<()> {
    let round_trip = serialize_tree(&fragment.typed)?;
    let differences = diff(&fragment.untyped, &round_trip);
    if differences.is_empty() {
        debug!(fragment = %fragment.name, "fragment round-trips");
        return Ok(());
    }
    Err(MergeError::FidelityViolation(FidelityReport {
        fragment: fragment.name.clone(),
        differences,
    }))
}

/// Structurally compares `expected` against `actual`.
///
/// Object keys are visited in sorted order, so the result is deterministic.
///
/// # Examples
///
/// ```
/// use openapi_fragments_core::fidelity::{DifferenceKind, diff};
/// use serde_json::json;
///
/// let diffs = diff(&json!({"a": [1, 2]}), &json!({"a": [1, 3]}));
/// assert_eq!(diffs.len(), 1);
/// assert_eq!(diffs[0].path.to_string(), "$.a[1]");
/// assert!(matches!(diffs[0].kind, DifferenceKind::Changed { .. }));
/// ```
pub fn diff(expected: &Value, actual: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    diff_into(&TreePath::root(), expected, actual, &mut out);
    out
}

fn diff_into(path: &TreePath, expected: &Value, actual: &Value, out: &mut Vec<Difference>) {
    match (expected, actual) {
        (Value::Object(left), Value::Object(right)) => {
            let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let child = path.child(Segment::Key(key.clone()));
                match (left.get(key), right.get(key)) {
                    (Some(l), Some(r)) => diff_into(&child, l, r, out),
                    (Some(l), None) => out.push(Difference {
                        path: child,
                        kind: DifferenceKind::Removed(l.clone()),
                    }),
                    (None, Some(r)) => out.push(Difference {
                        path: child,
                        kind: DifferenceKind::Added(r.clone()),
                    }),
                    (None, None) => {}
                }
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            for i in 0..left.len().max(right.len()) {
                let child = path.child(Segment::Index(i));
                match (left.get(i), right.get(i)) {
                    (Some(l), Some(r)) => diff_into(&child, l, r, out),
                    (Some(l), None) => out.push(Difference {
                        path: child,
                        kind: DifferenceKind::Removed(l.clone()),
                    }),
                    (None, Some(r)) => out.push(Difference {
                        path: child,
                        kind: DifferenceKind::Added(r.clone()),
                    }),
                    (None, None) => {}
                }
            }
        }
        _ if expected == actual => {}
        _ => out.push(Difference {
            path: path.clone(),
            kind: DifferenceKind::Changed {
                before: expected.clone(),
                after: actual.clone(),
            },
        }),
    }
}
