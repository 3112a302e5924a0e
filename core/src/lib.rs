//! Core model, fidelity checking and merging for OpenAPI fragments.
//!
//! An API surface authored as many small per-resource files ("fragments") is
//! combined into one document. Each fragment is parsed twice from the same
//! bytes:
//!
//! - an untyped [`serde_json::Value`] tree that keeps every field, and
//! - a typed [`ApiDocument`] that declares only what merging needs, with
//!   request bodies, parameters, responses and schema bodies kept opaque.
//!
//! [`fidelity::check`] proves the typed model reproduces the tree exactly,
//! and [`merge`] / [`Merger`] combine the typed models:
//!
//! - operations are unioned by path and method, tagged with the fragment's
//!   [`derive_tag`] result;
//! - component schemas are unioned by name, rejecting duplicates.
//!
//! No I/O happens here; reading fragments and writing the result live in
//! the store crate.
//!
//! # Example
//!
//! ```
//! use openapi_fragments_core::*;
//!
//! let bytes = b"openapi: 3.0.1
//! info: {title: Users, version: '1'}
//! paths:
//!   /users:
//!     get:
//!       summary: List users
//!       responses: {200: {description: ok}}
//! ";
//! let fragment = Fragment::parse("users.yaml", bytes).unwrap();
//! fidelity::check(&fragment).unwrap();
//!
//! let merged = merge(&MergeConfig::default(), vec![fragment]).unwrap();
//! assert_eq!(merged.info.title, DEFAULT_TITLE);
//! assert_eq!(merged.operation("/users", "get").unwrap().summary, "List users");
//! ```

mod error;
pub mod fidelity;
mod fragment;
mod merge;
mod types;

pub use error::{MergeError, Result};
pub use fidelity::{Difference, DifferenceKind, FidelityReport, Segment, TreePath};
pub use fragment::{
    Fragment, TAG_SEPARATOR, derive_tag, parse_typed, parse_untyped, serialize_tree, to_yaml,
};
pub use merge::{
    DEFAULT_API_VERSION, DEFAULT_OPENAPI_VERSION, DEFAULT_TITLE, MergeConfig, Merger,
    PathCollisionPolicy, merge,
};
pub use types::*;
