//! Storage side of fragment merging: reading a fragment directory, run
//! configuration, and writing the merged document.
//!
//! # Quick start
//!
//! ```no_run
//! use openapi_fragments_store::{RunConfig, RunMode, run};
//!
//! // openapi/*.yaml -> api.yaml with the default metadata
//! let summary = run(&RunConfig::default(), RunMode::Merge).unwrap();
//! println!("{} operations from {} fragments", summary.operations, summary.fragments);
//!
//! // CI gate: check and merge without writing
//! let config = RunConfig::load("merge.yaml").unwrap();
//! run(&config, RunMode::CheckOnly).unwrap();
//! ```

mod config;
mod emit;
mod error;
mod loader;
mod pipeline;

pub use config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT, RunConfig};
pub use emit::emit;
pub use error::{Result, StoreError};
pub use loader::FragmentSource;
pub use pipeline::{RunMode, RunSummary, run};
