//! The two-pass merge run.
//!
//! Pass one loads every fragment and checks its fidelity; nothing is merged
//! unless all fragments pass. Pass two merges sequentially in name order.
//! The output is written only after both passes succeed.

use std::path::PathBuf;

use openapi_fragments_core::{ApiDocument, Merger};
use tracing::info;

use crate::config::RunConfig;
use crate::emit::emit;
use crate::error::Result;
use crate::loader::FragmentSource;

/// Whether a run writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Check, merge and write the output document.
    #[default]
    Merge,
    /// Check and merge, but write nothing.
    CheckOnly,
}

/// Counts describing a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fragments: usize,
    pub paths: usize,
    pub operations: usize,
    pub schemas: usize,
    /// Where the document was written; `None` for [`RunMode::CheckOnly`].
    pub output: Option<PathBuf>,
}

impl RunSummary {
    fn new(fragments: usize, document: &ApiDocument, output: Option<PathBuf>) -> Self {
        Self {
            fragments,
            paths: document.paths.len(),
            operations: document.operation_count(),
            schemas: document.schema_count(),
            output,
        }
    }
}

/// Runs both passes over `config.input_dir` and, in [`RunMode::Merge`],
/// writes the merged document to `config.output`.
///
/// # Errors
///
/// Any storage, parse, fidelity or collision error aborts the run before
/// output is written.
pub fn run(config: &RunConfig, mode: RunMode) -> Result<RunSummary> {
    let source = FragmentSource::from_dir(&config.input_dir)?;
    info!(
        dir = %source.dir().display(),
        fragments = source.len(),
        "checking fragment fidelity"
    );
    let fragments = source.load_checked(config.jobs)?;

    info!(fragments = fragments.len(), "merging fragments");
    let mut merger = Merger::new(&config.merge);
    for fragment in &fragments {
        merger.add(fragment)?;
    }
    let document = merger.finish();

    let output = match mode {
        RunMode::Merge => {
            emit(&document, &config.output)?;
            Some(config.output.clone())
        }
        RunMode::CheckOnly => None,
    };

    Ok(RunSummary::new(fragments.len(), &document, output))
}
