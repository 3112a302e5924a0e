//! Fragment directory enumeration and parallel loading.
//!
//! Directory listing order differs between platforms, and merge results
//! depend on fragment order, so files are always sorted by name. Parsing
//! and fidelity checks run on a rayon pool; results come back in sorted
//! order and the first failure by name is the one reported.
//!
//! ```no_run
//! use openapi_fragments_store::FragmentSource;
//!
//! let source = FragmentSource::from_dir("openapi").unwrap();
//! let fragments = source.load_checked(Some(4)).unwrap();
//! println!("{} fragments round-trip", fragments.len());
//! ```

use std::path::{Path, PathBuf};

use openapi_fragments_core::{Fragment, fidelity};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Sorted list of fragment files in one directory.
#[derive(Debug, Clone)]
pub struct FragmentSource {
    dir: PathBuf,
    files: Vec<(String, PathBuf)>,
}

impl FragmentSource {
    /// Lists the regular files in `dir`, sorted by file name.
    ///
    /// Subdirectories, symlinks and other special entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be read.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| StoreError::io(&path, e))?;
            if !file_type.is_file() {
                debug!(path = %path.display(), "skipping non-regular entry");
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push((name, path));
        }

        files.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fragment file names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Reads and parses every fragment.
    ///
    /// `jobs` caps the worker threads; `None` uses one per CPU.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::Io`] or parse error in name order.
    pub fn load(&self, jobs: Option<usize>) -> Result<Vec<Fragment>> {
        self.load_with(jobs, |_| Ok(()))
    }

    /// Reads, parses and fidelity-checks every fragment.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load), plus
    /// [`MergeError::FidelityViolation`](openapi_fragments_core::MergeError::FidelityViolation)
    /// for the first fragment (in name order) whose typed model does not
    /// round-trip.
    pub fn load_checked(&self, jobs: Option<usize>) -> Result<Vec<Fragment>> {
        self.load_with(jobs, |fragment| Ok(fidelity::check(fragment)?))
    }

    fn load_with<F>(&self, jobs: Option<usize>, verify: F) -> Result<Vec<Fragment>>
    where
        F: Fn(&Fragment) -> Result<()> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.unwrap_or(0))
            .build()
            .map_err(|e| StoreError::ThreadPool(e.to_string()))?;

        let results: Vec<Result<Fragment>> = pool.install(|| {
            self.files
                .par_iter()
                .map(|(name, path)| -> Result<Fragment> {
                    let fragment = read_fragment(name, path)?;
                    verify(&fragment)?;
                    Ok(fragment)
                })
                .collect()
        });

        results.into_iter().collect()
    }
}

fn read_fragment(name: &str, path: &Path) -> Result<Fragment> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let fragment = Fragment::parse(name, &bytes)?;
    debug!(fragment = %name, tag = ?fragment.tag, "loaded fragment");
    Ok(fragment)
}
