//! Run configuration.
//!
//! Every field is optional; an absent file or field falls back to the
//! defaults (`openapi/` in, `api.yaml` out).
//!
//! # Example YAML
//!
//! ```yaml
//! input_dir: openapi
//! output: api.yaml
//! jobs: 4
//! merge:
//!   openapi: 3.0.1
//!   title: Apache JAMES Web Admin API
//!   version: 3.8.0
//!   path_collisions: overwrite
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use openapi_fragments_core::MergeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Directory read when none is configured.
pub const DEFAULT_INPUT_DIR: &str = "openapi";
/// File written when none is configured.
pub const DEFAULT_OUTPUT: &str = "api.yaml";

/// Settings for one merge run.
///
/// # Examples
///
/// ```
/// use openapi_fragments_store::RunConfig;
///
/// let config: RunConfig = serde_yaml::from_str("jobs: 2\n").unwrap();
/// assert_eq!(config.jobs, Some(2));
/// assert_eq!(config.input_dir.to_str(), Some("openapi"));
/// assert_eq!(config.merge.version, "3.8.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding one fragment per file.
    pub input_dir: PathBuf,
    /// Merged document destination.
    pub output: PathBuf,
    /// Worker threads for loading and fidelity checks (`None` = CPU count).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    pub merge: MergeConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            jobs: None,
            merge: MergeConfig::default(),
        }
    }
}

impl RunConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read, or
    /// [`StoreError::Config`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| StoreError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
        serde_yaml::to_writer(BufWriter::new(file), self).map_err(|source| StoreError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use openapi_fragments_core::PathCollisionPolicy;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
input_dir: specs/fragments
output: build/api.yaml
jobs: 8
merge:
  title: Internal API
  path_collisions: reject
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: RunConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("specs/fragments"));
        assert_eq!(config.output, PathBuf::from("build/api.yaml"));
        assert_eq!(config.jobs, Some(8));
        assert_eq!(config.merge.title, "Internal API");
        assert_eq!(config.merge.openapi, "3.0.1");
        assert_eq!(config.merge.path_collisions, PathCollisionPolicy::Reject);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: RunConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result: std::result::Result<RunConfig, _> =
            serde_yaml::from_str("merge:\n  path_collisions: sometimes\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.yaml");

        let original: RunConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = RunConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "jobs: [not, a, number]\n").unwrap();
        let err = RunConfig::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }
}
