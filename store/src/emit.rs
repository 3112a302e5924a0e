//! Writing the merged document.
//!
//! Output goes to a temporary file next to the destination and is then
//! renamed over it, so the destination is either the complete new document
//! or untouched.

use std::io::Write;
use std::path::Path;

use openapi_fragments_core::{ApiDocument, to_yaml};
use tracing::info;

use crate::error::{Result, StoreError};

/// Serializes `document` as YAML and atomically writes it to `path`.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written, or
/// [`StoreError::Merge`] if serialization fails.
pub fn emit(document: &ApiDocument, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let yaml = to_yaml(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    file.write_all(yaml.as_bytes()).map_err(|e| StoreError::io(file.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| StoreError::io(file.path(), e))?;
    }

    file.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    info!(
        output = %path.display(),
        bytes = yaml.len(),
        "wrote merged document"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use openapi_fragments_core::{MergeConfig, Merger, parse_untyped};

    use super::*;

    #[test]
    fn test_emit_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build/out/api.yaml");

        let document = Merger::new(&MergeConfig::default()).finish();
        emit(&document, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        let tree = parse_untyped("api.yaml", &written).unwrap();
        assert_eq!(tree["openapi"], "3.0.1");
        assert_eq!(tree["info"]["title"], "Apache JAMES Web Admin API");
    }

    #[test]
    fn test_emit_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.yaml");
        std::fs::write(&path, "stale: true\n").unwrap();

        let document = ApiDocument::new("3.0.1", "Fresh", "1.0.0");
        emit(&document, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Fresh"));
        assert!(!contents.contains("stale"));
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
