//! JSON mirrors of the in-memory collections.

use crate::core::error::{PersistError, StoreError};
use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Reads a JSON document, `None` when the file does not exist yet.
pub(crate) fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No file at {}, starting empty", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(StoreError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    if text.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| StoreError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Writes `value` as pretty JSON, replacing the previous file.
pub(crate) fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let to_persist_error = |source: std::io::Error| PersistError {
        path: path.to_path_buf(),
        source,
    };

    let data = serde_json::to_vec_pretty(value)
        .map_err(|e| to_persist_error(std::io::Error::other(e)))?;
    std::fs::write(path, data).map_err(to_persist_error)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_and_blank_files_load_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        assert!(load::<Vec<u32>>(&path).unwrap().is_none());

        std::fs::write(&path, "  \n").unwrap();
        assert!(load::<Vec<u32>>(&path).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_fails_loudly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(&path, "[{\"oops\"").unwrap();

        let err = load::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Load { .. }));
        assert!(err.to_string().starts_with("failed to load"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numbers.json");
        save(&path, &[1, 2, 3]).unwrap();
        assert_eq!(load::<Vec<u32>>(&path).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_save_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("numbers.json");
        let err = save(&path, &[1]).unwrap_err();
        assert_eq!(err.path, path);
    }
}
