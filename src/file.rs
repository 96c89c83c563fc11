//! Reading definitions files through a [`Storage`].
//!
//! Both failure points are reported with the path that caused them: opening
//! (which covers a missing file) and reading. The stream is dropped, and so
//! closed, before this returns on every path.

use std::io::Read;
use std::path::Path;

use crate::error::TerragenError;
use crate::storage::Storage;

/// Read the whole file at `path` as UTF-8 text.
pub fn read_to_string(storage: &dyn Storage, path: &Path) -> Result<String, TerragenError> {
    let mut file = storage.open(path).map_err(|e| TerragenError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| TerragenError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, OsStorage};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_from_memory() {
        let storage = MemoryStorage::new();
        storage.insert("defs.hcl", "x = 1\n");
        let content = read_to_string(&storage, Path::new("defs.hcl")).unwrap();
        assert_eq!(content, "x = 1\n");
    }

    #[test]
    fn reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("defs.hcl");
        fs::write(&path, "x = 1\n").unwrap();
        assert_eq!(read_to_string(&OsStorage, &path).unwrap(), "x = 1\n");
    }

    #[test]
    fn missing_file_is_wrapped_not_found() {
        let storage = MemoryStorage::new();
        let err = read_to_string(&storage, Path::new("nope.hcl")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("error opening file"));
        assert_eq!(err.path(), Path::new("nope.hcl"));
    }

    #[test]
    fn invalid_utf8_is_a_read_error() {
        let storage = MemoryStorage::new();
        storage.insert("bin.hcl", vec![0xff, 0xfe, 0x00]);
        let err = read_to_string(&storage, Path::new("bin.hcl")).unwrap_err();
        assert!(matches!(err, TerragenError::Read { .. }));
        assert!(err.is_storage());
    }
}
