use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;

/// Local filesystem storage provider rooted at a base directory
#[derive(Clone)]
pub struct LocalStorageProvider {
    base_path: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider with the given base path
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a relative path against the base path
    fn resolve_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.base_path.join(path)
    }
}

impl StorageProvider for LocalStorageProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve_path(path).is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve_path(path).is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let full_path = self.resolve_path(path);
        fs::create_dir_all(&full_path).map_err(|e| StorageSystemError::io(e, "create_dir_all", full_path).into())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let full_path = self.resolve_path(path);
        fs::read_to_string(&full_path).map_err(|e| StorageSystemError::io(e, "read_to_string", full_path).into())
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        let full_path = self.resolve_path(path);
        let parent = match full_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(StorageSystemError::InvalidPath {
                    path: full_path,
                    reason: "Cannot write to path without parent directory".to_string(),
                }
                .into());
            }
        };
        fs::create_dir_all(&parent).map_err(|e| StorageSystemError::io(e, "create_dir_all", parent.clone()))?;

        // Write next to the target, then atomically replace it
        let mut temp_file = NamedTempFile::new_in(&parent)
            .map_err(|e| StorageSystemError::io(e, "create_temp_file", parent.clone()))?;
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| StorageSystemError::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(&full_path)
            .map_err(|e| StorageSystemError::io(e.error, "persist_temp_file", full_path.clone()))?;

        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let full_path = self.resolve_path(path);
        let entries = fs::read_dir(&full_path)
            .map_err(|e| StorageSystemError::io(e, "read_dir", full_path.clone()))?;
        let mut result = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StorageSystemError::io(e, "read_dir_entry", full_path.clone()))?;
            let path = entry.path();

            // Hand back paths relative to the base, like every other method takes
            match path.strip_prefix(&self.base_path) {
                Ok(rel_path) => result.push(rel_path.to_path_buf()),
                Err(_) => result.push(path),
            }
        }

        Ok(result)
    }
}

impl fmt::Debug for LocalStorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorageProvider")
            .field("base_path", &self.base_path)
            .finish()
    }
}
