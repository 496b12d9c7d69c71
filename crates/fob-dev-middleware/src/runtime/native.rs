//! Disk-backed output file system.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{FileMetadata, OutputFileSystem, RuntimeError, RuntimeResult};

/// Output file system that reads straight from disk.
///
/// Relative paths are resolved against `cwd`.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    cwd: PathBuf,
}

impl NativeFileSystem {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

fn map_io(path: PathBuf, action: &str, error: std::io::Error) -> RuntimeError {
    if error.kind() == ErrorKind::NotFound {
        RuntimeError::FileNotFound(path)
    } else {
        RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), error))
    }
}

impl OutputFileSystem for NativeFileSystem {
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = self.resolve_path(path);
        let metadata = std::fs::metadata(&path).map_err(|e| map_io(path.clone(), "stat", e))?;

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);

        Ok(FileMetadata {
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
            modified,
        })
    }

    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.resolve_path(path);
        std::fs::read(&path).map_err(|e| map_io(path.clone(), "read", e))
    }

    fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>> {
        let path = self.resolve_path(path);
        let entries =
            std::fs::read_dir(&path).map_err(|e| map_io(path.clone(), "read directory", e))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                RuntimeError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            if let Some(name) = entry.file_name().to_str() {
                result.push(name.to_string());
            }
        }
        result.sort();

        Ok(result)
    }
}
