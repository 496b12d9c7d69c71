//! In-memory output file system.
//!
//! Build tools running in dev mode write their assets here instead of to
//! disk. Directories are implicit: writing `/dist/js/app.js` makes `/dist`
//! and `/dist/js` visible to `metadata` and `read_dir`.

use std::path::{Component, Path, PathBuf};

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{FileMetadata, OutputFileSystem, RuntimeError, RuntimeResult};

#[derive(Debug, Default)]
struct Entries {
    files: FxHashMap<PathBuf, Vec<u8>>,
    dirs: FxHashSet<PathBuf>,
}

/// Virtual file system backed by a hash map
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    entries: RwLock<Entries>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a file, creating parent directories implicitly.
    ///
    /// The path is normalized before storage to ensure consistent lookup.
    pub fn write_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = normalize(path.as_ref());
        let mut entries = self.entries.write();
        register_ancestors(&mut entries.dirs, &path);
        entries.files.insert(path, content.into());
    }

    /// Create a directory and all of its parents.
    pub fn create_dir_all(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let mut entries = self.entries.write();
        register_ancestors(&mut entries.dirs, &path);
        entries.dirs.insert(path);
    }

    /// Remove a single file.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::FileNotFound` if no file exists at `path`.
    pub fn remove_file(&self, path: impl AsRef<Path>) -> RuntimeResult<()> {
        let path = normalize(path.as_ref());
        self.entries
            .write()
            .files
            .remove(&path)
            .map(|_| ())
            .ok_or(RuntimeError::FileNotFound(path))
    }

    /// Drop every file and directory.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.files.clear();
        entries.dirs.clear();
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.entries.read().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().files.is_empty()
    }
}

impl OutputFileSystem for MemoryFileSystem {
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = normalize(path);
        let entries = self.entries.read();

        if let Some(content) = entries.files.get(&path) {
            return Ok(FileMetadata::file(content.len() as u64));
        }
        if entries.dirs.contains(&path) {
            return Ok(FileMetadata::directory());
        }

        Err(RuntimeError::FileNotFound(path))
    }

    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = normalize(path);
        self.entries
            .read()
            .files
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>> {
        let path = normalize(path);
        let entries = self.entries.read();

        if !entries.dirs.contains(&path) {
            return if entries.files.contains_key(&path) {
                Err(RuntimeError::NotADirectory(path))
            } else {
                Err(RuntimeError::FileNotFound(path))
            };
        }

        let mut names: Vec<String> = entries
            .files
            .keys()
            .chain(entries.dirs.iter())
            .filter(|candidate| candidate.parent() == Some(path.as_path()))
            .filter_map(|candidate| candidate.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();

        Ok(names)
    }
}

/// Anchor relative paths at the root and collapse `.`/`..` segments.
fn normalize(path: &Path) -> PathBuf {
    if path.has_root() {
        path.clean()
    } else {
        Path::new("/").join(path).clean()
    }
}

fn register_ancestors(dirs: &mut FxHashSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        // Every ancestor of a rooted path ends at the root itself
        if ancestor.components().all(|c| matches!(c, Component::RootDir)) {
            dirs.insert(ancestor.to_path_buf());
            break;
        }
        if !dirs.insert(ancestor.to_path_buf()) {
            break;
        }
    }
}
