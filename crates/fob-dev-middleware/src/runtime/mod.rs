//! Output file system abstraction.
//!
//! The middleware never touches storage directly. Build output lives behind
//! `OutputFileSystem`, which is usually an in-memory [`MemoryFileSystem`]
//! the build tool writes into, or [`NativeFileSystem`] when output goes to
//! disk.

pub mod memory;
pub mod native;

pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;

use std::path::{Path, PathBuf};

/// Result type for file system operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during file system operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path exists but has the wrong type for the operation
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
    /// Last modified timestamp (milliseconds since epoch)
    pub modified: Option<u64>,
}

impl FileMetadata {
    pub fn file(size: u64) -> Self {
        Self {
            size,
            is_dir: false,
            is_file: true,
            modified: None,
        }
    }

    pub fn directory() -> Self {
        Self {
            size: 0,
            is_dir: true,
            is_file: false,
            modified: None,
        }
    }
}

/// Storage the build tool writes its output into.
///
/// Methods are synchronous: the resolver probes several candidates per
/// request and in-memory implementations answer without I/O. Callers that
/// hit a disk-backed implementation from async code should wrap calls in
/// `spawn_blocking`.
pub trait OutputFileSystem: Send + Sync + std::fmt::Debug {
    /// Stat a path
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Read a whole file
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// List entry names of a directory
    fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }
}
