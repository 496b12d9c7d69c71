//! Request URL to output file resolution.
//!
//! A request is matched against each (public path, output directory) pair
//! in build order. The first pair whose directory holds a regular file for
//! the request wins. Directories fall back to the configured index file.

pub mod url;

pub use url::{PublicPathCache, parse_pathname, unescape};

use std::path::{Component, Path, PathBuf};

use fob_dev_config::IndexOption;
use path_clean::PathClean;

use crate::output_paths::{OutputPath, OutputPathTable};
use crate::runtime::OutputFileSystem;

/// Resolves request URLs against an [`OutputPathTable`].
#[derive(Debug, Default)]
pub struct PathResolver {
    index: IndexOption,
    cache: PublicPathCache,
}

impl PathResolver {
    pub fn new(index: IndexOption) -> Self {
        Self {
            index,
            cache: PublicPathCache::default(),
        }
    }

    pub fn index(&self) -> &IndexOption {
        &self.index
    }

    /// Map `url` to a regular file in one of the output directories.
    ///
    /// Returns `None` when the URL can't be parsed or no pair yields a file.
    pub fn resolve(
        &self,
        url: &str,
        table: &OutputPathTable,
        fs: &dyn OutputFileSystem,
    ) -> Option<PathBuf> {
        let Some(pathname) = parse_pathname(url) else {
            tracing::debug!(url, "unparseable request url");
            return None;
        };

        table
            .iter()
            .find_map(|entry| self.resolve_in(&pathname, entry, fs))
    }

    fn resolve_in(
        &self,
        pathname: &str,
        entry: &OutputPath,
        fs: &dyn OutputFileSystem,
    ) -> Option<PathBuf> {
        let public_path = match entry.public_path.as_str() {
            "" | "auto" => "/",
            other => other,
        };
        let prefix = self.cache.pathname(public_path)?;

        // Plain string prefix: `/foo` also matches `/foobar`
        let remainder = pathname.strip_prefix(prefix.as_str())?;

        let relative = if remainder.is_empty() {
            PathBuf::new()
        } else {
            contained(&unescape(remainder))?
        };
        let filename = if relative.as_os_str().is_empty() {
            entry.output_path.clone()
        } else {
            entry.output_path.join(relative)
        };

        let metadata = fs.metadata(&filename).ok()?;
        if metadata.is_file {
            return Some(filename);
        }

        if metadata.is_dir {
            let index = self.index.file_name()?;
            let index_path = filename.join(index);
            if fs.metadata(&index_path).ok()?.is_file {
                return Some(index_path);
            }
        }

        None
    }
}

/// Normalize a decoded remainder into a path that stays inside its root.
///
/// Returns `None` when `..` segments would climb above the root.
fn contained(remainder: &str) -> Option<PathBuf> {
    let cleaned = Path::new(remainder.trim_start_matches('/')).clean();

    match cleaned.components().next() {
        Some(Component::ParentDir) => {
            tracing::debug!(remainder, "request escapes output directory");
            None
        }
        Some(Component::CurDir) | None => Some(PathBuf::new()),
        _ => Some(cleaned),
    }
}
