//! Candidate (public path, output directory) pairs for a build result.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::compilation::{BuildResult, Compilation};

/// User override for the public path of every child compilation.
#[derive(Clone)]
pub enum PublicPathOverride {
    /// A path template, expanded per child
    Template(String),
    /// Computed per child; the returned string is still expanded as a template
    Dynamic(Arc<dyn Fn(&dyn Compilation) -> String + Send + Sync>),
}

impl PublicPathOverride {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&dyn Compilation) -> String + Send + Sync + 'static,
    {
        PublicPathOverride::Dynamic(Arc::new(f))
    }

    fn template_for(&self, compilation: &dyn Compilation) -> String {
        match self {
            PublicPathOverride::Template(template) => template.clone(),
            PublicPathOverride::Dynamic(f) => f(compilation),
        }
    }
}

impl fmt::Debug for PublicPathOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicPathOverride::Template(template) => {
                f.debug_tuple("Template").field(template).finish()
            }
            PublicPathOverride::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<String> for PublicPathOverride {
    fn from(template: String) -> Self {
        PublicPathOverride::Template(template)
    }
}

impl From<&str> for PublicPathOverride {
    fn from(template: &str) -> Self {
        PublicPathOverride::Template(template.to_string())
    }
}

/// A URL prefix and the directory that serves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPath {
    pub public_path: String,
    pub output_path: PathBuf,
}

/// Ordered candidate pairs, one per child compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPathTable {
    entries: Vec<OutputPath>,
}

impl OutputPathTable {
    /// Project a build result into its candidate pairs.
    ///
    /// Always derived from the result at hand; never reuse a table across
    /// builds.
    pub fn from_result(result: &BuildResult, public_path: Option<&PublicPathOverride>) -> Self {
        let entries = result
            .children()
            .iter()
            .map(|child| {
                let child = child.as_ref();
                let output_path = child.get_path(child.output_dir().unwrap_or(""));

                let public_path = match public_path {
                    Some(user) => child.get_path(&user.template_for(child)),
                    None => child
                        .public_path()
                        .map(|template| child.get_path(template))
                        .unwrap_or_default(),
                };

                OutputPath {
                    public_path,
                    output_path: PathBuf::from(output_path),
                }
            })
            .collect();

        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputPath> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<OutputPath>> for OutputPathTable {
    fn from(entries: Vec<OutputPath>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a OutputPathTable {
    type Item = &'a OutputPath;
    type IntoIter = std::slice::Iter<'a, OutputPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
