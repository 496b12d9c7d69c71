//! Build results as seen by the middleware.
//!
//! The build tool owns its result objects; the middleware only needs a
//! narrow view of each child compilation: where output goes, which URL
//! prefix serves it, and how to render a human-readable summary.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fob_dev_config::StatsOptions;

use crate::stats::{PrintOptions, render};

/// One compilation inside a (possibly composite) build result.
pub trait Compilation: Send + Sync + fmt::Debug {
    /// Compilation name, substituted for `[name]` in path templates
    fn name(&self) -> Option<&str> {
        None
    }

    /// Content hash, substituted for `[hash]`/`[fullhash]`
    fn hash(&self) -> Option<&str> {
        None
    }

    /// Configured output directory template
    fn output_dir(&self) -> Option<&str>;

    /// Configured public path template
    fn public_path(&self) -> Option<&str>;

    /// Expand a path template with this compilation's data.
    fn get_path(&self, template: &str) -> String {
        interpolate(
            template,
            &PathData {
                hash: self.hash(),
                name: self.name(),
            },
        )
    }

    /// Render a summary; an empty string means "print nothing".
    fn render(&self, options: &StatsOptions) -> String;
}

/// Values available to path templates
#[derive(Debug, Clone, Copy, Default)]
pub struct PathData<'a> {
    pub hash: Option<&'a str>,
    pub name: Option<&'a str>,
}

/// Replace `[hash]`, `[fullhash]` and `[name]` placeholders.
///
/// Hash placeholders accept a length suffix (`[hash:8]`). Unknown
/// placeholders and placeholders without a value are left untouched.
pub fn interpolate(template: &str, data: &PathData<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];

        let Some(end) = after.find(']') else {
            out.push_str(after);
            return out;
        };

        let token = &after[1..end];
        let (key, len) = match token.split_once(':') {
            Some((key, len)) => (key, len.parse::<usize>().ok()),
            None => (token, None),
        };

        let value = match key {
            "hash" | "fullhash" => data.hash.map(|h| match len {
                Some(len) => h.char_indices().nth(len).map_or(h, |(i, _)| &h[..i]),
                None => h,
            }),
            "name" => data.name,
            _ => None,
        };

        match value {
            Some(value) => out.push_str(value),
            None => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Result of one build: a single compilation or a composite of children.
///
/// Cloning is cheap; children are shared.
#[derive(Debug, Clone)]
pub enum BuildResult {
    Single(Arc<dyn Compilation>),
    Multi(Arc<[Arc<dyn Compilation>]>),
}

impl BuildResult {
    pub fn single(compilation: impl Compilation + 'static) -> Self {
        BuildResult::Single(Arc::new(compilation))
    }

    pub fn multi<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Compilation + 'static,
    {
        BuildResult::Multi(
            children
                .into_iter()
                .map(|c| Arc::new(c) as Arc<dyn Compilation>)
                .collect(),
        )
    }

    /// Child compilations in order; a single result is a one-element slice.
    pub fn children(&self) -> &[Arc<dyn Compilation>] {
        match self {
            BuildResult::Single(compilation) => std::slice::from_ref(compilation),
            BuildResult::Multi(children) => children,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, BuildResult::Multi(_))
    }

    /// Render every child with its print options, separated by blank lines.
    pub fn render(&self, options: &PrintOptions) -> String {
        let normal = StatsOptions::preset(StatsOptions::NORMAL);

        self.children()
            .iter()
            .enumerate()
            .map(|(index, child)| child.render(options.for_child(index).unwrap_or(&normal)))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// An emitted asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub name: String,
    pub size: u64,
}

/// Immutable snapshot of a finished compilation.
///
/// Build tools that don't carry their own result type can report through
/// this one.
#[derive(Debug, Clone, Default)]
pub struct StaticCompilation {
    name: Option<String>,
    hash: Option<String>,
    output_dir: Option<String>,
    public_path: Option<String>,
    assets: Vec<AssetInfo>,
    errors: Vec<String>,
    warnings: Vec<String>,
    duration: Option<Duration>,
}

impl StaticCompilation {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: Some(output_dir.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = Some(public_path.into());
        self
    }

    pub fn with_asset(mut self, name: impl Into<String>, size: u64) -> Self {
        self.assets.push(AssetInfo {
            name: name.into(),
            size,
        });
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn assets(&self) -> &[AssetInfo] {
        &self.assets
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.duration
    }
}

impl Compilation for StaticCompilation {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn output_dir(&self) -> Option<&str> {
        self.output_dir.as_deref()
    }

    fn public_path(&self) -> Option<&str> {
        self.public_path.as_deref()
    }

    fn render(&self, options: &StatsOptions) -> String {
        render::summary(self, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_placeholders() {
        let data = PathData {
            hash: Some("abcdef123456"),
            name: Some("main"),
        };

        assert_eq!(interpolate("/dist/[hash]", &data), "/dist/abcdef123456");
        assert_eq!(interpolate("/dist/[fullhash:6]/", &data), "/dist/abcdef/");
        assert_eq!(interpolate("/[name]/[name].js", &data), "/main/main.js");
    }

    #[test]
    fn test_interpolate_leaves_unknown_tokens() {
        let data = PathData::default();

        assert_eq!(interpolate("/dist/[hash]", &data), "/dist/[hash]");
        assert_eq!(interpolate("/[contenthash]/x", &data), "/[contenthash]/x");
        assert_eq!(interpolate("/open[bracket", &data), "/open[bracket");
        assert_eq!(interpolate("", &data), "");
    }

    #[test]
    fn test_hash_length_counts_characters() {
        let compilation = StaticCompilation::new("/dist/[hash:1]").with_hash("é1");
        assert_eq!(compilation.get_path("/dist/[hash:1]"), "/dist/é");
        assert_eq!(compilation.get_path("/dist/[hash:9]"), "/dist/é1");
        assert_eq!(compilation.get_path("/dist/[hash:0]"), "/dist/");
    }

    #[test]
    fn test_single_result_has_one_child() {
        let result = BuildResult::single(StaticCompilation::new("/dist"));
        assert_eq!(result.children().len(), 1);
        assert!(!result.is_multi());
    }

    #[test]
    fn test_multi_result_preserves_order() {
        let result = BuildResult::multi([
            StaticCompilation::new("/a").with_name("a"),
            StaticCompilation::new("/b").with_name("b"),
        ]);

        let names: Vec<_> = result.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec![Some("a"), Some("b")]);
        assert!(result.is_multi());
    }

    #[test]
    fn test_get_path_uses_compilation_data() {
        let compilation = StaticCompilation::new("/dist/[hash:4]").with_hash("ff00aa");
        assert_eq!(
            compilation.get_path(compilation.output_dir().unwrap()),
            "/dist/ff00"
        );
    }
}
