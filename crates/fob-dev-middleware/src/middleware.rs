//! The attached middleware and its builder.

use std::path::PathBuf;
use std::sync::Arc;

use fob_dev_config::MiddlewareConfig;
use tokio::runtime::Handle;

use crate::compilation::BuildResult;
use crate::context::Context;
use crate::error::{MiddlewareError, Result};
use crate::hooks::{Compiler, check_attachable, setup_hooks};
use crate::output_paths::{OutputPathTable, PublicPathOverride};
use crate::resolve::PathResolver;
use crate::runtime::{MemoryFileSystem, OutputFileSystem};
use crate::stats::{PrintOptions, Reporter, StatsReporter, colors_supported};

/// Development middleware attached to one compiler.
///
/// Cheap to clone; clones share the same build context.
#[derive(Clone)]
pub struct Middleware {
    context: Context,
    resolver: Arc<PathResolver>,
    fs: Arc<dyn OutputFileSystem>,
    public_path: Option<PublicPathOverride>,
    config: Arc<MiddlewareConfig>,
}

impl Middleware {
    /// Start configuring a middleware.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let fs = Arc::new(MemoryFileSystem::new());
    /// let middleware = Middleware::builder(MiddlewareConfig::default())
    ///     .file_system(fs.clone())
    ///     .attach(&compiler)?;
    /// ```
    pub fn builder(config: MiddlewareConfig) -> MiddlewareBuilder {
        MiddlewareBuilder::new(config)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn config(&self) -> &MiddlewareConfig {
        &self.config
    }

    pub fn file_system(&self) -> &Arc<dyn OutputFileSystem> {
        &self.fs
    }

    pub fn is_valid(&self) -> bool {
        self.context.is_valid()
    }

    /// Run `callback` once a valid build is available.
    pub fn await_result<F>(&self, callback: F, label: Option<&str>)
    where
        F: FnOnce(BuildResult) + Send + 'static,
    {
        self.context.await_result(callback, label);
    }

    /// Wait for a valid build.
    pub async fn wait_until_valid(&self, label: Option<&str>) -> Result<BuildResult> {
        self.context.wait_until_valid(label).await
    }

    /// Candidate (public path, output directory) pairs of the current build.
    pub fn output_paths(&self) -> Option<OutputPathTable> {
        let result = self.context.snapshot()?;
        Some(OutputPathTable::from_result(&result, self.public_path.as_ref()))
    }

    /// Map a request URL to an output file of the current build.
    ///
    /// Returns `None` while a build is in progress.
    pub fn resolve_filename(&self, url: &str) -> Option<PathBuf> {
        let result = self.context.snapshot()?;
        self.resolve_with(&result, url)
    }

    /// Map a request URL to an output file of `result`.
    ///
    /// Used after [`wait_until_valid`](Self::wait_until_valid) so the lookup
    /// runs against the build the caller waited for.
    pub fn resolve_with(&self, result: &BuildResult, url: &str) -> Option<PathBuf> {
        let table = OutputPathTable::from_result(result, self.public_path.as_ref());
        let filename = self.resolver.resolve(url, &table, self.fs.as_ref());
        tracing::debug!(url, ?filename, "resolved request");
        filename
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware")
            .field("context", &self.context)
            .field("public_path", &self.public_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Middleware`].
pub struct MiddlewareBuilder {
    config: MiddlewareConfig,
    fs: Option<Arc<dyn OutputFileSystem>>,
    reporter: Option<Arc<dyn Reporter>>,
    public_path: Option<PublicPathOverride>,
    colors: Option<bool>,
}

impl MiddlewareBuilder {
    pub fn new(config: MiddlewareConfig) -> Self {
        Self {
            config,
            fs: None,
            reporter: None,
            public_path: None,
            colors: None,
        }
    }

    /// File system the compiler writes its output into.
    ///
    /// Defaults to a fresh [`MemoryFileSystem`].
    pub fn file_system(mut self, fs: Arc<dyn OutputFileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Where build summaries go. Defaults to [`StatsReporter::stdout`].
    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    /// Override the public path of every child compilation.
    ///
    /// Takes precedence over `public_path` in the config.
    pub fn public_path(mut self, public_path: impl Into<PublicPathOverride>) -> Self {
        self.public_path = Some(public_path.into());
        self
    }

    /// Force colored summaries on or off instead of detecting terminal support.
    pub fn colors(mut self, enabled: bool) -> Self {
        self.colors = Some(enabled);
        self
    }

    /// Attach to `compiler` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - `MiddlewareError::Config` if the configuration is invalid
    /// - `MiddlewareError::NoCompiler` / `AlreadyAttached` for unusable compilers
    /// - `MiddlewareError::NoRuntime` outside a tokio runtime
    pub fn attach(self, compiler: &dyn Compiler) -> Result<Middleware> {
        let handle = Handle::try_current().map_err(|_| MiddlewareError::NoRuntime)?;
        self.attach_on(&handle, compiler)
    }

    /// Attach to `compiler`, running the build context on `handle`.
    pub fn attach_on(self, handle: &Handle, compiler: &dyn Compiler) -> Result<Middleware> {
        self.config.validate()?;
        check_attachable(compiler)?;

        let options = PrintOptions::resolve(
            self.config.stats.as_ref(),
            &compiler.child_stats(),
            compiler.is_multi(),
            self.colors.unwrap_or_else(colors_supported),
        );
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(StatsReporter::stdout()));

        let context = Context::spawn_on(handle, reporter, options);
        setup_hooks(compiler, &context)?;

        let public_path = self.public_path.or_else(|| {
            self.config
                .public_path
                .clone()
                .map(PublicPathOverride::Template)
        });

        tracing::debug!(children = compiler.child_stats().len(), "middleware attached");

        Ok(Middleware {
            context,
            resolver: Arc::new(PathResolver::new(self.config.index.clone())),
            fs: self
                .fs
                .unwrap_or_else(|| Arc::new(MemoryFileSystem::new())),
            public_path,
            config: Arc::new(self.config),
        })
    }
}

impl std::fmt::Debug for MiddlewareBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareBuilder")
            .field("config", &self.config)
            .field("public_path", &self.public_path)
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}
