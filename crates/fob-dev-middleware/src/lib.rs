#![cfg_attr(docsrs, feature(doc_cfg))]

//! # fob-dev-middleware
//!
//! Serve build output while a watch build is running.
//!
//! The middleware attaches to a compiler's lifecycle hooks and tracks whether
//! the last build is usable. Requests that arrive mid-build wait until the
//! build completes; requests against a valid build resolve their URL to a
//! file in the compiler's output file system.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fob_dev_config::MiddlewareConfig;
//! use fob_dev_middleware::test_utils::TestCompiler;
//! use fob_dev_middleware::{BuildResult, MemoryFileSystem, Middleware, StaticCompilation};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = Arc::new(MemoryFileSystem::new());
//! let compiler = TestCompiler::new();
//!
//! let middleware = Middleware::builder(MiddlewareConfig::default())
//!     .file_system(fs.clone())
//!     .attach(&compiler)?;
//!
//! fs.write_file("/dist/app.js", "console.log('hi')");
//! compiler.finish(BuildResult::single(StaticCompilation::new("/dist")));
//!
//! middleware.wait_until_valid(Some("/app.js")).await?;
//! assert!(middleware.resolve_filename("/app.js").is_some());
//! # Ok(()) }
//! ```

pub mod compilation;
pub mod context;
pub mod error;
pub mod hooks;
pub mod middleware;
pub mod output_paths;
pub mod resolve;
pub mod runtime;
pub mod state;
pub mod stats;

pub use compilation::{AssetInfo, BuildResult, Compilation, PathData, StaticCompilation, interpolate};
pub use context::Context;
pub use error::{MiddlewareError, Result};
pub use hooks::{Compiler, CompilerHooks, PLUGIN_NAME, SyncHook, setup_hooks};
pub use middleware::{Middleware, MiddlewareBuilder};
pub use output_paths::{OutputPath, OutputPathTable, PublicPathOverride};
pub use resolve::PathResolver;
pub use runtime::{
    FileMetadata, MemoryFileSystem, NativeFileSystem, OutputFileSystem, RuntimeError,
    RuntimeResult,
};
pub use state::{CompilationState, FlushTicket, ResultCallback};
pub use stats::{NoopReporter, PrintOptions, Reporter, StatsReporter};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

// Test utilities (for unit and integration tests)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
