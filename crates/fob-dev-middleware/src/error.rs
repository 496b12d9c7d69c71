//! Error types for wiring and running the middleware.
//!
//! Request-time failures (unparseable URLs, missing files) are never errors:
//! they resolve to "not found". Only wiring mistakes and a torn-down context
//! surface here.

use thiserror::Error;

use crate::runtime::RuntimeError;

pub type Result<T> = std::result::Result<T, MiddlewareError>;

#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// The build tool reported no child compilers to attach to
    #[error("no compiler attached: the build tool exposes no child compilations")]
    NoCompiler,

    /// Hooks with this tap name are already installed on the compiler
    #[error("middleware '{0}' is already attached to this compiler")]
    AlreadyAttached(String),

    /// Attaching spawns the build context; that needs a running tokio runtime
    #[error("no tokio runtime available to run the build context")]
    NoRuntime,

    /// The context actor has shut down; pending waits can never complete
    #[error("build context closed before a valid build was available")]
    ContextClosed,

    #[error("file system error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("configuration error: {0}")]
    Config(#[from] fob_dev_config::ConfigError),
}
