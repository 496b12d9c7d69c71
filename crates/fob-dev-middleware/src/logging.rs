//! Subscriber setup for dev servers built on the middleware.
//!
//! Requires the `logging` feature. Libraries embedding the middleware should
//! install their own subscriber instead; the middleware itself only emits
//! `tracing` events.

use std::sync::Once;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Targets whose verbosity follows [`LogLevel`]. Everything else stays at warn.
const TARGETS: &[&str] = &["fob_dev_middleware", "fob_dev_server", "fob_dev_config"];

/// Verbosity of the middleware's own output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// "Compilation starting...", "Compilation finished" and waiting requests
    #[default]
    Info,
    /// Also every resolved request
    Debug,
}

impl LogLevel {
    /// Filter directives for the middleware's targets at this level.
    pub fn directives(self) -> Vec<String> {
        let level = match self {
            LogLevel::Silent => "off",
            other => other.name(),
        };
        TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect()
    }

    fn name(self) -> &'static str {
        match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "off" | "none" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "verbose" => Ok(LogLevel::Debug),
            other => Err(format!("Unknown log level '{other}'")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Log middleware activity at `level`.
///
/// Only the first initialization in a process installs a subscriber.
/// `RUST_LOG` directives are applied on top of `level`.
///
/// ```rust,no_run
/// use fob_dev_middleware::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    for directive in level.directives() {
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    install(filter);
}

/// Log according to `RUST_LOG`, or at [`LogLevel::Info`] when it is unset.
pub fn init_logging_from_env() {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => install(filter),
        Err(_) => init_logging(LogLevel::Info),
    }
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .init();
    });
}
