//! Build summary printing.
//!
//! Print options are resolved once when the middleware attaches: the user's
//! stats setting wins, otherwise each child compilation's own setting is
//! used. Every completed build is then handed to a [`Reporter`] exactly once,
//! before any waiting request is released.

pub mod render;

pub use render::{format_duration, format_size};

use std::io::Write;

use fob_dev_config::{StatsOptions, StatsSetting};
use parking_lot::Mutex;

use crate::compilation::BuildResult;

/// Normalized stats options for a single or composite build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOptions {
    Single(StatsOptions),
    Multi { children: Vec<StatsOptions> },
}

impl PrintOptions {
    /// Resolve print options for a compiler.
    ///
    /// `child_settings` holds each child's own stats setting in order. When
    /// `user` is set it replaces every child's setting. `colors` fills in
    /// options that leave colors unspecified.
    pub fn resolve(
        user: Option<&StatsSetting>,
        child_settings: &[Option<StatsSetting>],
        multi: bool,
        colors: bool,
    ) -> Self {
        let normalize = |child: Option<&StatsSetting>| {
            StatsSetting::normalize(user.or(child)).with_default_colors(colors)
        };

        if multi {
            PrintOptions::Multi {
                children: child_settings
                    .iter()
                    .map(|child| normalize(child.as_ref()))
                    .collect(),
            }
        } else {
            PrintOptions::Single(normalize(
                child_settings.first().and_then(Option::as_ref),
            ))
        }
    }

    /// Options for the child at `index`.
    pub fn for_child(&self, index: usize) -> Option<&StatsOptions> {
        match self {
            PrintOptions::Single(options) if index == 0 => Some(options),
            PrintOptions::Single(_) => None,
            PrintOptions::Multi { children } => children.get(index),
        }
    }
}

/// Whether the terminal supports colored output.
pub fn colors_supported() -> bool {
    console::colors_enabled()
}

/// Receives each completed build once, before queued callers are released.
pub trait Reporter: Send + Sync {
    fn report(&self, result: &BuildResult, options: &PrintOptions);
}

/// Reporter that prints nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, _result: &BuildResult, _options: &PrintOptions) {}
}

/// Prints rendered summaries to a writer (stdout by default).
pub struct StatsReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl StatsReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> StatsReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Reporter for StatsReporter<W> {
    fn report(&self, result: &BuildResult, options: &PrintOptions) {
        let printed = result.render(options);

        // `none` and friends render to nothing; don't emit a blank line
        if printed.is_empty() {
            return;
        }

        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", printed).and_then(|_| out.flush()) {
            tracing::warn!("Failed to print build summary: {}", e);
        }
    }
}

impl<W: Write + Send> std::fmt::Debug for StatsReporter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsReporter").finish_non_exhaustive()
    }
}
