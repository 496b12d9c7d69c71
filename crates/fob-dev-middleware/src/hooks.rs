//! Build tool lifecycle hooks.
//!
//! A build tool exposes three hooks: `watch_run` (a watched rebuild is
//! starting), `invalid` (inputs changed) and `done` (a build finished). The
//! middleware taps all three under [`PLUGIN_NAME`] and forwards them to its
//! [`Context`].

use std::fmt;
use std::sync::Arc;

use fob_dev_config::StatsSetting;
use parking_lot::RwLock;

use crate::compilation::BuildResult;
use crate::context::Context;
use crate::error::{MiddlewareError, Result};

/// Tap name used for every hook the middleware installs
pub const PLUGIN_NAME: &str = "fob-dev-middleware";

type Tap<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Synchronous hook with named taps, called in registration order.
pub struct SyncHook<T> {
    taps: RwLock<Vec<(String, Tap<T>)>>,
}

impl<T> SyncHook<T> {
    pub fn new() -> Self {
        Self {
            taps: RwLock::new(Vec::new()),
        }
    }

    /// Register `f` under `name`.
    pub fn tap<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.taps.write().push((name.into(), Arc::new(f)));
    }

    /// Invoke every tap with `value`.
    ///
    /// Taps run outside the lock, so a tap may register further taps.
    pub fn call(&self, value: &T) {
        let taps: Vec<Tap<T>> = self.taps.read().iter().map(|(_, f)| Arc::clone(f)).collect();
        for tap in taps {
            tap(value);
        }
    }

    pub fn is_tapped_by(&self, name: &str) -> bool {
        self.taps.read().iter().any(|(tap, _)| tap == name)
    }

    pub fn len(&self) -> usize {
        self.taps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.read().is_empty()
    }
}

impl<T> Default for SyncHook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SyncHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.taps.read().iter().map(|(name, _)| name.clone()).collect();
        f.debug_struct("SyncHook").field("taps", &names).finish()
    }
}

/// The lifecycle hooks a compiler exposes
#[derive(Debug, Default)]
pub struct CompilerHooks {
    pub watch_run: SyncHook<()>,
    pub invalid: SyncHook<()>,
    pub done: SyncHook<BuildResult>,
}

/// A build tool instance the middleware can attach to.
pub trait Compiler: Send + Sync {
    fn hooks(&self) -> &CompilerHooks;

    /// Each child compilation's own stats setting, in build order.
    ///
    /// A single compiler reports exactly one entry; an empty list means
    /// there is nothing to attach to.
    fn child_stats(&self) -> Vec<Option<StatsSetting>>;

    /// Whether the compiler produces composite results.
    ///
    /// A composite compiler with a single child is still composite.
    fn is_multi(&self) -> bool;
}

/// Forward `compiler`'s lifecycle hooks to `context`.
///
/// # Errors
///
/// - `MiddlewareError::NoCompiler` if the compiler has no children
/// - `MiddlewareError::AlreadyAttached` if the hooks are already tapped
pub fn setup_hooks(compiler: &dyn Compiler, context: &Context) -> Result<()> {
    check_attachable(compiler)?;

    let hooks = compiler.hooks();

    let ctx = context.clone();
    hooks.watch_run.tap(PLUGIN_NAME, move |_| ctx.invalidate());

    let ctx = context.clone();
    hooks.invalid.tap(PLUGIN_NAME, move |_| ctx.invalidate());

    let ctx = context.clone();
    hooks.done.tap(PLUGIN_NAME, move |result| ctx.done(result.clone()));

    Ok(())
}

pub(crate) fn check_attachable(compiler: &dyn Compiler) -> Result<()> {
    if compiler.child_stats().is_empty() {
        return Err(MiddlewareError::NoCompiler);
    }

    let hooks = compiler.hooks();
    if hooks.watch_run.is_tapped_by(PLUGIN_NAME)
        || hooks.invalid.is_tapped_by(PLUGIN_NAME)
        || hooks.done.is_tapped_by(PLUGIN_NAME)
    {
        return Err(MiddlewareError::AlreadyAttached(PLUGIN_NAME.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sync_hook_calls_in_order() {
        let hook: SyncHook<usize> = SyncHook::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            hook.tap(tag, move |value: &usize| seen.write().push(format!("{tag}:{value}")));
        }
        hook.call(&7);

        assert_eq!(*seen.read(), vec!["first:7", "second:7"]);
        assert_eq!(hook.len(), 2);
        assert!(hook.is_tapped_by("second"));
        assert!(!hook.is_tapped_by("third"));
    }

    #[test]
    fn test_tap_may_register_while_called() {
        let hook = Arc::new(SyncHook::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&hook);
        let counter = Arc::clone(&calls);
        hook.tap("outer", move |_| {
            let counter = Arc::clone(&counter);
            inner.tap("late", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        hook.call(&());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(hook.len(), 2);
    }
}
