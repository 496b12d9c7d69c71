//! Build validity and request buffering.
//!
//! [`CompilationState`] is the synchronous core of the middleware. It knows
//! whether the last build is usable, holds callers that arrived while a build
//! was running, and releases them once a completed build has been confirmed
//! by a flush.
//!
//! Flushing is a separate step from `done` so that an invalidation arriving
//! right after a build completes can cancel the release. `done` hands back a
//! [`FlushTicket`]; the owner runs it later with [`CompilationState::flush`].
//! Tickets from superseded builds are ignored.

use std::fmt;

use crate::compilation::BuildResult;

/// A caller waiting for a valid build
pub type ResultCallback = Box<dyn FnOnce(BuildResult) + Send>;

/// Permission to flush the build that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushTicket {
    generation: u64,
}

impl FlushTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Validity, last result and queued callers of one compiler.
///
/// The state is valid exactly when a result is present.
#[derive(Default)]
pub struct CompilationState {
    result: Option<BuildResult>,
    callbacks: Vec<ResultCallback>,
    generation: u64,
    pending_flush: Option<u64>,
}

impl CompilationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&BuildResult> {
        self.result.as_ref()
    }

    /// Number of callers waiting for the next flush
    pub fn pending(&self) -> usize {
        self.callbacks.len()
    }

    /// A build started or its inputs changed.
    pub fn invalidate(&mut self) {
        if self.result.take().is_some() {
            tracing::info!("Compilation starting...");
        }
        self.pending_flush = None;
    }

    /// A build finished. Queued callers are released by flushing the
    /// returned ticket.
    pub fn done(&mut self, result: BuildResult) -> FlushTicket {
        self.generation += 1;
        self.result = Some(result);
        self.pending_flush = Some(self.generation);

        FlushTicket {
            generation: self.generation,
        }
    }

    /// Release queued callers if `ticket` still belongs to the current build.
    ///
    /// `report` runs once before any callback. Returns the number of
    /// callbacks invoked; a stale or repeated ticket invokes nothing and
    /// leaves the queue untouched.
    pub fn flush(&mut self, ticket: FlushTicket, report: impl FnOnce(&BuildResult)) -> usize {
        if self.pending_flush != Some(ticket.generation) {
            return 0;
        }
        let Some(result) = self.result.clone() else {
            return 0;
        };
        self.pending_flush = None;

        tracing::info!("Compilation finished");

        let callbacks = std::mem::take(&mut self.callbacks);
        report(&result);

        let count = callbacks.len();
        for callback in callbacks {
            callback(result.clone());
        }
        count
    }

    /// Run `callback` with the current result, or queue it until the next
    /// flush when no valid build is available.
    pub fn await_result(&mut self, callback: ResultCallback, label: Option<&str>) {
        if let Some(result) = &self.result {
            callback(result.clone());
            return;
        }

        match label {
            Some(label) if !label.is_empty() => {
                tracing::info!("wait until bundle finished: {}", label)
            }
            _ => tracing::info!("wait until bundle finished"),
        }
        self.callbacks.push(callback);
    }
}

impl fmt::Debug for CompilationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationState")
            .field("valid", &self.is_valid())
            .field("pending", &self.callbacks.len())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::{Compilation, StaticCompilation};
    use std::sync::{Arc, Mutex};

    fn build(name: &str) -> BuildResult {
        BuildResult::single(StaticCompilation::new("/dist").with_name(name))
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> ResultCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let seen = Arc::clone(&seen);
            move |tag: &str| -> ResultCallback {
                let seen = Arc::clone(&seen);
                let tag = tag.to_string();
                Box::new(move |result: BuildResult| {
                    let name = result.children()[0].name().unwrap_or("").to_string();
                    seen.lock().unwrap().push(format!("{tag}:{name}"));
                })
            }
        };
        (seen, make)
    }

    #[test]
    fn test_starts_invalid() {
        let state = CompilationState::new();
        assert!(!state.is_valid());
        assert!(state.result().is_none());
    }

    #[test]
    fn test_valid_state_invokes_immediately() {
        let (seen, make) = recorder();
        let mut state = CompilationState::new();
        state.done(build("one"));

        state.await_result(make("a"), None);
        assert_eq!(*seen.lock().unwrap(), vec!["a:one"]);
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn test_queued_until_flush() {
        let (seen, make) = recorder();
        let mut state = CompilationState::new();

        state.await_result(make("a"), Some("/app.js"));
        state.await_result(make("b"), None);
        assert!(seen.lock().unwrap().is_empty());

        let ticket = state.done(build("one"));
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(state.flush(ticket, |_| {}), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["a:one", "b:one"]);
    }

    #[test]
    fn test_invalidate_before_flush_cancels_release() {
        let (seen, make) = recorder();
        let mut state = CompilationState::new();
        state.await_result(make("a"), None);

        let ticket = state.done(build("one"));
        state.invalidate();
        assert_eq!(state.flush(ticket, |_| {}), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(state.pending(), 1);

        let ticket = state.done(build("two"));
        assert_eq!(state.flush(ticket, |_| {}), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["a:two"]);
    }

    #[test]
    fn test_superseded_ticket_is_ignored() {
        let (seen, make) = recorder();
        let mut state = CompilationState::new();
        state.await_result(make("a"), None);

        let first = state.done(build("one"));
        state.invalidate();
        let second = state.done(build("two"));

        assert_eq!(state.flush(first, |_| {}), 0);
        assert_eq!(state.flush(second, |_| {}), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["a:two"]);
    }

    #[test]
    fn test_ticket_flushes_once() {
        let mut state = CompilationState::new();
        let ticket = state.done(build("one"));
        let mut reports = 0;

        state.flush(ticket, |_| reports += 1);
        state.flush(ticket, |_| reports += 1);
        assert_eq!(reports, 1);
    }

    #[test]
    fn test_report_runs_before_callbacks() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut state = CompilationState::new();

        let log = Arc::clone(&order);
        state.await_result(Box::new(move |_: BuildResult| log.lock().unwrap().push("callback")), None);

        let ticket = state.done(build("one"));
        let log = Arc::clone(&order);
        state.flush(ticket, move |_| log.lock().unwrap().push("report"));

        assert_eq!(*order.lock().unwrap(), vec!["report", "callback"]);
    }

    #[test]
    fn test_flush_reports_even_without_waiters() {
        let mut state = CompilationState::new();
        let ticket = state.done(build("one"));
        let mut reported = false;

        assert_eq!(state.flush(ticket, |_| reported = true), 0);
        assert!(reported);
    }
}
