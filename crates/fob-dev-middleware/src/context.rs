//! Actor that owns the compilation state.
//!
//! ```text
//! hooks --Invalidated/Done--> mailbox --> actor (CompilationState)
//! requests --Await---------->    ^            |
//!                                 +---Tick-----+
//! ```
//!
//! Every transition is a message, so the state is only touched from one
//! task. After a `Done` the actor posts a `Tick` to the back of its own
//! mailbox: signals already queued behind the `Done` (a build tool that
//! re-invalidates synchronously) are applied before the flush runs.
//!
//! Signals sent from another thread can race the actor, so the mailbox
//! alone doesn't order them. Every `invalidate`/`done` call also bumps a
//! build counter kept beside the snapshot before it returns, and a `Tick`
//! only flushes when that counter still names the build it was posted for.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::compilation::BuildResult;
use crate::error::{MiddlewareError, Result};
use crate::state::{CompilationState, FlushTicket, ResultCallback};
use crate::stats::{PrintOptions, Reporter};

enum Signal {
    Invalidated,
    Done { result: BuildResult, build: u64 },
    Await {
        callback: ResultCallback,
        label: Option<String>,
    },
    Tick { ticket: FlushTicket, build: u64 },
}

/// State visible outside the actor, written by the signalling side.
#[derive(Default)]
struct Snapshot {
    result: Option<BuildResult>,
    /// Bumped by every `invalidate` and `done`
    build: u64,
}

/// Handle to the build context actor. Cheap to clone.
///
/// The actor exits once every handle is dropped. Callers still queued at
/// that point are dropped without being invoked.
#[derive(Clone)]
pub struct Context {
    tx: mpsc::UnboundedSender<Signal>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl Context {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(reporter: Arc<dyn Reporter>, options: PrintOptions) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| MiddlewareError::NoRuntime)?;
        Ok(Self::spawn_on(&handle, reporter, options))
    }

    /// Spawn the actor on a specific runtime.
    pub fn spawn_on(handle: &Handle, reporter: Arc<dyn Reporter>, options: PrintOptions) -> Self {
        let (context, actor) = Self::with_actor(reporter, options);
        handle.spawn(actor.run());
        context
    }

    fn with_actor(reporter: Arc<dyn Reporter>, options: PrintOptions) -> (Self, Actor) {
        let (tx, rx) = mpsc::unbounded_channel();
        let snapshot = Arc::new(RwLock::new(Snapshot::default()));
        let actor = Actor {
            rx,
            tx: tx.downgrade(),
            snapshot: Arc::clone(&snapshot),
            state: CompilationState::new(),
            reporter,
            options,
            orphan: None,
        };
        (Self { tx, snapshot }, actor)
    }

    /// A build started or was invalidated.
    pub fn invalidate(&self) {
        // Snapshot and mailbox are updated under one lock so readers never
        // observe them out of order
        let mut snapshot = self.snapshot.write();
        snapshot.result = None;
        snapshot.build += 1;
        self.send(Signal::Invalidated);
    }

    /// A build completed with `result`.
    pub fn done(&self, result: BuildResult) {
        let mut snapshot = self.snapshot.write();
        snapshot.result = Some(result.clone());
        snapshot.build += 1;
        let build = snapshot.build;
        self.send(Signal::Done { result, build });
    }

    /// Run `callback` with a valid build result.
    ///
    /// Invokes synchronously when the last build is valid; otherwise queues
    /// the callback until the next completed build is flushed.
    pub fn await_result<F>(&self, callback: F, label: Option<&str>)
    where
        F: FnOnce(BuildResult) + Send + 'static,
    {
        let current = self.snapshot.read().result.clone();
        if let Some(result) = current {
            callback(result);
            return;
        }

        self.send(Signal::Await {
            callback: Box::new(callback),
            label: label.map(str::to_string),
        });
    }

    /// Wait for a valid build result.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::ContextClosed` if the actor shut down
    /// before a build completed.
    pub async fn wait_until_valid(&self, label: Option<&str>) -> Result<BuildResult> {
        let (tx, rx) = oneshot::channel();
        self.await_result(
            move |result| {
                let _ = tx.send(result);
            },
            label,
        );
        rx.await.map_err(|_| MiddlewareError::ContextClosed)
    }

    pub fn is_valid(&self) -> bool {
        self.snapshot.read().result.is_some()
    }

    /// The last valid result, if the build is currently valid.
    pub fn snapshot(&self) -> Option<BuildResult> {
        self.snapshot.read().result.clone()
    }

    fn send(&self, signal: Signal) {
        if self.tx.send(signal).is_err() {
            tracing::warn!("build context is closed, dropping signal");
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}

struct Actor {
    rx: mpsc::UnboundedReceiver<Signal>,
    tx: mpsc::WeakUnboundedSender<Signal>,
    snapshot: Arc<RwLock<Snapshot>>,
    state: CompilationState,
    reporter: Arc<dyn Reporter>,
    options: PrintOptions,
    /// Ticket whose Tick could not be posted because every handle is gone
    orphan: Option<(FlushTicket, u64)>,
}

impl Actor {
    async fn run(mut self) {
        while let Some(signal) = self.rx.recv().await {
            self.handle(signal);
        }

        if let Some((ticket, build)) = self.orphan.take() {
            self.flush(ticket, build);
        }
        tracing::debug!(pending = self.state.pending(), "build context closed");
    }

    fn handle(&mut self, signal: Signal) {
        match signal {
            Signal::Invalidated => self.state.invalidate(),
            Signal::Done { result, build } => {
                let ticket = self.state.done(result);
                match self.tx.upgrade() {
                    Some(tx) => {
                        let _ = tx.send(Signal::Tick { ticket, build });
                    }
                    None => self.orphan = Some((ticket, build)),
                }
            }
            Signal::Await { callback, label } => {
                self.state.await_result(callback, label.as_deref());
            }
            Signal::Tick { ticket, build } => self.flush(ticket, build),
        }
    }

    fn flush(&mut self, ticket: FlushTicket, build: u64) {
        // The lock is released before flushing: callbacks may signal again
        let current = self.snapshot.read().build;
        if current != build {
            tracing::debug!(build, current, "skipping flush of superseded build");
            return;
        }

        let reporter = &self.reporter;
        let options = &self.options;
        self.state
            .flush(ticket, |result| reporter.report(result, options));
    }
}
