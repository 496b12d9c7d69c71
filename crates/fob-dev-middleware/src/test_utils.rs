//! Test helpers: a scriptable compiler and capturing reporters.

use std::io::Write;
use std::sync::Arc;

use fob_dev_config::StatsSetting;
use parking_lot::Mutex;

use crate::compilation::BuildResult;
use crate::hooks::{Compiler, CompilerHooks};
use crate::stats::{PrintOptions, Reporter};

/// Compiler driven by hand from a test.
#[derive(Debug)]
pub struct TestCompiler {
    hooks: CompilerHooks,
    children: Vec<Option<StatsSetting>>,
    multi: bool,
}

impl TestCompiler {
    /// Single compiler without its own stats setting.
    pub fn new() -> Self {
        Self::single(None)
    }

    pub fn single(stats: Option<StatsSetting>) -> Self {
        Self {
            hooks: CompilerHooks::default(),
            children: vec![stats],
            multi: false,
        }
    }

    /// Composite compiler with one entry per child.
    pub fn multi(children: Vec<Option<StatsSetting>>) -> Self {
        Self {
            hooks: CompilerHooks::default(),
            children,
            multi: true,
        }
    }

    pub fn watch_run(&self) {
        self.hooks.watch_run.call(&());
    }

    pub fn invalidate(&self) {
        self.hooks.invalid.call(&());
    }

    pub fn finish(&self, result: BuildResult) {
        self.hooks.done.call(&result);
    }
}

impl Default for TestCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for TestCompiler {
    fn hooks(&self) -> &CompilerHooks {
        &self.hooks
    }

    fn child_stats(&self) -> Vec<Option<StatsSetting>> {
        self.children.clone()
    }

    fn is_multi(&self) -> bool {
        self.multi
    }
}

/// Shared event log for asserting relative ordering.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }
}

/// Reporter that appends `report:<names>` to an [`EventLog`].
#[derive(Debug, Clone)]
pub struct RecordingReporter {
    log: EventLog,
    options: Arc<Mutex<Vec<PrintOptions>>>,
}

impl RecordingReporter {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            options: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Print options passed to each report, in order.
    pub fn options(&self) -> Vec<PrintOptions> {
        self.options.lock().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, result: &BuildResult, options: &PrintOptions) {
        let names: Vec<&str> = result
            .children()
            .iter()
            .map(|child| child.name().unwrap_or("?"))
            .collect();
        self.log.push(format!("report:{}", names.join(",")));
        self.options.lock().push(options.clone());
    }
}

/// `Write` sink whose contents stay readable after handing it out.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Name of the first child, for callbacks that record which build they saw.
pub fn first_name(result: &BuildResult) -> String {
    result
        .children()
        .first()
        .and_then(|child| child.name())
        .unwrap_or("")
        .to_string()
}
