//! Execution context for task running
//!
//! The context carries the settings every command invocation shares: the
//! interpreter, the runtime bound, where output goes and how loud to be.

use crate::config::{Config, DEFAULT_TIMEOUT};
use crate::error::{ConfigResult, ExecutionError};
use crate::ui::{Logger, Verbosity};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Interpreter used when the config doesn't name one
pub const DEFAULT_INTERPRETER: &[&str] = &["sh", "-e", "-c"];

/// Execution settings shared by all commands of a run
#[derive(Debug, Clone)]
pub struct Context {
    /// Interpreter argv prefix; the command text is appended as the last argument
    pub interpreter: Vec<String>,

    /// Upper bound on a single command's runtime
    pub timeout: Duration,

    /// Where command stdout goes
    pub stdout: OutputSink,

    /// Where command stderr goes
    pub stderr: OutputSink,

    /// Diagnostics
    pub logger: Logger,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            interpreter: DEFAULT_INTERPRETER.iter().map(|s| s.to_string()).collect(),
            timeout: DEFAULT_TIMEOUT,
            stdout: OutputSink::Inherit,
            stderr: OutputSink::Inherit,
            logger: Logger::default(),
        }
    }

    /// Create a context using the interpreter and timeout from a config
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let mut ctx = Context::new().with_timeout(config.command_timeout()?);
        if let Some(interpreter) = config.interpreter.as_ref().filter(|i| !i.is_empty()) {
            ctx = ctx.with_interpreter(interpreter.clone());
        }
        Ok(ctx)
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set the per-command runtime bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the stdout sink
    pub fn with_stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = sink;
        self
    }

    /// Set the stderr sink
    pub fn with_stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = sink;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.logger = Logger::new(verbosity);
        self
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for a command's output stream
#[derive(Debug, Clone, Default)]
pub enum OutputSink {
    /// Share the runner's own stream
    #[default]
    Inherit,

    /// Collect output line by line into a shared buffer
    Capture(SharedBuffer),
}

/// A byte buffer that concurrent commands append whole lines to
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Append one chunk atomically with respect to other writers
    pub fn append(&self, bytes: &[u8]) {
        let mut buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        buf.extend_from_slice(bytes);
    }
}

/// Set from the SIGINT/SIGTERM handler
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Run-wide flag raised by the first failure
///
/// Running commands are killed and no new commands start once it is raised.
/// An interrupt raises every signal at once.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst) || INTERRUPTED.load(Ordering::SeqCst)
    }

    /// The error reported by work stopped through this signal
    pub fn reason(&self) -> ExecutionError {
        if INTERRUPTED.load(Ordering::SeqCst) {
            ExecutionError::Interrupted
        } else {
            ExecutionError::Cancelled
        }
    }
}

/// Turn SIGINT and SIGTERM into an abort of every run
///
/// Commands live in their own process groups, so a terminal interrupt reaches
/// only tsk; the wait loop then kills whatever is still running.
#[cfg(unix)]
pub fn install_interrupt_handler() {
    extern "C" fn on_interrupt(_signal: libc::c_int) {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }

    let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

#[cfg(not(unix))]
pub fn install_interrupt_handler() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.interpreter, vec!["sh", "-e", "-c"]);
        assert_eq!(ctx.timeout, Duration::from_secs(15));
        assert_eq!(ctx.logger.verbosity(), Verbosity::Normal);
        assert!(matches!(ctx.stdout, OutputSink::Inherit));
    }

    #[test]
    fn test_context_from_config() {
        let config = Config {
            interpreter: Some(vec!["bash".to_string(), "-c".to_string()]),
            timeout: Some("90s".to_string()),
            ..Config::default()
        };

        let ctx = Context::from_config(&config).unwrap();
        assert_eq!(ctx.interpreter, vec!["bash", "-c"]);
        assert_eq!(ctx.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_empty_interpreter_falls_back() {
        let config = Config {
            interpreter: Some(Vec::new()),
            ..Config::default()
        };

        let ctx = Context::from_config(&config).unwrap();
        assert_eq!(ctx.interpreter, vec!["sh", "-e", "-c"]);
    }

    #[test]
    fn test_with_verbosity() {
        let ctx = Context::new().with_verbosity(Verbosity::Verbose);
        assert_eq!(ctx.logger.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_shared_buffer_is_shared() {
        let buffer = SharedBuffer::new();
        let writer = buffer.clone();
        writer.append(b"one\n");
        buffer.append(b"two\n");
        assert_eq!(buffer.contents(), "one\ntwo\n");
    }

    #[test]
    fn test_abort_signal() {
        let signal = AbortSignal::new();
        let shared = signal.clone();
        assert!(!signal.is_triggered());
        shared.trigger();
        assert!(signal.is_triggered());
        assert!(matches!(signal.reason(), ExecutionError::Cancelled));
    }
}
