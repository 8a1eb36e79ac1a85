//! Command execution
//!
//! This module is the boundary to the shell: a command string goes in with a
//! working directory and a compiled environment, success or an error comes out.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::env;
use crate::runner::{AbortSignal, Context, OutputSink, SharedBuffer};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command as StdCommand, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a running command is checked for exit, timeout or abort
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One command to run
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Shell command text, passed to the interpreter unmodified
    pub command: &'a str,

    /// Working directory
    pub dir: &'a Path,

    /// Compiled `KEY=VALUE` list; later entries win
    pub env: &'a [String],
}

/// Runs a single command to completion
///
/// Implementations must not retry: each invocation runs at most once.
pub trait CommandRunner: Sync {
    fn run(&self, invocation: &Invocation<'_>, abort: &AbortSignal) -> ExecutionResult<()>;
}

/// Runs commands through an external shell interpreter
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    ctx: Context,
}

impl ShellRunner {
    pub fn new(ctx: Context) -> Self {
        ShellRunner { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    fn build(&self, invocation: &Invocation<'_>) -> ExecutionResult<StdCommand> {
        let (program, args) = self.ctx.interpreter.split_first().ok_or_else(|| ExecutionError::Launch {
            command: invocation.command.to_string(),
            error: io::Error::new(io::ErrorKind::InvalidInput, "no interpreter configured"),
        })?;

        let mut command = StdCommand::new(program);
        command
            .args(args)
            .arg(invocation.command)
            .current_dir(invocation.dir)
            .env_clear()
            .envs(env::resolve(invocation.env))
            .stdin(Stdio::inherit())
            .stdout(stdio_for(&self.ctx.stdout))
            .stderr(stdio_for(&self.ctx.stderr));

        // Own process group, so a kill reaches everything the shell started
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        Ok(command)
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, invocation: &Invocation<'_>, abort: &AbortSignal) -> ExecutionResult<()> {
        if abort.is_triggered() {
            return Err(abort.reason());
        }

        self.ctx.logger.command(invocation.command);

        let mut child = self.build(invocation)?.spawn().map_err(|error| ExecutionError::Launch {
            command: invocation.command.to_string(),
            error,
        })?;

        let readers: Vec<JoinHandle<()>> = [
            forward(child.stdout.take(), &self.ctx.stdout),
            forward(child.stderr.take(), &self.ctx.stderr),
        ]
        .into_iter()
        .flatten()
        .collect();

        let outcome = wait(&mut child, self.ctx.timeout, abort).map_err(|error| ExecutionError::Launch {
            command: invocation.command.to_string(),
            error,
        })?;

        for reader in readers {
            let _ = reader.join();
        }

        match outcome {
            Outcome::Exited(status) if status.success() => Ok(()),
            Outcome::Exited(status) => Err(ExecutionError::CommandFailed {
                command: invocation.command.to_string(),
                code: status.code(),
            }),
            Outcome::TimedOut => Err(ExecutionError::Timeout {
                command: invocation.command.to_string(),
                after: self.ctx.timeout,
            }),
            Outcome::Aborted => Err(abort.reason()),
        }
    }
}

enum Outcome {
    Exited(ExitStatus),
    TimedOut,
    Aborted,
}

/// Wait for the child, killing it on timeout or abort
fn wait(child: &mut Child, timeout: Duration, abort: &AbortSignal) -> io::Result<Outcome> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Outcome::Exited(status));
        }

        let outcome = if abort.is_triggered() {
            Outcome::Aborted
        } else if Instant::now() >= deadline {
            Outcome::TimedOut
        } else {
            thread::sleep(POLL_INTERVAL);
            continue;
        };

        terminate(child);
        child.wait()?;
        return Ok(outcome);
    }
}

/// Kill the child's whole process group
#[cfg(unix)]
fn terminate(child: &mut Child) {
    // The child leads its group and is not yet reaped, so its pid names the group
    let group = child.id() as libc::pid_t;
    // SAFETY: killpg has no memory-safety preconditions
    if unsafe { libc::killpg(group, libc::SIGKILL) } != 0 {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    // The child may exit on its own between try_wait and kill
    let _ = child.kill();
}

fn stdio_for(sink: &OutputSink) -> Stdio {
    match sink {
        OutputSink::Inherit => Stdio::inherit(),
        OutputSink::Capture(_) => Stdio::piped(),
    }
}

/// Copy a captured pipe into its buffer, one line at a time
fn forward<R: Read + Send + 'static>(pipe: Option<R>, sink: &OutputSink) -> Option<JoinHandle<()>> {
    let (pipe, buffer) = match (pipe, sink) {
        (Some(pipe), OutputSink::Capture(buffer)) => (pipe, buffer.clone()),
        _ => return None,
    };

    Some(thread::spawn(move || copy_lines(pipe, &buffer)))
}

fn copy_lines<R: Read>(pipe: R, buffer: &SharedBuffer) {
    let mut reader = BufReader::new(pipe);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => buffer.append(&line),
        }
    }
}
