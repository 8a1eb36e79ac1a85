//! Task execution
//!
//! The executor validates the requested tasks, then runs each one depth
//! first: dependency groups in order, the members of a group on their own
//! threads, and finally the task's own commands (or its fallback script).

use crate::config::{Config, NodeId, TaskGraph};
use crate::error::{ExecutionError, Result, TskError};
use crate::runner::env::{compile_global_env, compile_task_env};
use crate::runner::{AbortSignal, CommandRunner, Invocation};
use crate::ui::Logger;
use std::thread;

/// Runs tasks from a validated config through a command runner
pub struct Executor<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    logger: Logger,
}

impl<'a> Executor<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner) -> Self {
        Executor {
            config,
            runner,
            logger: Logger::default(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Run the named tasks in order, stopping at the first failure
    ///
    /// Every requested task and everything it depends on is checked before
    /// any command runs; unknown names and cycles fail without side effects.
    pub fn run(&self, task_names: &[String]) -> Result<()> {
        let graph = TaskGraph::resolve(self.config, task_names)?;
        self.logger.debug(&format!(
            "Resolved {} task(s) for: {}",
            graph.len(),
            task_names.join(", ")
        ));

        let global_env = compile_global_env(self.config)?;

        let state = RunState {
            executor: self,
            graph: &graph,
            global_env: &global_env,
            abort: AbortSignal::new(),
        };

        for &root in graph.roots() {
            state.run_node(root)?;
        }
        Ok(())
    }
}

/// Everything one run shares between its threads
struct RunState<'r, 'a> {
    executor: &'r Executor<'a>,
    graph: &'r TaskGraph<'a>,
    global_env: &'r [String],
    abort: AbortSignal,
}

impl RunState<'_, '_> {
    /// Run a task; a real failure raises the abort signal for everyone else
    fn run_node(&self, id: NodeId) -> Result<()> {
        let result = self.execute_node(id);
        if let Err(e) = &result {
            if !e.is_cancelled() {
                self.abort.trigger();
            }
        }
        result
    }

    fn execute_node(&self, id: NodeId) -> Result<()> {
        if self.abort.is_triggered() {
            return Err(self.abort.reason().into());
        }

        let node = self.graph.node(id);
        let config = self.executor.config;
        let logger = self.executor.logger;

        logger.task_start(node.name);

        for (i, group) in node.groups.iter().enumerate() {
            logger.debug(&format!(
                "{}: dependency group {}/{}: {}",
                node.name,
                i + 1,
                node.groups.len(),
                node.task.deps[i].join(", ")
            ));
            self.run_group(group)?;
        }

        let working_dir = config.working_dir(node.task);
        let env = compile_task_env(node.task, &working_dir, self.global_env)?;
        logger.debug(&format!(
            "{}: {} environment entries{}, in {}",
            node.name,
            env.len(),
            if node.task.pure { " (pure)" } else { "" },
            working_dir.display()
        ));

        let script;
        let commands: Vec<&str> = if node.task.cmds.is_empty() {
            script = config.script_command(node.name);
            vec![script.as_str()]
        } else {
            node.task.cmds.iter().map(String::as_str).collect()
        };

        for command in commands {
            let invocation = Invocation {
                command,
                dir: &working_dir,
                env: &env,
            };
            self.executor.runner.run(&invocation, &self.abort)?;
        }

        logger.task_complete(node.name);
        Ok(())
    }

    /// Run every member of a group concurrently and wait for all of them
    fn run_group(&self, group: &[NodeId]) -> Result<()> {
        let results: Vec<Result<()>> = thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|&dep| (dep, s.spawn(move || self.run_node(dep))))
                .collect();

            handles
                .into_iter()
                .map(|(dep, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        self.abort.trigger();
                        Err(ExecutionError::Panicked(self.graph.node(dep).name.to_string()).into())
                    })
                })
                .collect()
        });

        // The failure that raised the abort outranks the cancellations it caused
        let mut cancelled: Option<TskError> = None;
        for result in results {
            match result {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {
                    cancelled.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        match cancelled {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
