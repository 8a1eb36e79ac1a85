//! Verbosity-gated diagnostics
//!
//! Everything here goes to stderr so task output on stdout stays clean.

use colored::Colorize;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 3,
}

/// Prints diagnostics at or below the configured verbosity
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    verbosity: Verbosity,
}

impl Logger {
    pub fn new(verbosity: Verbosity) -> Self {
        Logger { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether a message at `level` would be printed
    pub fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    /// Echo a command before it runs
    pub fn command(&self, command: &str) {
        if self.enabled(Verbosity::Normal) {
            eprintln!("{} {}", "[RUN]".cyan().bold(), command);
        }
    }

    pub fn info(&self, message: &str) {
        if self.enabled(Verbosity::Normal) {
            eprintln!("{} {}", "[INFO]".green(), message);
        }
    }

    /// Only printed in verbose mode
    pub fn debug(&self, message: &str) {
        if self.enabled(Verbosity::Verbose) {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    pub fn task_start(&self, task_name: &str) {
        self.debug(&format!("Running task: {}", task_name));
    }

    pub fn task_complete(&self, task_name: &str) {
        self.debug(&format!("Task completed: {}", task_name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(Logger::default().verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_enabled() {
        let logger = Logger::new(Verbosity::Quiet);
        assert!(logger.enabled(Verbosity::Quiet));
        assert!(logger.enabled(Verbosity::Silent));
        assert!(!logger.enabled(Verbosity::Normal));

        let logger = Logger::new(Verbosity::Verbose);
        assert!(logger.enabled(Verbosity::Verbose));
    }
}
