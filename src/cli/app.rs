//! Main CLI application

use crate::cli::init::init_config_file;
use crate::cli::list::OutputFormat;
use crate::config::template::CLI_ARGS_PLACEHOLDER;
use crate::config::{parse_config_auto, parse_config_file, parse_timeout, Config, ParseOptions};
use crate::runner::{install_interrupt_handler, Context, Executor, ShellRunner};
use crate::ui::{Logger, Verbosity};
use anyhow::anyhow;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use regex::Regex;
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

/// Everything the command line asked for
#[derive(Debug, Clone)]
pub struct Options {
    /// Tasks to run, in order
    pub tasks: Vec<String>,

    /// Words after `--`, joined by spaces
    pub cli_args: String,

    /// Explicit config file
    pub file: Option<PathBuf>,

    pub list: bool,
    pub output: OutputFormat,
    pub filter: String,
    pub pure: bool,
    pub which: bool,
    pub init: bool,
    pub completions: Option<Shell>,
    pub timeout: Option<String>,
    pub verbosity: Verbosity,
}

impl Options {
    /// Read options from parsed matches
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let strings = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };

        Options {
            tasks: strings("tasks"),
            cli_args: strings("cli_args").join(" "),
            file: matches.get_one::<PathBuf>("file").cloned(),
            list: matches.get_flag("list"),
            output: matches.get_one::<OutputFormat>("output").copied().unwrap_or_default(),
            filter: matches
                .get_one::<String>("filter")
                .cloned()
                .unwrap_or_else(|| ".*".to_string()),
            pure: matches.get_flag("pure"),
            which: matches.get_flag("which"),
            init: matches.get_flag("init"),
            completions: matches.get_one::<Shell>("completions").copied(),
            timeout: matches.get_one::<String>("timeout").cloned(),
            verbosity: get_verbosity(matches),
        }
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("tsk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A TOML-based task runner")
        .arg(
            Arg::new("tasks")
                .value_name("TASK")
                .num_args(0..)
                .help("Tasks to run, in order"),
        )
        .arg(
            Arg::new("cli_args")
                .value_name("ARGS")
                .num_args(0..)
                .last(true)
                .help(format!(
                    "Words substituted for {} in tasks.toml",
                    CLI_ARGS_PLACEHOLDER
                )),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to tasks.toml (default: search upwards from the current directory)"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .value_parser(value_parser!(OutputFormat))
                .default_value("text")
                .help("Output format for --list"),
        )
        .arg(
            Arg::new("filter")
                .short('F')
                .long("filter")
                .value_name("REGEX")
                .default_value(".*")
                .help("Only list tasks whose names match"),
        )
        .arg(
            Arg::new("pure")
                .long("pure")
                .help("Don't inherit the parent environment in any task")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("which")
                .long("which")
                .help("Print the path to the tasks.toml in use")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("init")
                .long("init")
                .help("Create a tasks.toml in the current directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print shell completions"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("DURATION")
                .help("Kill any command running longer than this (e.g. 30s, 5m)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no diagnostics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Load the config named on the command line, or discover one
fn load_config(options: &Options) -> anyhow::Result<Config> {
    let parse_options = ParseOptions {
        cli_args: options.cli_args.clone(),
        keep_placeholder: options.list,
    };

    let config = match &options.file {
        Some(path) => parse_config_file(path, &parse_options)?,
        None => parse_config_auto(&parse_options)?,
    };
    Ok(config)
}

/// Run the CLI application with the process arguments
pub fn run() -> anyhow::Result<()> {
    run_from(env::args_os())
}

/// Run the CLI application with provided arguments
pub fn run_from<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command();
    let matches = command.clone().get_matches_from(args);
    let options = Options::from_matches(&matches);
    let logger = Logger::new(options.verbosity);

    // Modes that don't need a config
    if let Some(shell) = options.completions {
        clap_complete::generate(shell, &mut command, "tsk", &mut io::stdout());
        return Ok(());
    }

    if options.init {
        let cwd = env::current_dir().map_err(|e| anyhow!("Failed to get current directory: {}", e))?;
        let path = init_config_file(&cwd)?;
        logger.info(&format!("created {}", path.display()));
        return Ok(());
    }

    let config = load_config(&options)?;

    if options.which {
        if let Some(path) = &config.path {
            println!("{}", path.display());
        }
        if !options.list && options.tasks.is_empty() {
            return Ok(());
        }
    }

    if options.list {
        let filter = Regex::new(&options.filter)
            .map_err(|e| anyhow!("Invalid --filter '{}': {}", options.filter, e))?;
        print!("{}", options.output.render(&config, &filter)?);
        return Ok(());
    }

    if options.tasks.is_empty() {
        command.print_help()?;
        println!();
        return Ok(());
    }

    let config = if options.pure { config.into_pure() } else { config };

    let mut ctx = Context::from_config(&config)?.with_verbosity(options.verbosity);
    if let Some(timeout) = &options.timeout {
        ctx = ctx.with_timeout(parse_timeout(timeout)?);
    }

    install_interrupt_handler();
    let runner = ShellRunner::new(ctx);
    Executor::new(&config, &runner)
        .with_logger(logger)
        .run(&options.tasks)?;

    Ok(())
}
