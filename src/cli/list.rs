//! Task listings
//!
//! One renderer per output format; the format is picked once from the
//! command line.

use crate::config::{Config, Task};
use crate::error::TskError;
use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Output formats for `--list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    #[value(name = "md")]
    Markdown,
    Json,
    Toml,
}

impl OutputFormat {
    /// Render the tasks whose names match `filter`, in name order
    pub fn render(self, config: &Config, filter: &Regex) -> crate::Result<String> {
        let tasks = filter_tasks(config, filter);
        match self {
            OutputFormat::Text => render_text(&tasks, config).map_err(render_error),
            OutputFormat::Markdown => render_markdown(&tasks, config).map_err(render_error),
            OutputFormat::Json => render_json(&tasks),
            OutputFormat::Toml => render_toml(&tasks),
        }
    }
}

type TaskList<'a> = BTreeMap<&'a str, &'a Task>;

/// Tasks whose names match the filter
pub fn filter_tasks<'a>(config: &'a Config, filter: &Regex) -> TaskList<'a> {
    config
        .tasks
        .iter()
        .filter(|(name, _)| filter.is_match(name))
        .map(|(name, task)| (name.as_str(), task))
        .collect()
}

fn render_text(tasks: &TaskList<'_>, config: &Config) -> Result<String, fmt::Error> {
    const INDENT: &str = "  ";
    let mut out = String::new();

    for (name, task) in tasks {
        writeln!(out, "[{}]", name)?;

        if let Some(description) = &task.description {
            writeln!(out, "{}# {}", INDENT, description)?;
        }

        if task.cmds.is_empty() {
            writeln!(out, "{}# will run `{}`", INDENT, config.script_command(name))?;
        } else {
            writeln!(out, "{}cmds = [", INDENT)?;
            for cmd in &task.cmds {
                writeln!(out, "{}{}{:?},", INDENT, INDENT, cmd)?;
            }
            writeln!(out, "{}]", INDENT)?;
        }

        if !task.deps.is_empty() {
            writeln!(out, "{}deps = {:?}", INDENT, task.deps)?;
        }
        if let Some(dir) = &task.dir {
            writeln!(out, "{}dir = {:?}", INDENT, dir)?;
        }
        if let Some(dotenv) = &task.dotenv {
            writeln!(out, "{}dotenv = {:?}", INDENT, dotenv)?;
        }
        if task.pure {
            writeln!(out, "{}pure = true", INDENT)?;
        }

        out.push('\n');
    }

    Ok(out)
}

fn render_markdown(tasks: &TaskList<'_>, config: &Config) -> Result<String, fmt::Error> {
    let mut out = String::from("# Tasks\n");

    for (name, task) in tasks {
        writeln!(out, "\n## {}\n", name)?;

        if let Some(description) = &task.description {
            writeln!(out, "{}\n", description)?;
        }

        if !task.deps.is_empty() {
            let groups: Vec<String> = task
                .deps
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|dep| format!("`{}`", dep))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect();
            writeln!(out, "Depends on: {}\n", groups.join(", then "))?;
        }

        out.push_str("```sh\n");
        if task.cmds.is_empty() {
            writeln!(out, "{}", config.script_command(name))?;
        } else {
            for cmd in &task.cmds {
                writeln!(out, "{}", cmd)?;
            }
        }
        out.push_str("```\n");
    }

    Ok(out)
}

fn render_error(e: impl fmt::Display) -> TskError {
    TskError::Render(e.to_string())
}

fn render_json(tasks: &TaskList<'_>) -> crate::Result<String> {
    let mut out = serde_json::to_string_pretty(tasks).map_err(render_error)?;
    out.push('\n');
    Ok(out)
}

fn render_toml(tasks: &TaskList<'_>) -> crate::Result<String> {
    #[derive(Serialize)]
    struct Document<'a> {
        tasks: &'a TaskList<'a>,
    }

    toml::to_string(&Document { tasks }).map_err(render_error)
}
