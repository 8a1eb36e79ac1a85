//! End-to-end tests for the tsk binary

mod common;

use assert_cmd::Command;
use common::create_test_config;
use predicates::prelude::*;
use std::fs;

const CONFIG: &str = r#"
[tasks.one]
cmds = ["sleep 0.2", "echo one"]

[tasks.two]
cmds = ["echo two"]

[tasks.three]
cmds = ["echo three"]

[tasks.zero]
description = "Runs after everything else"
cmds = ["echo zero"]
deps = [["one", "two"], ["three"]]

[tasks.args]
cmds = ["echo got {{.CLI_ARGS}}"]

[tasks.leak]
cmds = ["echo ${TSK_PARENT_ONLY:-none}"]
"#;

fn tsk() -> Command {
    let mut cmd = Command::cargo_bin("tsk").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_runs_groups_in_order() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .arg("zero")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^(one\ntwo|two\none)\nthree\nzero\n$").unwrap())
        .stderr(predicate::str::contains("[RUN] echo zero"));
}

#[test]
fn test_quiet_hides_command_echo() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .args(["-q", "two"])
        .assert()
        .success()
        .stdout("two\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_unknown_task_fails() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .args(["two", "nope"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Task 'nope' is not defined"));
}

#[test]
fn test_failing_command_exit_code() {
    let (temp_dir, _) = create_test_config("[tasks.bad]\ncmds = [\"exit 3\"]\n");

    tsk()
        .current_dir(temp_dir.path())
        .arg("bad")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command `exit 3` failed"));
}

#[test]
fn test_cli_args_passthrough() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .args(["args", "--", "a", "b"])
        .assert()
        .success()
        .stdout("got a b\n");
}

#[test]
fn test_pure_flag_hides_parent_env() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .env("TSK_PARENT_ONLY", "leak")
        .arg("leak")
        .assert()
        .success()
        .stdout("leak\n");

    tsk()
        .current_dir(temp_dir.path())
        .env("TSK_PARENT_ONLY", "leak")
        .args(["--pure", "leak"])
        .assert()
        .success()
        .stdout("none\n");
}

#[test]
fn test_explicit_config_file() {
    let (temp_dir, config_path) = create_test_config(CONFIG);
    let elsewhere = temp_dir.path().join("elsewhere");
    fs::create_dir(&elsewhere).unwrap();

    tsk()
        .current_dir(&elsewhere)
        .arg("-f")
        .arg(&config_path)
        .arg("two")
        .assert()
        .success()
        .stdout("two\n");
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    tsk()
        .current_dir(temp_dir.path())
        .arg("-f")
        .arg(temp_dir.path().join("absent.toml"))
        .arg("two")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_list_text_and_filter() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .args(["--list", "-F", "^(zero|args)$"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[zero]"))
        .stdout(predicate::str::contains("# Runs after everything else"))
        .stdout(predicate::str::contains("{{.CLI_ARGS}}"))
        .stdout(predicate::str::contains("[one]").not());
}

#[test]
fn test_list_json() {
    let (temp_dir, _) = create_test_config(CONFIG);

    let output = tsk()
        .current_dir(temp_dir.path())
        .args(["-l", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["zero"]["deps"][0][1], "two");
    assert_eq!(value.as_object().unwrap().len(), 6);
}

#[test]
fn test_which_prints_config_path() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .arg("--which")
        .assert()
        .success()
        .stdout(predicate::str::ends_with("tasks.toml\n"));
}

#[test]
fn test_init_creates_config_once() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    tsk().current_dir(temp_dir.path()).arg("--init").assert().success();
    let contents = fs::read_to_string(temp_dir.path().join("tasks.toml")).unwrap();
    assert!(contents.contains("[tasks.hello]"));

    tsk()
        .current_dir(temp_dir.path())
        .arg("--init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    tsk()
        .current_dir(temp_dir.path())
        .arg("hello")
        .assert()
        .success()
        .stdout("hello!\n");
}

#[test]
fn test_no_tasks_prints_help() {
    let (temp_dir, _) = create_test_config(CONFIG);

    tsk()
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_completions() {
    tsk()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tsk"));
}

#[cfg(unix)]
#[test]
fn test_interrupt_stops_commands_and_their_subprocesses() {
    use std::process::{Command as StdCommand, Stdio};
    use std::thread;
    use std::time::Duration;

    let (temp_dir, _) = create_test_config(
        r#"
[tasks.long]
cmds = ["(sleep 1; touch marker)", "echo never"]
"#,
    );

    let child = StdCommand::new(assert_cmd::cargo::cargo_bin("tsk"))
        .current_dir(temp_dir.path())
        .env("NO_COLOR", "1")
        .arg("long")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGINT);
    }

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Interrupted"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("never"));

    thread::sleep(Duration::from_millis(1200));
    assert!(!temp_dir.path().join("marker").exists());
}
