use std::time::{Duration, Instant};

use netharden_core::exec::{CommandRunner, ExecError};
use netharden_windows::command::SystemCommandRunner;

#[cfg(windows)]
fn echo_command() -> (&'static str, Vec<&'static str>) {
    ("cmd", vec!["/C", "echo SUCCESS"])
}

#[cfg(not(windows))]
fn echo_command() -> (&'static str, Vec<&'static str>) {
    ("sh", vec!["-c", "echo SUCCESS"])
}

#[cfg(windows)]
fn slow_command() -> (&'static str, Vec<&'static str>) {
    ("ping", vec!["-n", "10", "127.0.0.1"])
}

#[cfg(not(windows))]
fn slow_command() -> (&'static str, Vec<&'static str>) {
    ("sleep", vec!["10"])
}

#[test]
fn captures_stdout_and_exit_code() {
    let runner = SystemCommandRunner::new(Duration::from_secs(10));
    let (program, args) = echo_command();
    let out = runner.run(program, &args).expect("run echo");
    assert!(out.stdout.contains("SUCCESS"));
    assert!(out.success());
}

#[test]
fn timeout_kills_child_and_reports_error() {
    let runner = SystemCommandRunner::new(Duration::from_millis(300));
    let (program, args) = slow_command();
    let started = Instant::now();
    let err = runner.run(program, &args).expect_err("should time out");
    assert!(matches!(err, ExecError::Timeout { .. }), "{err}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn missing_program_is_spawn_error() {
    let runner = SystemCommandRunner::new(Duration::from_secs(1));
    let err = runner
        .run("netharden-definitely-missing-tool", &[])
        .expect_err("spawn should fail");
    assert!(matches!(err, ExecError::Spawn { .. }), "{err}");
}

#[cfg(unix)]
#[test]
fn background_grandchild_holding_pipes_does_not_outlive_timeout() {
    let runner = SystemCommandRunner::new(Duration::from_secs(1));
    let started = Instant::now();
    let result = runner.run("sh", &["-c", "sleep 8 & echo hi"]);
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "run blocked for {:?}",
        started.elapsed()
    );
    let err = result.expect_err("inherited pipes should hit the deadline");
    assert!(matches!(err, ExecError::Timeout { .. }), "{err}");
}
