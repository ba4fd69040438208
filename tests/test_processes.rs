//! Integration tests for process orchestration: pipelines, command
//! substitution, background jobs and exit statuses

#[path = "common/mod.rs"]
mod common;
use common::{flint, stdout_of, Sandbox};

use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

// ============================================
// Pipelines
// ============================================

#[test]
fn test_three_stage_pipeline() {
    let out = stdout_of("echo a b c | tr ' ' '\\n' | wc -l");
    assert_eq!(out.trim(), "3");
}

#[test]
fn test_four_stage_pipeline_keeps_order() {
    let out = stdout_of("printf 'b\\na\\nc\\n' | sort | head -n 2 | tr -d '\\n'");
    assert_eq!(out, "ab");
}

#[test]
fn test_pipeline_larger_than_pipe_buffer() {
    let out = stdout_of("seq 1 100000 | cat | wc -l");
    assert_eq!(out.trim(), "100000");
}

#[test]
fn test_pipeline_status_is_last_stage() {
    flint("false | true").success();
    flint("true | false").code(1);
}

#[test]
fn test_builtin_as_pipeline_stage() {
    flint("println hello | tr a-z A-Z").success().stdout("HELLO\n");
}

#[test]
fn test_function_as_pipeline_stage() {
    flint("fun shout\n println loud\nend\nshout | tr a-z A-Z")
        .success()
        .stdout("LOUD\n");
}

#[test]
fn test_writer_dies_when_reader_exits() {
    Sandbox::new()
        .run("sh -c 'while true; do echo y; done' | head -n 1")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout("y\n");
}

#[test]
fn test_broken_pipe_is_silent() {
    flint("yes | head -n 2 | cat")
        .success()
        .stdout("y\ny\n")
        .stderr(predicate::str::contains("Broken pipe").not());
}

#[test]
fn test_reader_sees_eof_when_writer_exits() {
    // `cat` only terminates if no stage keeps a stray write end open
    flint("echo done | cat | cat | cat").success().stdout("done\n");
}

// ============================================
// Command substitution
// ============================================

#[test]
fn test_substitution_of_external_program() {
    flint("echo $(echo hi)").success().stdout("hi\n");
}

#[test]
fn test_nested_substitution() {
    flint("echo \"[$(echo $(echo deep))]\"")
        .success()
        .stdout("[deep]\n");
}

#[test]
fn test_substitution_captures_builtins() {
    flint("let x \"$(println captured)\"\nprintln \"<$x>\"")
        .success()
        .stdout("<captured>\n");
}

#[test]
fn test_substitution_strips_one_trailing_newline() {
    flint("println \"[$(printf 'x\\n\\n')]\"")
        .success()
        .stdout("[x\n]\n");
}

#[test]
fn test_unquoted_substitution_is_split() {
    flint("echo $(printf 'a   b')").success().stdout("a b\n");
}

#[test]
fn test_large_substitution_does_not_deadlock() {
    // larger than the pipe buffer, and passed to a builtin so no exec
    // argument limit applies
    let out = stdout_of("println \"$(seq 1 50000)\" | wc -l");
    assert_eq!(out.trim(), "50000");
}

#[test]
fn test_output_after_substitution_reaches_stdout() {
    flint("let x \"$(echo inner)\"\necho outer $x")
        .success()
        .stdout("outer inner\n");
}

// ============================================
// Background jobs
// ============================================

#[test]
fn test_background_job_does_not_block() {
    let sandbox = Sandbox::new();
    let start = Instant::now();
    let status = Command::cargo_bin("flint")
        .expect("flint binary")
        .env("HOME", sandbox.home())
        .args(["-c", "sleep 2 &\necho started"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run flint");
    assert!(status.success());
    assert!(start.elapsed() < Duration::from_millis(1500));
}

#[test]
fn test_background_job_reports_completion() {
    flint("true &")
        .success()
        .stdout(predicate::str::contains("done"));
    flint("false &")
        .success()
        .stderr(predicate::str::contains("exit with status 1"));
}

// ============================================
// Statuses
// ============================================

#[test]
fn test_status_variable() {
    flint("false; println $?").success().stdout("1\n");
    flint("true; println $?").success().stdout("0\n");
}

#[test]
fn test_signal_status_is_128_plus_signal() {
    flint("sh -c 'kill -9 $$'; println $?")
        .success()
        .stdout("137\n");
}

#[test]
fn test_exec_failure_message() {
    flint("flint-no-such-command-xyz")
        .code(1)
        .stderr(predicate::str::contains(
            "'flint-no-such-command-xyz': No such file or directory",
        ));
}

#[test]
fn test_short_circuit_chains() {
    flint("false && echo no || echo yes").success().stdout("yes\n");
    flint("true || echo no").success().stdout("");
    flint("true && echo a && echo b").success().stdout("a\nb\n");
}

#[test]
fn test_exported_variable_reaches_children() {
    flint("export FLINT_T hello\nsh -c 'echo $FLINT_T'\nprintln $FLINT_T")
        .success()
        .stdout("hello\nhello\n");
}

#[test]
fn test_time_prints_elapsed_seconds() {
    flint("time true")
        .success()
        .stdout(predicate::str::is_match(r"^\d+\.\d{6}\n$").unwrap());
}

#[test]
fn test_command_bypasses_functions() {
    flint("fun echo\n println shadowed\nend\necho x\ncommand echo real")
        .success()
        .stdout("shadowed\nreal\n");
}

#[test]
fn test_trace_prints_expanded_commands() {
    let sandbox = Sandbox::new();
    sandbox
        .flint()
        .args(["--trace", "-c", "let x 1; echo $x"])
        .assert()
        .success()
        .stdout("1\n")
        .stderr(predicate::str::contains("+ echo 1"));
}
