//! Pipe-capacity and interleaving tests for the process runner.
//!
//! These spawn real processes through `sh` and are Unix-only.

#![cfg(unix)]

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use stubgen_exec::{Fault, FaultKind, ProcessRunner, RunnerConfig};

/// Well above the default pipe capacity on Linux (64 KiB) and macOS (16 KiB).
const LARGE_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

fn runner_with_deadline() -> ProcessRunner {
    ProcessRunner::with_config(RunnerConfig::default().timeout_secs(60))
}

#[test]
fn large_stdout_is_captured_without_deadlock() {
    let script = format!("head -c {} /dev/zero", LARGE_OUTPUT_BYTES);
    let start = Instant::now();
    let result = runner_with_deadline().run("sh", &["-c", &script]).unwrap();

    assert!(start.elapsed() < Duration::from_secs(60));
    assert_eq!(result.exit_status(), 0);
    assert_eq!(result.stdout().len(), LARGE_OUTPUT_BYTES);
    assert!(result.stdout().iter().all(|b| *b == 0));
    assert!(result.stderr().is_empty());
}

#[test]
fn large_stdout_without_deadline_completes() {
    let script = format!("head -c {} /dev/zero", LARGE_OUTPUT_BYTES);
    let result = ProcessRunner::new().run("sh", &["-c", &script]).unwrap();
    assert_eq!(result.stdout().len(), LARGE_OUTPUT_BYTES);
}

#[test]
fn large_stderr_written_before_stdout_is_captured() {
    // The child blocks on stderr first; a runner that only drained stdout
    // would hang here.
    let script = format!(
        "head -c {n} /dev/zero 1>&2; head -c {n} /dev/zero",
        n = LARGE_OUTPUT_BYTES
    );
    let result = runner_with_deadline().run("sh", &["-c", &script]).unwrap();

    assert_eq!(result.stderr().len(), LARGE_OUTPUT_BYTES);
    assert_eq!(result.stdout().len(), LARGE_OUTPUT_BYTES);
}

#[test]
fn interleaved_writes_to_both_streams_are_fully_captured() {
    let script = "i=0; while [ $i -lt 2000 ]; do echo \"out $i\"; echo \"err $i\" 1>&2; i=$((i+1)); done";
    let result = runner_with_deadline().run("sh", &["-c", script]).unwrap();

    let expected_out: String = (0..2000).map(|i| format!("out {}\n", i)).collect();
    let expected_err: String = (0..2000).map(|i| format!("err {}\n", i)).collect();
    assert_eq!(result.stdout_lossy(), expected_out);
    assert_eq!(result.stderr_lossy(), expected_err);
}

#[test]
fn failing_command_keeps_both_buffers() {
    let script = "echo 'compiling'; echo 'Foo.java:1: error: boom' 1>&2; exit 1";
    let result = runner_with_deadline().run("sh", &["-c", script]).unwrap();

    assert_eq!(result.exit_status(), 1);
    assert_eq!(result.stdout(), b"compiling\n");
    assert_eq!(result.stderr(), b"Foo.java:1: error: boom\n");
}

#[test]
fn repeated_runs_are_independent() {
    let runner = ProcessRunner::new();
    for i in 0..25 {
        let result = runner.run("sh", &["-c", &format!("echo {}", i)]).unwrap();
        assert_eq!(result.stdout_lossy(), format!("{}\n", i));
    }
}

#[test]
fn binary_output_is_preserved() {
    let result = ProcessRunner::new()
        .run("printf", &["\\000\\377\\001"])
        .unwrap();
    assert_eq!(result.stdout(), &[0u8, 0xff, 0x01]);
}

#[test]
fn deadline_kills_descendants_of_a_shell_script() {
    // The outer shell waits on a nested shell instead of exec'ing, so only a
    // group kill reaches the process that would write the file.
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let script = format!(
        "(sh -c 'sleep 1; touch \"{}\"'); exit 0",
        marker.display()
    );

    let runner = ProcessRunner::with_config(
        RunnerConfig::default().timeout(Duration::from_millis(200)),
    );
    let err = runner.run("sh", &["-c", &script]).unwrap_err();
    assert_eq!(err.kind(), FaultKind::Timeout);

    std::thread::sleep(Duration::from_millis(1500));
    assert!(!marker.exists(), "descendant survived the deadline");
}

#[test]
fn deadline_bounds_output_held_open_by_background_job() {
    let runner = ProcessRunner::with_config(
        RunnerConfig::default().timeout(Duration::from_millis(300)),
    );
    let start = Instant::now();
    let err = runner.run("sh", &["-c", "sleep 4 & echo hi"]).unwrap_err();

    assert_eq!(err.kind(), FaultKind::Timeout);
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
}
