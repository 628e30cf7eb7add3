//! CLI smoke tests (SPEC_FULL.md §8 scenario 7): drive the compiled binary
//! end-to-end over stdin and over `--input <file>`, and check `--quiet`
//! suppresses the trace without touching the summary.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

const FIXTURE: &str = "1 1 5\nA 0 0 1 DOOP 3 HALT\n";

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_procsim"))
}

fn run_over_stdin(input: &str, extra_args: &[&str]) -> std::process::Output {
    let mut child = bin()
        .args(extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn procsim");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("wait for procsim")
}

#[test]
fn stdin_and_input_file_produce_byte_identical_output() {
    let stdin_out = run_over_stdin(FIXTURE, &[]);
    assert!(stdin_out.status.success());

    let mut file = NamedTempFile::new().expect("create fixture file");
    file.write_all(FIXTURE.as_bytes()).unwrap();
    let file_out = bin()
        .arg(file.path())
        .output()
        .expect("run procsim --input");
    assert!(file_out.status.success());

    assert_eq!(stdin_out.stdout, file_out.stdout);
}

#[test]
fn output_contains_trace_then_summary() {
    let out = run_over_stdin(FIXTURE, &[]);
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "[01] 00000: process 1 new",
            "[01] 00000: process 1 ready",
            "[01] 00000: process 1 running",
            "[01] 00003: process 1 finished",
            "| 00003 | Proc 01.01 | Run 3, Block 0, Wait 0, Sends 0, Recvs 0",
        ]
    );
}

#[test]
fn quiet_flag_suppresses_trace_but_keeps_summary() {
    let out = run_over_stdin(FIXTURE, &["--quiet"]);
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["| 00003 | Proc 01.01 | Run 3, Block 0, Wait 0, Sends 0, Recvs 0"]
    );
}

#[test]
fn malformed_header_exits_zero_with_no_output() {
    let out = run_over_stdin("not a header", &[]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn verbose_flag_writes_to_stderr_not_stdout() {
    let quiet_out = run_over_stdin(FIXTURE, &[]);
    let verbose_out = run_over_stdin(FIXTURE, &["-v"]);
    assert_eq!(quiet_out.stdout, verbose_out.stdout);
    assert!(!verbose_out.stderr.is_empty());
}
