//! End-to-end tests that fork and exec real programs.
//!
//! The launcher reaps any child of the process, so these tests must not overlap.

use shell_runner::error::NOT_FOUND_STATUS;
use shell_runner::{Interpreter, MemWriter, Mode, signals};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

fn serial() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn batch_interpreter() -> (Interpreter, std::rc::Rc<std::cell::RefCell<Vec<u8>>>) {
    let (writer, handle) = MemWriter::with_handle();
    (Interpreter::with_output(Mode::Batch, Box::new(writer)), handle)
}

#[test]
fn test_output_redirection_to_new_file() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let (mut sh, _) = batch_interpreter();

    let status = sh
        .execute(&format!("echo hello   world > {}", out.display()))
        .unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
}

#[test]
fn test_input_and_output_redirection() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let out = dir.path().join("out.txt");
    fs::write(&input, "first\nsecond\n").unwrap();
    fs::write(&out, "stale contents that must disappear\n").unwrap();
    let (mut sh, _) = batch_interpreter();

    let status = sh
        .execute(&format!("cat < {} > {}", input.display(), out.display()))
        .unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&out).unwrap(), "first\nsecond\n");
}

#[test]
fn test_redirection_marker_as_first_token() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let out = dir.path().join("out.txt");
    fs::write(&input, "payload\n").unwrap();
    let (mut sh, _) = batch_interpreter();

    let status = sh
        .execute(&format!("< {} cat > {}", input.display(), out.display()))
        .unwrap();
    assert_eq!(status, 0);
    assert_eq!(fs::read_to_string(&out).unwrap(), "payload\n");
}

#[test]
fn test_missing_input_aborts_before_program_runs() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let out = dir.path().join("out.txt");
    let (mut sh, _) = batch_interpreter();

    let status = sh
        .execute(&format!("echo ran < {} > {}", missing.display(), out.display()))
        .unwrap();
    assert_eq!(status, 1);
    assert!(!out.exists());
}

#[test]
fn test_unknown_program_reports_not_found_status() {
    let _lock = serial();
    let (mut sh, _) = batch_interpreter();
    let status = sh.execute("no-such-program-for-launch-tests").unwrap();
    assert_eq!(status, NOT_FOUND_STATUS);
}

#[test]
fn test_path_with_separator_is_not_searched() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("not-executable");
    fs::write(&plain, "echo nope\n").unwrap();
    fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).unwrap();
    let (mut sh, _) = batch_interpreter();

    let status = sh.execute(&plain.display().to_string()).unwrap();
    assert_eq!(status, NOT_FOUND_STATUS);

    let status = sh
        .execute(&dir.path().join("absent").display().to_string())
        .unwrap();
    assert_eq!(status, NOT_FOUND_STATUS);
}

#[test]
fn test_exit_status_is_propagated() {
    let _lock = serial();
    let (mut sh, _) = batch_interpreter();
    assert_eq!(sh.execute("true").unwrap(), 0);
    assert_eq!(sh.execute("false").unwrap(), 1);
}

#[test]
fn test_commands_on_a_line_run_in_order() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let (mut sh, handle) = batch_interpreter();

    let first = format!("echo one > {}", a.display());
    let second = format!("cat {} > {}", a.display(), b.display());
    sh.execute_line(&format!("{} ;{}\r", first, second)).unwrap();

    assert_eq!(fs::read_to_string(&b).unwrap(), "one\n");
    let echoed = String::from_utf8(handle.borrow().clone()).unwrap();
    assert_eq!(echoed, format!("{}\n{}\n", first, second));
}

#[test]
fn test_failed_command_does_not_stop_the_line() {
    let _lock = serial();
    let dir = tempfile::tempdir().unwrap();
    let after = dir.path().join("after.txt");
    let (mut sh, _) = batch_interpreter();

    sh.execute_line(&format!(
        "no-such-program-for-launch-tests ; cat < ; echo after > {}",
        after.display()
    ))
    .unwrap();
    assert_eq!(fs::read_to_string(&after).unwrap(), "after\n");
    assert!(!sh.env().should_exit);
}

#[test]
#[cfg(target_os = "linux")]
fn test_child_gets_default_signal_dispositions() {
    let _lock = serial();
    if !Path::new("/proc/self/status").exists() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("status.txt");
    let (mut sh, _) = batch_interpreter();

    signals::ignore_job_control_signals().unwrap();
    let status = sh
        .execute(&format!("grep SigIgn /proc/self/status > {}", out.display()))
        .unwrap();
    signals::restore_default_signal_dispositions().unwrap();
    assert_eq!(status, 0);

    let line = fs::read_to_string(&out).unwrap();
    let mask = line.trim().trim_start_matches("SigIgn:").trim();
    let mask = u64::from_str_radix(mask, 16).unwrap();
    for signo in [2u32, 3, 20, 21, 22] {
        assert_eq!(mask & (1 << (signo - 1)), 0, "signal {} still ignored", signo);
    }
}
