//! Running one command: built-ins in place, everything else in a forked child.
//!
//! ```text
//! DISPATCH ─┬─ built-in ─────────────────────────────────────────────► status
//!           └─ external ── fork ─┬─ child:  signals → redirect → resolve → exec
//!                                └─ parent: wait ────────────────────► status
//! ```

use crate::builtin::BuiltinKind;
use crate::command::{ArgumentVector, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer::{self, Marker};
use crate::{external, redirect, signals};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use std::convert::Infallible;
use std::ffi::{CString, OsStr, OsString};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

/// Run one command string to completion and return its exit status.
///
/// `stdout` is where built-ins print unless they are redirected. External programs
/// write to the process's real standard output, so `stdout` is flushed before
/// forking.
pub fn launch(
    command: &str,
    env: &mut Environment,
    stdout: &mut dyn Write,
) -> Result<ExitCode, ShellError> {
    let argv = lexer::split_into_params(command);
    if argv.is_empty() {
        return Ok(0);
    }

    if let Some(kind) = redirect::program_name(&argv).and_then(BuiltinKind::lookup) {
        log::debug!("running built-in {:?} for `{}`", kind, command);
        return run_builtin(kind, command, argv, env, stdout);
    }

    stdout.flush()?;
    io::stdout().flush()?;
    let search_path = env.get_var("PATH");

    // SAFETY: the interpreter is single-threaded, and the child only sets up
    // descriptors and signals before it either execs or calls `_exit`.
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => run_child(command, argv, search_path),
        Ok(ForkResult::Parent { child }) => {
            log::debug!("`{}` started as pid {}", command, child);
            let status = wait_for(child)?;
            log::debug!("pid {} finished with status {}", child, status);
            Ok(status)
        }
        Err(source) => {
            log::warn!("fork failed for `{}`: {}", command, source);
            Err(ShellError::Spawn {
                command: command.to_owned(),
                source,
            })
        }
    }
}

/// Built-ins share the redirection syntax but never touch the interpreter's own
/// descriptors: an output target becomes the writer the built-in prints to.
fn run_builtin(
    kind: BuiltinKind,
    command: &str,
    mut argv: ArgumentVector,
    env: &mut Environment,
    stdout: &mut dyn Write,
) -> Result<ExitCode, ShellError> {
    let redirections = redirect::take_redirections(command, &mut argv)?;
    let mut output = None;
    for redirection in &redirections {
        let file = redirect::open(redirection)?;
        if redirection.direction == Marker::Output {
            output = Some(file);
        }
    }

    let name = argv.program().unwrap_or_default();
    let params = argv.params();
    let result = match output.as_mut() {
        Some(file) => kind.run(name, &params, file, env),
        None => kind.run(name, &params, stdout, env),
    };
    match result {
        Ok(status) => Ok(status),
        Err(e) => {
            eprintln!("{}: {:#}", name, e);
            Ok(1)
        }
    }
}

fn run_child(command: &str, mut argv: ArgumentVector, search_path: Option<OsString>) -> ! {
    let status = match exec_child(command, &mut argv, search_path.as_deref()) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    };
    // SAFETY: `_exit` ends the child without running the parent's exit handlers or
    // flushing stdio buffers copied from it.
    unsafe { libc::_exit(status) }
}

/// Child side of a launch. Only returns if the program could not be started, or if
/// nothing is left to run once the redirections are stripped.
fn exec_child(
    command: &str,
    argv: &mut ArgumentVector,
    search_path: Option<&OsStr>,
) -> Result<ExitCode, ShellError> {
    if let Err(e) = signals::restore_default_signal_dispositions() {
        log::warn!("cannot restore signal dispositions: {}", e);
    }

    let redirections = redirect::take_redirections(command, argv)?;
    redirect::apply(&redirections)?;

    let Some(name) = argv.program() else {
        return Ok(0);
    };
    let not_found = || ShellError::NotFound {
        name: name.to_owned(),
    };
    let path = external::find_command_path(search_path, name)?;
    log::debug!("{} resolved to {}", name, path.display());

    let path = CString::new(path.as_os_str().as_bytes()).map_err(|_| not_found())?;
    let args = argv.to_exec_args()?;
    let result: Result<Infallible, Errno> = unistd::execv(&path, args.as_slice());
    match result {
        Ok(never) => match never {},
        Err(errno) => {
            log::debug!("execv {:?} failed: {}", path, errno);
            Err(not_found())
        }
    }
}

/// Block until `child` terminates.
///
/// There is no job control: a child stopped from the terminal is continued and
/// waited on again.
fn wait_for(child: Pid) -> Result<ExitCode, ShellError> {
    loop {
        match wait::waitpid(child, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(128 + sig as i32),
            Ok(WaitStatus::Stopped(pid, sig)) => {
                log::warn!("pid {} stopped by {}, resuming it", pid, sig);
                if let Err(e) = signal::kill(pid, Signal::SIGCONT) {
                    log::warn!("cannot resume pid {}: {}", pid, e);
                }
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(errno) => {
                log::warn!("waitpid({}) failed: {}", child, errno);
                return Err(ShellError::Io(io::Error::from(errno)));
            }
        }
    }
}

/// Reap every child that is still outstanding, returning once none are left.
pub fn drain_children() {
    loop {
        match wait::waitpid(Pid::from_raw(-1), None) {
            Ok(status) => log::debug!("reaped {:?}", status),
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => break,
            Err(errno) => {
                log::warn!("waiting for children failed: {}", errno);
                break;
            }
        }
    }
}
