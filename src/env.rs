use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Where commands come from, which decides prompt and echo behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Commands typed at a terminal: prompt before each read, newline on end of input.
    Interactive,
    /// Commands read from a file: no prompt, each command echoed before it runs.
    Batch,
}

/// Mutable view of the interpreter state passed to the loop, the launcher and the
/// built-ins.
///
/// The environment contains:
/// - `mode`: interactive or batch, fixed for the lifetime of the interpreter.
/// - `current_dir`: the working directory, kept in sync with the process by `cd`.
/// - `should_exit`: set by `quit` so the loop stops after the current command.
#[derive(Debug, Clone)]
pub struct Environment {
    pub mode: Mode,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new(mode: Mode) -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            mode,
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of a process environment variable, if it is set.
    pub fn get_var(&self, key: &str) -> Option<OsString> {
        stdenv::var_os(key)
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == Mode::Interactive
    }

    /// Prompt shown before each interactive read.
    pub fn prompt(&self) -> String {
        format!("{}$ ", self.current_dir.display())
    }
}
