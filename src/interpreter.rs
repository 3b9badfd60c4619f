use crate::command::ExitCode;
use crate::env::{Environment, Mode};
use crate::error::ShellError;
use crate::io_adapters::LineSource;
use crate::{launcher, lexer};
use anyhow::Result;
use std::io::{self, Write};

/// A line-oriented command interpreter.
///
/// Each line read from a [`LineSource`] is split into `;`-separated commands which
/// run strictly one after another; every command is waited for before the next one
/// starts, and all children are reaped before the next line is read.
///
/// Example
/// ```no_run
/// use shell_runner::{Interpreter, LineReader, Mode};
/// let mut sh = Interpreter::new(Mode::Batch);
/// let mut script = LineReader::new("pwd ; ls -l > listing.txt\n".as_bytes());
/// sh.run(&mut script).unwrap();
/// ```
pub struct Interpreter {
    env: Environment,
    stdout: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter writing prompts, echoes and built-in output to stdout.
    pub fn new(mode: Mode) -> Self {
        Self::with_output(mode, Box::new(io::stdout()))
    }

    /// Create an interpreter writing its own output to `stdout`.
    ///
    /// External programs still inherit the process's standard descriptors.
    pub fn with_output(mode: Mode, stdout: Box<dyn Write>) -> Self {
        Self {
            env: Environment::new(mode),
            stdout,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run one command string (no `;` splitting) and return its exit status.
    pub fn execute(&mut self, command: &str) -> Result<ExitCode, ShellError> {
        launcher::launch(command, &mut self.env, &mut *self.stdout)
    }

    /// Run every command on `line` in order, then reap any remaining children.
    ///
    /// Per-command failures are reported on stderr and do not stop the line. `quit`
    /// does.
    pub fn execute_line(&mut self, line: &str) -> Result<()> {
        let commands = lexer::split_into_commands(line);
        for command in commands.iter() {
            if self.env.mode == Mode::Batch {
                writeln!(self.stdout, "{}", command)?;
            }
            match self.execute(command) {
                Ok(status) => log::debug!("`{}` exited with {}", command, status),
                Err(e) => eprintln!("{}", e),
            }
            if self.env.should_exit {
                break;
            }
        }
        launcher::drain_children();
        Ok(())
    }

    /// Read and execute lines until end of input or `quit`.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<()> {
        while !self.env.should_exit {
            let prompt = if self.env.is_interactive() {
                self.env.prompt()
            } else {
                String::new()
            };
            let Some(line) = source.read_line(&prompt)? else {
                if self.env.is_interactive() {
                    writeln!(self.stdout)?;
                }
                break;
            };
            self.execute_line(&line)?;
        }
        self.stdout.flush()?;
        Ok(())
    }
}
