use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in the interpreter process, never in a child: they change interpreter state
/// (the working directory) or end the interpreter.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Executes the command, printing to `stdout` and mutating `env`.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// The built-in operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Help,
    Quit,
    Cd,
    Pwd,
}

/// Command name, operation and help text, in the order `help` lists them.
const BUILTINS: &[(&str, BuiltinKind, &str)] = &[
    ("?", BuiltinKind::Help, "show the help menu"),
    ("help", BuiltinKind::Help, "show the help menu"),
    ("quit", BuiltinKind::Quit, "quit the command shell"),
    ("cd", BuiltinKind::Cd, "go to a directory"),
    ("pwd", BuiltinKind::Pwd, "print the working directory"),
];

impl BuiltinKind {
    /// The built-in registered under exactly `name`, if any.
    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(builtin, ..)| *builtin == name)
            .map(|(_, kind, _)| *kind)
    }

    /// Parse `args` for this built-in and run it.
    ///
    /// Failures of the command itself are reported on stderr and turned into status 1;
    /// the returned error is reserved for failing to write to `stdout`.
    pub fn run(
        self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match self {
            BuiltinKind::Help => invoke::<Help>(name, args, stdout, env),
            BuiltinKind::Quit => invoke::<Quit>(name, args, stdout, env),
            BuiltinKind::Cd => invoke::<Cd>(name, args, stdout, env),
            BuiltinKind::Pwd => invoke::<Pwd>(name, args, stdout, env),
        }
    }
}

fn invoke<T: BuiltinCommand>(
    name: &str,
    args: &[&str],
    stdout: &mut dyn Write,
    env: &mut Environment,
) -> Result<ExitCode> {
    let cmd = match T::from_args(&[name], args) {
        Ok(cmd) => cmd,
        Err(EarlyExit { output, status }) => {
            return match status {
                Ok(()) => {
                    writeln!(stdout, "{}", output.trim_end())?;
                    Ok(0)
                }
                Err(()) => {
                    eprintln!("{}", output.trim_end());
                    Ok(1)
                }
            };
        }
    };
    match cmd.execute(stdout, env) {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("{:#}", e);
            Ok(1)
        }
    }
}

#[derive(FromArgs)]
/// List the built-in commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        for (name, _, doc) in BUILTINS {
            writeln!(stdout, "{}: {}", name, doc)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Quit the command shell.
pub struct Quit {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Quit {
    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Err(anyhow::anyhow!("cd: no target and HOME not set")),
            },
        };

        let new_dir = if target.is_absolute() {
            target.clone()
        } else {
            env.current_dir.join(&target)
        };

        let canonical =
            fs::canonicalize(&new_dir).with_context(|| format!("cd: {}", target.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: {}", target.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}
