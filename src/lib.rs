//! A small line-oriented command interpreter.
//!
//! Lines come from a terminal or a batch file. Each line is split on `;` into
//! commands that run one after another: a handful of built-ins (`?`/`help`, `quit`,
//! `cd`, `pwd`) run inside the interpreter, everything else is forked, has its
//! `<` / `>` redirections applied, is looked up on `PATH` and exec'd, and is waited
//! for before the next command starts.
//!
//! The main entry point is [`Interpreter`]. The building blocks are public so they
//! can be used and tested on their own: [`lexer`] splits input, [`external`] resolves
//! program names, [`redirect`] rewires descriptors, [`signals`] switches signal
//! dispositions and [`launcher`] runs a single command.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
mod io_adapters;
pub mod launcher;
pub mod lexer;
pub mod redirect;
pub mod signals;

pub use builtin::BuiltinKind;
pub use env::{Environment, Mode};
pub use error::ShellError;
pub use interpreter::Interpreter;
pub use io_adapters::{LineReader, LineSource, MemWriter, Terminal};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serialises tests that read or change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
