//! Input/output redirection for a single command.
//!
//! Redirection happens in two steps. [`take_redirections`] is pure: it checks every
//! marker and cuts the markers and their file names out of the argument vector.
//! [`apply`] then opens the files and installs them as standard input/output. A
//! malformed command is therefore rejected before any file is touched.

use crate::command::ArgumentVector;
use crate::error::ShellError;
use crate::lexer::{self, Marker};
use nix::unistd;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};

/// Permission bits for files created by `>`: rw-r--r--.
const OUTPUT_MODE: u32 = 0o644;

/// One `<` or `>` taken out of an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub direction: Marker,
    pub target: String,
}

impl Redirection {
    /// Standard descriptor this redirection replaces.
    pub fn descriptor(&self) -> RawFd {
        match self.direction {
            Marker::Input => libc::STDIN_FILENO,
            Marker::Output => libc::STDOUT_FILENO,
        }
    }
}

/// Validate and strip every redirection in `argv`.
///
/// Every marker is checked against its neighbour in the vector as given, before
/// anything is removed. Input markers are then taken before output markers; within
/// one kind they are kept in order of appearance, so when a kind repeats the last
/// one ends up installed. `command` is only used to name the command in a syntax
/// error.
pub fn take_redirections(
    command: &str,
    argv: &mut ArgumentVector,
) -> Result<Vec<Redirection>, ShellError> {
    for (index, token) in argv.iter().enumerate() {
        if let Some(direction) = Marker::parse(token) {
            operand(command, argv, index, direction)?;
        }
    }

    let mut redirections = Vec::new();
    for direction in [Marker::Input, Marker::Output] {
        while let Some(index) = lexer::find_marker(argv, direction) {
            let target = operand(command, argv, index, direction)?;
            redirections.push(Redirection { direction, target });
            argv.remove_range(index..index + 2);
        }
    }
    Ok(redirections)
}

fn operand(
    command: &str,
    argv: &ArgumentVector,
    index: usize,
    direction: Marker,
) -> Result<String, ShellError> {
    let syntax = |reason: String| ShellError::Syntax {
        command: command.to_owned(),
        reason,
    };
    match argv.get(index + 1) {
        None => Err(syntax(format!(
            "missing file name after `{}`",
            direction.as_str()
        ))),
        Some(next) if Marker::parse(next).is_some() => Err(syntax(format!(
            "unexpected `{}` after `{}`",
            next,
            direction.as_str()
        ))),
        Some(next) => Ok(next.to_owned()),
    }
}

/// The program a command would run once its redirections are stripped.
///
/// Skips leading marker/operand pairs, so `> out pwd` names `pwd`.
pub fn program_name(argv: &ArgumentVector) -> Option<&str> {
    let mut index = 0;
    while let Some(token) = argv.get(index) {
        if Marker::parse(token).is_none() {
            return Some(token);
        }
        index += 2;
    }
    None
}

/// Open the file behind a redirection.
///
/// Input files must already exist. Output files are created if needed and
/// truncated. Files are opened close-on-exec.
pub fn open(redirection: &Redirection) -> Result<File, ShellError> {
    let mut options = OpenOptions::new();
    match redirection.direction {
        Marker::Input => options.read(true),
        Marker::Output => options
            .write(true)
            .create(true)
            .truncate(true)
            .mode(OUTPUT_MODE),
    };
    options
        .open(&redirection.target)
        .map_err(|source| ShellError::File {
            path: redirection.target.clone(),
            source,
        })
}

/// Install every redirection on this process's standard descriptors.
///
/// Meant for a freshly forked child. Each opened file is closed again right after
/// it has been duplicated, on the error path as well.
pub fn apply(redirections: &[Redirection]) -> Result<(), ShellError> {
    for redirection in redirections {
        let file = open(redirection)?;
        let fd = redirection.descriptor();
        unistd::dup2(file.as_raw_fd(), fd)
            .map_err(|source| ShellError::Descriptor { fd, source })?;
        log::trace!("{} bound to descriptor {}", redirection.target, fd);
    }
    Ok(())
}
