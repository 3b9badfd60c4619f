//! Splitting raw input lines into commands and commands into argument vectors.
//!
//! The grammar is deliberately flat: `;` separates commands, runs of blanks separate
//! arguments, and `<` / `>` are recognised only as stand-alone tokens. There is no
//! quoting and no expansion.

use crate::command::{ArgumentVector, CommandList};
use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Separator between independent commands on one line.
pub const COMMAND_SEPARATOR: char = ';';

/// A redirection marker token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `<`: standard input comes from a file.
    Input,
    /// `>`: standard output goes to a file.
    Output,
}

impl Marker {
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Input => "<",
            Marker::Output => ">",
        }
    }

    /// Recognise a token that is exactly one marker character.
    pub fn parse(token: &str) -> Option<Marker> {
        match token {
            "<" => Some(Marker::Input),
            ">" => Some(Marker::Output),
            _ => None,
        }
    }
}

/// Blank or control: everything up to and including ASCII space.
fn is_blank(c: char) -> bool {
    c <= ' '
}

/// Strip leading and trailing blank/control characters.
///
/// A string made only of blanks becomes empty.
pub fn trim(s: &str) -> &str {
    s.trim_matches(is_blank)
}

/// Split a raw line on `;` into trimmed, non-empty commands.
pub fn split_into_commands(line: &str) -> CommandList {
    let mut commands = CommandList::default();
    for piece in line.split(COMMAND_SEPARATOR) {
        let piece = trim(piece);
        if !piece.is_empty() {
            commands.push(piece);
        }
    }
    commands
}

/// Split one command into its argument vector.
///
/// A trailing carriage return left over from CRLF batch files is dropped first.
pub fn split_into_params(command: &str) -> ArgumentVector {
    let command = command.strip_suffix('\r').unwrap_or(command);
    ArgumentVector::new(
        command
            .split(is_blank)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

/// Index of the first token that is exactly `marker`, or `None`.
///
/// `Some(0)` is a real hit: the marker is the first token.
pub fn find_marker(argv: &ArgumentVector, marker: Marker) -> Option<usize> {
    argv.iter().position(|token| token == marker.as_str())
}

/// Split a `PATH`-style value into directories, dropping empty entries.
pub fn split_search_path(value: &OsStr) -> Vec<PathBuf> {
    env::split_paths(value)
        .map(|dir| match dir.to_str() {
            Some(s) => PathBuf::from(trim(s)),
            None => dir,
        })
        .filter(|dir| !dir.as_os_str().is_empty())
        .collect()
}
