use crate::error::ShellError;
use std::ffi::CString;
use std::ops::Range;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// The commands found on one input line, in the order they appear.
///
/// Entries are owned copies of the trimmed pieces between `;` separators and are
/// never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    commands: Vec<String>,
}

impl CommandList {
    pub(crate) fn push(&mut self, command: &str) {
        debug_assert!(!command.is_empty());
        self.commands.push(command.to_owned());
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }
}

/// Arguments of a single command; element 0 is the program name.
///
/// The vector is mutable so redirection tokens can be cut out before the program
/// runs. The null-terminated form expected by `exec` is built on demand by
/// [`ArgumentVector::to_exec_args`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    args: Vec<String>,
}

impl ArgumentVector {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Program name, if the vector has any tokens at all.
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Everything after the program name.
    pub fn params(&self) -> Vec<&str> {
        self.args.iter().skip(1).map(String::as_str).collect()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    /// Cut `range` out of the vector, closing the gap. The range is clamped to the
    /// current length.
    pub fn remove_range(&mut self, range: Range<usize>) {
        let end = range.end.min(self.args.len());
        let start = range.start.min(end);
        self.args.drain(start..end);
    }

    /// Convert into C strings for `execv`; the terminating null pointer is appended by
    /// the exec wrapper.
    pub fn to_exec_args(&self) -> Result<Vec<CString>, ShellError> {
        self.args
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes()).map_err(|_| ShellError::NotFound {
                    name: self.program().unwrap_or_default().to_owned(),
                })
            })
            .collect()
    }
}

impl From<Vec<&str>> for ArgumentVector {
    fn from(args: Vec<&str>) -> Self {
        Self::new(args.into_iter().map(str::to_owned).collect())
    }
}
