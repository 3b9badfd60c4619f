use crate::command::ExitCode;
use nix::errno::Errno;
use std::io;
use std::os::unix::io::RawFd;
use std::path::PathBuf;

/// Status a child exits with when its program cannot be found or started.
pub const NOT_FOUND_STATUS: ExitCode = 127;

/// Everything that can go wrong while turning one command string into a finished process.
///
/// Every variant is local to a single command: the interpreter reports it and moves on
/// to the next command. Only [`ShellError::BatchFile`] stops the whole program, and it is raised
/// before the loop starts.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A redirection marker without a usable file name after it.
    #[error("{command}: syntax error: {reason}")]
    Syntax { command: String, reason: String },

    /// A redirection target that could not be opened.
    #[error("{path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The opened file could not be installed as a standard descriptor.
    #[error("cannot redirect descriptor {fd}: {source}")]
    Descriptor {
        fd: RawFd,
        #[source]
        source: Errno,
    },

    /// The program could not be found or could not replace the child image.
    #[error("{name} : Command not found")]
    NotFound { name: String },

    /// A bare program name was given but there is no search path to look in.
    #[error("{name}: PATH is not set, cannot search for the program")]
    MissingPath { name: String },

    /// The operating system refused to create a new process.
    #[error("{command}: cannot create process: {source}")]
    Spawn {
        command: String,
        #[source]
        source: Errno,
    },

    #[error("cannot open batch file {}: {source}", .path.display())]
    BatchFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Status a child process exits with when it fails before reaching `exec`.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::NotFound { .. } | ShellError::MissingPath { .. } => NOT_FOUND_STATUS,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_program() {
        let err = ShellError::NotFound {
            name: "frobnicate".to_string(),
        };
        assert_eq!(err.to_string(), "frobnicate : Command not found");
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn test_file_error_names_target() {
        let err = ShellError::File {
            path: "in.txt".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("in.txt: "));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_batch_file_error_names_path() {
        let err = ShellError::BatchFile {
            path: PathBuf::from("/no/such/script"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(
            err.to_string()
                .starts_with("cannot open batch file /no/such/script: ")
        );
        assert_eq!(err.exit_code(), 1);
    }
}
