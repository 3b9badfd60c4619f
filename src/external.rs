use crate::error::ShellError;
use crate::lexer;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a program name the way the interpreter launches it.
///
/// Behavior:
/// - Name containing a `/` (absolute or relative): returned unresolved. Whether it
///   exists is left to `exec`.
/// - Bare name: looked up in the directories of `search_path` (a `PATH` value).
/// - Bare name without a search path: [`ShellError::MissingPath`].
/// - Bare name not present in any directory: [`ShellError::NotFound`].
pub fn find_command_path<'a>(
    search_path: Option<&OsStr>,
    name: &'a str,
) -> Result<Cow<'a, Path>, ShellError> {
    if name.contains('/') {
        return Ok(Cow::Borrowed(Path::new(name)));
    }
    let search_path = search_path.ok_or_else(|| ShellError::MissingPath {
        name: name.to_owned(),
    })?;
    let dirs = lexer::split_search_path(search_path);
    resolve(OsStr::new(name), &dirs)
        .map(Cow::Owned)
        .ok_or_else(|| ShellError::NotFound {
            name: name.to_owned(),
        })
}

/// Find `name` among the entries of `dirs`, first directory first.
///
/// Directories that cannot be read are skipped silently. Only exact file name
/// matches count.
pub fn resolve(name: &OsStr, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().find_map(|dir| find_in_dir(dir, name))
}

fn find_in_dir(dir: &Path, name: &OsStr) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::trace!("skipping search directory {}: {}", dir.display(), e);
            return None;
        }
    };
    entries
        .filter_map(Result::ok)
        .find(|entry| entry.file_name().as_os_str() == name)
        .map(|_| dir.join(name))
}
