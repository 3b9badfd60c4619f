use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{BufRead, Result as IoResult, Write};
use std::rc::Rc;

/// Source of raw input lines for the interpreter loop.
pub trait LineSource {
    /// Read the next line without its line terminator, or `None` at end of input.
    ///
    /// `prompt` is shown first by sources attached to a terminal and ignored by the rest.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal input through a line editor. No history is kept.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("cannot set up the terminal")?;
        Ok(Self { editor })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C at the prompt discards the line being typed.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("cannot read from the terminal"),
        }
    }
}

/// Line source over any buffered reader, used for batch files.
pub struct LineReader<R> {
    reader: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let n = self
            .reader
            .read_until(b'\n', &mut buf)
            .context("cannot read the next line")?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Memory-backed writer for capturing interpreter output.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_reader_strips_newline_only() {
        let mut source = LineReader::new(Cursor::new("ls -l\r\npwd\nlast"));
        assert_eq!(source.read_line("").unwrap().as_deref(), Some("ls -l\r"));
        assert_eq!(source.read_line("").unwrap().as_deref(), Some("pwd"));
        assert_eq!(source.read_line("").unwrap().as_deref(), Some("last"));
        assert_eq!(source.read_line("").unwrap(), None);
    }

    #[test]
    fn test_line_reader_keeps_empty_lines() {
        let mut source = LineReader::new(Cursor::new("\n\n"));
        assert_eq!(source.read_line("> ").unwrap().as_deref(), Some(""));
        assert_eq!(source.read_line("> ").unwrap().as_deref(), Some(""));
        assert_eq!(source.read_line("> ").unwrap(), None);
    }

    #[test]
    fn test_mem_writer_shares_buffer() {
        let (mut writer, handle) = MemWriter::with_handle();
        write!(writer, "hello").unwrap();
        assert_eq!(handle.borrow().as_slice(), b"hello");
    }
}
