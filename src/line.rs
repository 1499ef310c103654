use std::io::BufRead;

use crate::error::Result;

/// Reads commands one line at a time.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
        }
    }

    /// Next line without its trailing newline, or `None` at end of input.
    ///
    /// A last line that has no newline is still returned. Only a single
    /// `\n` is stripped; a `\r` before it is kept.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }

        if self.buf.ends_with('\n') {
            self.buf.pop();
        }

        Ok(Some(self.buf.clone()))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
