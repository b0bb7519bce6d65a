//! Token sources
//!
//! The scanner never reads `std::env::args()` directly. It pulls string
//! tokens from a [`TokenSource`], which lets the same declaration table be
//! applied to a command line, a single delimited string, or a line-oriented
//! options file:
//!
//! - [`ArgvSource`] — an in-memory vector of tokens (rewindable)
//! - [`StrTokSource`] — one string split on a delimiter set (rewindable)
//! - [`StreamSource`] — whitespace-separated tokens read line by line from a
//!   reader, skipping comment lines (forward-only)

use std::io::{self, BufRead};

/// Default delimiter set for [`StrTokSource`]: ASCII whitespace.
pub const DEFAULT_DELIMITERS: &str = " \t\n\r\x0b\x0c";

/// Default comment marker for [`StreamSource`].
pub const DEFAULT_COMMENT: char = '#';

/// A sequence of string tokens consumed by the option scanner.
pub trait TokenSource {
    /// Peek at the current token without consuming it.
    fn current(&mut self) -> Option<&str>;

    /// Consume the current token. Does nothing at end of input.
    fn advance(&mut self);

    /// Return the current token and consume it.
    fn next(&mut self) -> Option<String> {
        let token = self.current().map(str::to_owned);
        self.advance();
        token
    }
}

/// A token source that can restart from its first token.
pub trait Rewind: TokenSource {
    fn rewind(&mut self);
}

/// Tokens held in memory, typically a program's argument vector
/// (without the program name).
#[derive(Debug, Clone, Default)]
pub struct ArgvSource {
    args: Vec<String>,
    index: usize,
}

impl ArgvSource {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            index: 0,
        }
    }

    /// Index of the current token
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tokens not consumed yet
    pub fn remaining(&self) -> &[String] {
        &self.args[self.index..]
    }
}

impl TokenSource for ArgvSource {
    fn current(&mut self) -> Option<&str> {
        self.args.get(self.index).map(String::as_str)
    }

    fn advance(&mut self) {
        if self.index < self.args.len() {
            self.index += 1;
        }
    }
}

impl Rewind for ArgvSource {
    fn rewind(&mut self) {
        self.index = 0;
    }
}

/// Tokens produced by splitting one string on a set of delimiter characters.
///
/// Runs of delimiters are collapsed and leading/trailing delimiters are
/// ignored. Changing the delimiter set only affects tokens found after the
/// current one.
#[derive(Debug, Clone)]
pub struct StrTokSource {
    text: String,
    delims: String,
    /// Byte range of the current token
    cur: Option<(usize, usize)>,
}

impl StrTokSource {
    /// Split `text` on ASCII whitespace.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_delimiters(text, DEFAULT_DELIMITERS)
    }

    pub fn with_delimiters(text: impl Into<String>, delimiters: impl Into<String>) -> Self {
        let mut src = Self {
            text: text.into(),
            delims: delimiters.into(),
            cur: None,
        };
        src.cur = src.scan_from(0);
        src
    }

    pub fn delimiters(&self) -> &str {
        &self.delims
    }

    /// Replace the delimiter set; `None` restores [`DEFAULT_DELIMITERS`].
    pub fn set_delimiters(&mut self, delimiters: Option<&str>) {
        self.delims = delimiters.unwrap_or(DEFAULT_DELIMITERS).to_string();
    }

    /// The current token, without requiring mutable access.
    pub fn token(&self) -> Option<&str> {
        self.cur.map(|(start, end)| &self.text[start..end])
    }

    fn is_delim(&self, c: char) -> bool {
        self.delims.contains(c)
    }

    fn scan_from(&self, from: usize) -> Option<(usize, usize)> {
        let rest = &self.text[from..];
        let start = from + rest.find(|c: char| !self.is_delim(c))?;
        let end = self.text[start..]
            .find(|c: char| self.is_delim(c))
            .map_or(self.text.len(), |i| start + i);
        Some((start, end))
    }
}

impl TokenSource for StrTokSource {
    fn current(&mut self) -> Option<&str> {
        self.token()
    }

    fn advance(&mut self) {
        if let Some((_, end)) = self.cur {
            self.cur = self.scan_from(end);
        }
    }
}

impl Rewind for StrTokSource {
    fn rewind(&mut self) {
        self.cur = self.scan_from(0);
    }
}

/// Whitespace-separated tokens read line by line from a reader.
///
/// Blank lines and lines whose first non-whitespace character is the comment
/// marker are skipped. Lines are read lazily: a new line is only pulled when
/// the tokens of the previous one are used up. A read error ends the input;
/// the error is kept for [`StreamSource::take_error`].
pub struct StreamSource<R> {
    reader: R,
    line: Option<StrTokSource>,
    comment: char,
    eof: bool,
    error: Option<io::Error>,
}

impl<R: BufRead> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: None,
            comment: DEFAULT_COMMENT,
            eof: false,
            error: None,
        }
    }

    /// Use a different comment marker
    pub fn with_comment(mut self, comment: char) -> Self {
        self.comment = comment;
        self
    }

    pub fn comment(&self) -> char {
        self.comment
    }

    /// The I/O error that ended the input, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn has_token(&self) -> bool {
        self.line.as_ref().is_some_and(|l| l.token().is_some())
    }

    /// Read lines until one carries tokens or the reader is exhausted.
    fn fill(&mut self) {
        while !self.eof {
            let mut buf = String::new();
            match self.reader.read_line(&mut buf) {
                Ok(0) => self.eof = true,
                Ok(_) => {
                    let text = buf.trim();
                    if text.is_empty() || text.starts_with(self.comment) {
                        tracing::trace!(line = %text, "skipping blank or comment line");
                        continue;
                    }
                    self.line = Some(StrTokSource::new(text));
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token stream read failed");
                    self.error = Some(e);
                    self.eof = true;
                }
            }
        }
    }
}

impl<R: BufRead> TokenSource for StreamSource<R> {
    fn current(&mut self) -> Option<&str> {
        if !self.has_token() {
            self.fill();
        }
        self.line.as_ref()?.token()
    }

    fn advance(&mut self) {
        if self.current().is_some() {
            if let Some(line) = self.line.as_mut() {
                line.advance();
            }
        }
    }
}
