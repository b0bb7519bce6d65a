//! Declaration-table errors

use std::fmt;

/// The kind of declaration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecErrorKind {
    /// The specification string is empty (or only a hidden marker)
    Empty,
    /// The arity character is not one of `|?:*+`
    BadArity(char),
}

/// A malformed entry in an option declaration table.
///
/// These are programming errors in the table, not user input errors, so
/// they are reported once at construction and never during scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
    pub kind: SpecErrorKind,
    /// The offending specification string
    pub spec: String,
    /// Position of the entry in the declaration table, when known
    pub index: Option<usize>,
    /// Command name the table belongs to, when known
    pub command: Option<String>,
}

impl SpecError {
    pub fn new(kind: SpecErrorKind, spec: impl Into<String>) -> Self {
        Self {
            kind,
            spec: spec.into(),
            index: None,
            command: None,
        }
    }

    pub fn empty(spec: impl Into<String>) -> Self {
        Self::new(SpecErrorKind::Empty, spec)
    }

    pub fn bad_arity(spec: impl Into<String>, found: char) -> Self {
        Self::new(SpecErrorKind::BadArity(found), spec)
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref cmd) = self.command {
            write!(f, "{}: ", cmd)?;
        }
        if let Some(index) = self.index {
            write!(f, "option #{}: ", index)?;
        }
        match self.kind {
            SpecErrorKind::Empty => {
                write!(f, "empty option specifier (must be at least 1 character long)")
            }
            SpecErrorKind::BadArity(c) => write!(
                f,
                "bad option specifier {:?}: 2nd character {:?} must be in the set \"|?:*+\"",
                self.spec, c
            ),
        }
    }
}

impl std::error::Error for SpecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_bad_arity_with_context() {
        let err = SpecError::bad_arity("x!xray", '!')
            .with_index(2)
            .with_command("prog");
        let msg = err.to_string();
        assert!(msg.starts_with("prog: option #2: "));
        assert!(msg.contains("\"x!xray\""));
        assert!(msg.contains("'!'"));
    }

    #[test]
    fn test_display_empty() {
        let msg = SpecError::empty("").to_string();
        assert!(msg.contains("empty option specifier"));
    }
}
