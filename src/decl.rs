//! Option declarations
//!
//! Each recognized option is declared with a compact specification string:
//!
//! ```text
//! c:count <n>
//! │││     └── value name shown in usage (default "<value>")
//! ││└── long option name, up to the first space
//! │└── arity: | none, ? optional, : required, * optional list, + required list
//! └── short option letter (whitespace means "no short form")
//! ```
//!
//! A leading `-` marks the declaration as hidden: it is matched as usual but
//! left out of usage output. A specification with a single character (`"x"`)
//! declares a short flag with no long form.

use std::fmt;
use std::str::FromStr;
use crate::error::SpecError;

/// Default value name used in usage output
pub const DEFAULT_VALUE_NAME: &str = "<value>";

/// How many values an option takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// `|` — no value
    None,
    /// `?` — at most one value
    OptionalOne,
    /// `:` — exactly one value
    RequiredOne,
    /// `*` — zero or more values
    OptionalMany,
    /// `+` — one or more values
    RequiredMany,
}

impl Arity {
    pub fn from_char(c: char) -> Option<Arity> {
        match c {
            '|' => Some(Arity::None),
            '?' => Some(Arity::OptionalOne),
            ':' => Some(Arity::RequiredOne),
            '*' => Some(Arity::OptionalMany),
            '+' => Some(Arity::RequiredMany),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Arity::None => '|',
            Arity::OptionalOne => '?',
            Arity::RequiredOne => ':',
            Arity::OptionalMany => '*',
            Arity::RequiredMany => '+',
        }
    }

    pub fn takes_value(self) -> bool {
        self != Arity::None
    }

    pub fn is_required(self) -> bool {
        matches!(self, Arity::RequiredOne | Arity::RequiredMany)
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Arity::OptionalOne | Arity::OptionalMany)
    }

    pub fn is_list(self) -> bool {
        matches!(self, Arity::OptionalMany | Arity::RequiredMany)
    }
}

/// Whether `c` stands for "no short form".
pub(crate) fn is_null_opt(c: char) -> bool {
    c.is_whitespace() || c.is_control()
}

/// A parsed option specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    opt_char: char,
    long_name: Option<String>,
    value_name: String,
    arity: Arity,
    hidden: bool,
    raw: String,
}

impl OptionDecl {
    /// Parse a specification string.
    pub fn parse(spec: &str) -> Result<Self, SpecError> {
        let mut chars = spec.chars();
        let mut opt_char = chars.next().ok_or_else(|| SpecError::empty(spec))?;
        let hidden = opt_char == '-';
        if hidden {
            opt_char = chars.next().ok_or_else(|| SpecError::empty(spec))?;
        }

        let rest = chars.as_str();
        let (arity, tail) = match rest.chars().next() {
            None => (Arity::None, ""),
            Some(c) => {
                let arity = Arity::from_char(c).ok_or_else(|| SpecError::bad_arity(spec, c))?;
                (arity, &rest[c.len_utf8()..])
            }
        };

        // A long name must start right after the arity character
        let (long_name, value_text) = match tail.chars().next() {
            Some(c) if !c.is_whitespace() => match tail.split_once(' ') {
                Some((long, value)) => (Some(long.to_string()), value),
                None => (Some(tail.to_string()), ""),
            },
            _ => (None, tail),
        };

        let value_text = value_text.trim();
        let value_name = if value_text.is_empty() {
            DEFAULT_VALUE_NAME.to_string()
        } else {
            value_text.to_string()
        };

        Ok(Self {
            opt_char,
            long_name,
            value_name,
            arity,
            hidden,
            raw: spec.to_string(),
        })
    }

    /// The short option letter, or `None` for long-only declarations
    pub fn letter(&self) -> Option<char> {
        if is_null_opt(self.opt_char) {
            None
        } else {
            Some(self.opt_char)
        }
    }

    /// The declared option character, including the "no short form"
    /// placeholder. This is what the scanner reports for a match.
    pub fn opt_char(&self) -> char {
        self.opt_char
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The specification string this declaration was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Human-readable name for diagnostics: `--long` when there is a long
    /// form, `-x` otherwise.
    pub(crate) fn display_name(&self, long_prefix: &str) -> String {
        match (&self.long_name, self.letter()) {
            (Some(long), _) => format!("{}{}", long_prefix, long),
            (None, Some(c)) => format!("-{}", c),
            (None, None) => format!("{:?}", self.raw),
        }
    }
}

impl FromStr for OptionDecl {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionDecl::parse(s)
    }
}

impl fmt::Display for OptionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecErrorKind;

    #[test]
    fn test_parse_letter_only() {
        let d = OptionDecl::parse("x").unwrap();
        assert_eq!(d.letter(), Some('x'));
        assert_eq!(d.arity(), Arity::None);
        assert_eq!(d.long_name(), None);
        assert_eq!(d.value_name(), DEFAULT_VALUE_NAME);
        assert!(!d.is_hidden());
    }

    #[test]
    fn test_parse_full_spec() {
        let d = OptionDecl::parse("c:count <n>").unwrap();
        assert_eq!(d.letter(), Some('c'));
        assert_eq!(d.arity(), Arity::RequiredOne);
        assert_eq!(d.long_name(), Some("count"));
        assert_eq!(d.value_name(), "<n>");
    }

    #[test]
    fn test_parse_each_arity() {
        for (spec, arity) in [
            ("a|all", Arity::None),
            ("o?out", Arity::OptionalOne),
            ("r:req", Arity::RequiredOne),
            ("l*list", Arity::OptionalMany),
            ("g+groups", Arity::RequiredMany),
        ] {
            let d = OptionDecl::parse(spec).unwrap();
            assert_eq!(d.arity(), arity, "spec {}", spec);
            assert_eq!(d.arity().as_char(), spec.chars().nth(1).unwrap());
        }
    }

    #[test]
    fn test_parse_long_only() {
        let d = OptionDecl::parse(" |verbose").unwrap();
        assert_eq!(d.letter(), None);
        assert_eq!(d.opt_char(), ' ');
        assert_eq!(d.long_name(), Some("verbose"));
    }

    #[test]
    fn test_value_name_without_long_name() {
        let d = OptionDecl::parse("n: <count>").unwrap();
        assert_eq!(d.long_name(), None);
        assert_eq!(d.value_name(), "<count>");
    }

    #[test]
    fn test_value_name_trimmed() {
        let d = OptionDecl::parse("f:file   path  ").unwrap();
        assert_eq!(d.long_name(), Some("file"));
        assert_eq!(d.value_name(), "path");
    }

    #[test]
    fn test_parse_hidden() {
        let d = OptionDecl::parse("-d|debug").unwrap();
        assert!(d.is_hidden());
        assert_eq!(d.letter(), Some('d'));
        assert_eq!(d.long_name(), Some("debug"));
        assert_eq!(d.raw(), "-d|debug");
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert_eq!(OptionDecl::parse("").unwrap_err().kind, SpecErrorKind::Empty);
        assert_eq!(OptionDecl::parse("-").unwrap_err().kind, SpecErrorKind::Empty);
    }

    #[test]
    fn test_parse_bad_arity() {
        let err = OptionDecl::parse("xyz").unwrap_err();
        assert_eq!(err.kind, SpecErrorKind::BadArity('y'));
        assert_eq!(err.spec, "xyz");
        // the hidden marker shifts the arity position
        let err = OptionDecl::parse("-x=foo").unwrap_err();
        assert_eq!(err.kind, SpecErrorKind::BadArity('='));
    }

    #[test]
    fn test_parse_is_idempotent() {
        for spec in ["x", "c:count <n>", "-h|help", " *files", "g+", "é?accent"] {
            let d = OptionDecl::parse(spec).unwrap();
            let again: OptionDecl = d.raw().parse().unwrap();
            assert_eq!(d, again);
            assert_eq!(d.to_string(), spec);
        }
    }

    #[test]
    fn test_non_ascii_letter() {
        let d = OptionDecl::parse("é?accent").unwrap();
        assert_eq!(d.letter(), Some('é'));
        assert_eq!(d.arity(), Arity::OptionalOne);
        assert_eq!(d.long_name(), Some("accent"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(OptionDecl::parse("c:count").unwrap().display_name("--"), "--count");
        assert_eq!(OptionDecl::parse("c:count").unwrap().display_name("-"), "-count");
        assert_eq!(OptionDecl::parse("c:").unwrap().display_name("--"), "-c");
    }
}
