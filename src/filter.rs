//! Test-name filtering
//!
//! Positional arguments left over after option scanning are commonly used
//! as name filters: the first selects tests, the second the test case (the
//! group a test belongs to). Both are case-insensitive regular expressions;
//! a filter that is not given matches everything.

use regex::{Regex, RegexBuilder};

/// Something that can decide whether a name is selected
pub trait Matcher {
    fn matches(&self, text: &str) -> bool;
}

impl Matcher for Regex {
    fn matches(&self, text: &str) -> bool {
        self.is_match(text)
    }
}

/// Compile `pattern` as a case-insensitive regular expression.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// One-shot match of `text` against a case-insensitive `pattern`.
pub fn matches(pattern: &str, text: &str) -> Result<bool, regex::Error> {
    Ok(compile(pattern)?.is_match(text))
}

/// Selects tests by test name and test case name. A missing pattern
/// selects everything.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    test: Option<Regex>,
    testcase: Option<Regex>,
}

impl NameFilter {
    pub fn new(test: &str, testcase: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            test: Some(compile(test)?),
            testcase: Some(compile(testcase)?),
        })
    }

    /// Build from positional arguments: `[test [testcase]]`. Extra
    /// arguments are ignored.
    pub fn from_positionals<S: AsRef<str>>(args: &[S]) -> Result<Self, regex::Error> {
        let pattern = |i: usize| args.get(i).map(|s| compile(s.as_ref())).transpose();
        Ok(Self {
            test: pattern(0)?,
            testcase: pattern(1)?,
        })
    }

    pub fn includes(&self, test: &str, testcase: &str) -> bool {
        self.test.as_ref().map_or(true, |r| r.matches(test))
            && self.testcase.as_ref().map_or(true, |r| r.matches(testcase))
    }

    pub fn is_excluded(&self, test: &str, testcase: &str) -> bool {
        !self.includes(test, testcase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_case() {
        assert!(matches("^parse", "ParseLongOption").unwrap());
        assert!(!matches("^long", "ParseLongOption").unwrap());
    }

    #[test]
    fn test_matches_bad_pattern() {
        assert!(matches("(", "x").is_err());
    }

    #[test]
    fn test_default_includes_everything() {
        let f = NameFilter::default();
        assert!(f.includes("anything", "any case"));
        assert!(f.includes("", ""));
    }

    #[test]
    fn test_new_compiles_both_patterns() {
        let f = NameFilter::new(".*", "^fixture").unwrap();
        assert!(f.includes("x", "FixtureA"));
        assert!(f.is_excluded("x", "other"));
        assert!(NameFilter::new("ok", "[").is_err());
    }

    #[test]
    fn test_from_positionals() {
        let none: [&str; 0] = [];
        assert!(NameFilter::from_positionals(&none).unwrap().includes("a", "b"));

        let f = NameFilter::from_positionals(&["bundle"]).unwrap();
        assert!(f.includes("test_Bundle_short", "Parser"));
        assert!(f.is_excluded("test_long", "Parser"));

        let f = NameFilter::from_positionals(&["bundle".to_string(), "^usage$".to_string()]).unwrap();
        assert!(f.is_excluded("test_bundle", "Parser"));
        assert!(f.includes("test_bundle", "USAGE"));
    }
}
