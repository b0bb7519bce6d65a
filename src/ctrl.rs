//! Scanner control flags

use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
    /// A set of scanner control flags.
    ///
    /// The default (empty) set means: short options are case-sensitive,
    /// diagnostics are printed, both `-x` and `--long` forms are accepted,
    /// guessing between the two forms is enabled, and scanning stops at the
    /// first positional argument.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Ctrl: u8 {
        /// Ignore case when matching short options
        const ANYCASE     = 0x01;
        /// Don't print diagnostics
        const QUIET       = 0x02;
        /// Allow `+` as a long-option prefix
        const PLUS        = 0x04;
        /// Don't accept long options
        const SHORT_ONLY  = 0x08;
        /// Don't accept short options; `-name` is a long option
        const LONG_ONLY   = 0x10;
        /// Never retry an unknown short option as a long one (or vice versa)
        const NO_GUESSING = 0x20;
        /// Return positional arguments instead of stopping at them
        const PARSE_POS   = 0x40;
    }
}

impl Ctrl {
    pub const DEFAULT: Ctrl = Ctrl::empty();

    /// Look up a single flag by its user-facing name (`anycase`,
    /// `short-only`, ...). Case is ignored and underscores are accepted in
    /// place of dashes.
    pub fn parse_name(name: &str) -> Option<Ctrl> {
        let name = name.trim().to_ascii_uppercase().replace('-', "_");
        if name.is_empty() {
            return None;
        }
        Ctrl::from_name(&name)
    }

    /// User-facing names of the flags in this set, in declaration order
    pub fn names(self) -> impl Iterator<Item = String> {
        self.iter_names().map(|(name, _)| display_name(name))
    }
}

fn display_name(flag: &str) -> String {
    flag.to_ascii_lowercase().replace('_', "-")
}

/// Error returned when parsing an unknown flag name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCtrl(pub String);

impl fmt::Display for UnknownCtrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<String> = Ctrl::all().names().collect();
        write!(f, "unknown control flag {:?}; known: {}", self.0, known.join(", "))
    }
}

impl std::error::Error for UnknownCtrl {}

/// Parses a comma-separated list of flag names; the empty string and
/// `default` give the empty set.
impl FromStr for Ctrl {
    type Err = UnknownCtrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ctrl = Ctrl::DEFAULT;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name.eq_ignore_ascii_case("default") {
                continue;
            }
            ctrl |= Ctrl::parse_name(name).ok_or_else(|| UnknownCtrl(name.to_string()))?;
        }
        Ok(ctrl)
    }
}

impl fmt::Display for Ctrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "default");
        }
        let names: Vec<String> = self.names().collect();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(Ctrl::default().is_empty());
        assert_eq!(Ctrl::default(), Ctrl::DEFAULT);
    }

    #[test]
    fn test_combine_and_contains() {
        let c = Ctrl::QUIET | Ctrl::NO_GUESSING;
        assert!(c.contains(Ctrl::QUIET));
        assert!(c.contains(Ctrl::NO_GUESSING));
        assert!(!c.contains(Ctrl::PLUS));
        assert!(c.contains(Ctrl::QUIET | Ctrl::NO_GUESSING));
    }

    #[test]
    fn test_set_and_remove() {
        let mut c = Ctrl::DEFAULT;
        c.set(Ctrl::PARSE_POS, true);
        assert!(c.contains(Ctrl::PARSE_POS));
        c.set(Ctrl::PARSE_POS, false);
        assert!(c.is_empty());
    }

    #[test]
    fn test_parse_names() {
        let c: Ctrl = "quiet, short_only,PARSE-POS".parse().unwrap();
        assert_eq!(c, Ctrl::QUIET | Ctrl::SHORT_ONLY | Ctrl::PARSE_POS);
        assert_eq!("".parse::<Ctrl>().unwrap(), Ctrl::DEFAULT);
        assert_eq!("default".parse::<Ctrl>().unwrap(), Ctrl::DEFAULT);
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "quiet,loud".parse::<Ctrl>().unwrap_err();
        assert_eq!(err, UnknownCtrl("loud".into()));
        assert!(err.to_string().contains("no-guessing"));
    }

    #[test]
    fn test_display_round_trips() {
        let c = Ctrl::ANYCASE | Ctrl::LONG_ONLY;
        assert_eq!(c.to_string(), "anycase,long-only");
        assert_eq!(c.to_string().parse::<Ctrl>().unwrap(), c);
        assert_eq!(Ctrl::DEFAULT.to_string(), "default");
    }

    #[test]
    fn test_from_bits_truncates_unknown() {
        assert_eq!(Ctrl::from_bits_truncate(0xff).bits(), 0x7f);
        assert_eq!(Ctrl::from_bits_truncate(0xff), Ctrl::all());
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(Ctrl::parse_name("No-Guessing"), Some(Ctrl::NO_GUESSING));
        assert_eq!(Ctrl::parse_name(" parse_pos "), Some(Ctrl::PARSE_POS));
        assert_eq!(Ctrl::parse_name(""), None);
        assert_eq!(Ctrl::parse_name("default"), None);
    }

    #[test]
    fn test_names_in_declaration_order() {
        let names: Vec<String> = (Ctrl::PARSE_POS | Ctrl::QUIET).names().collect();
        assert_eq!(names, ["quiet", "parse-pos"]);
    }
}
