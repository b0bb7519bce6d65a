//! Usage line formatting

use std::io::{self, Write};
use crate::ctrl::Ctrl;
use crate::decl::OptionDecl;
use crate::parser::Options;

/// Column limit for usage output
pub const USAGE_WIDTH: usize = 79;

/// Render one declaration as a usage fragment such as `[-c|--count <n>]`.
///
/// Returns `None` for hidden declarations and for declarations that have no
/// form left to show under the given control flags.
pub fn format_decl(decl: &OptionDecl, ctrls: Ctrl) -> Option<String> {
    if decl.is_hidden() {
        return None;
    }

    let mut letter = decl.letter();
    let mut long = decl.long_name();
    if ctrls.contains(Ctrl::SHORT_ONLY) && (letter.is_some() || ctrls.contains(Ctrl::NO_GUESSING)) {
        long = None;
    }
    if ctrls.contains(Ctrl::LONG_ONLY) && (long.is_some() || ctrls.contains(Ctrl::NO_GUESSING)) {
        letter = None;
    }
    if letter.is_none() && long.is_none() {
        return None;
    }

    let mut out = String::from("[");
    if let Some(c) = letter {
        out.push('-');
        out.push(c);
    }
    if letter.is_some() && long.is_some() {
        out.push('|');
    }
    if let Some(long) = long {
        // long options only get "--" when both forms are accepted
        if ctrls.contains(Ctrl::LONG_ONLY) || ctrls.contains(Ctrl::SHORT_ONLY) {
            out.push('-');
        } else {
            out.push_str("--");
        }
        out.push_str(long);
    }

    let arity = decl.arity();
    if arity.takes_value() {
        out.push(' ');
        if arity.is_optional() {
            out.push('[');
        }
        out.push_str(decl.value_name());
        if arity.is_list() {
            out.push_str(" ...");
        }
        if arity.is_optional() {
            out.push(']');
        }
    }
    out.push(']');
    Some(out)
}

impl Options {
    /// Write the usage message, followed by `positionals` (a description of
    /// the positional arguments), wrapped at [`USAGE_WIDTH`] columns.
    pub fn usage<W: Write + ?Sized>(&self, out: &mut W, positionals: &str) -> io::Result<()> {
        out.write_all(self.usage_string(positionals).as_bytes())
    }

    /// The usage message as a string, ending with a newline.
    pub fn usage_string(&self, positionals: &str) -> String {
        let ctrls = self.ctrls();
        let mut out = format!("usage: {}", self.name());
        let mut col = self.name().chars().count() + 7;
        let margin = col + 1;

        // Tagged with the table position; only the very first declaration
        // gets the narrower limit, even when it is hidden.
        let decls = self.declarations();
        let fragments = decls
            .iter()
            .enumerate()
            .filter_map(|(i, d)| format_decl(d, ctrls).map(|f| (i, f)))
            .chain((!positionals.is_empty()).then(|| (decls.len(), positionals.to_string())));

        for (i, frag) in fragments {
            let len = frag.chars().count();
            let limit = if i == 0 { USAGE_WIDTH - 1 } else { USAGE_WIDTH };
            if col + len + 1 > limit {
                out.push('\n');
                out.push_str(&" ".repeat(margin));
                col = margin;
            } else {
                out.push(' ');
                col += 1;
            }
            col += len;
            out.push_str(&frag);
        }

        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(spec: &str) -> OptionDecl {
        OptionDecl::parse(spec).unwrap()
    }

    fn usage(specs: &[&str], ctrls: Ctrl, positionals: &str) -> String {
        let mut o = Options::new("cmd", specs).unwrap();
        o.set_ctrls(ctrls);
        o.usage_string(positionals)
    }

    #[test]
    fn test_single_flag() {
        assert_eq!(usage(&["x"], Ctrl::DEFAULT, ""), "usage: cmd [-x]\n");
    }

    #[test]
    fn test_format_fragments() {
        let c = Ctrl::DEFAULT;
        assert_eq!(format_decl(&decl("c:count <n>"), c).unwrap(), "[-c|--count <n>]");
        assert_eq!(format_decl(&decl("o?out"), c).unwrap(), "[-o|--out [<value>]]");
        assert_eq!(format_decl(&decl("g+groups"), c).unwrap(), "[-g|--groups <value> ...]");
        assert_eq!(format_decl(&decl("l*list <item>"), c).unwrap(), "[-l|--list [<item> ...]]");
        assert_eq!(format_decl(&decl(" |verbose"), c).unwrap(), "[--verbose]");
        assert_eq!(format_decl(&decl("n: <num>"), c).unwrap(), "[-n <num>]");
        assert_eq!(format_decl(&decl("-d|debug"), c), None);
    }

    #[test]
    fn test_format_short_only() {
        let c = Ctrl::SHORT_ONLY;
        assert_eq!(format_decl(&decl("c:count"), c).unwrap(), "[-c <value>]");
        // still reachable by guessing, so the long form is shown
        assert_eq!(format_decl(&decl(" |verbose"), c).unwrap(), "[-verbose]");
        assert_eq!(format_decl(&decl(" |verbose"), c | Ctrl::NO_GUESSING), None);
    }

    #[test]
    fn test_format_long_only() {
        let c = Ctrl::LONG_ONLY;
        assert_eq!(format_decl(&decl("c:count"), c).unwrap(), "[-count <value>]");
        assert_eq!(format_decl(&decl("x"), c).unwrap(), "[-x]");
        assert_eq!(format_decl(&decl("x"), c | Ctrl::NO_GUESSING), None);
    }

    #[test]
    fn test_hidden_and_positionals() {
        assert_eq!(
            usage(&["a", "-d|debug", "b|bee"], Ctrl::DEFAULT, "file..."),
            "usage: cmd [-a] [-b|--bee] file...\n"
        );
    }

    #[test]
    fn test_wraps_at_width() {
        let mut o = Options::new("/bin/prog", ["a:alpha", "b:bravo", "c:charlie", "d:delta"]).unwrap();
        o.set_ctrls(Ctrl::DEFAULT);
        let expected = concat!(
            "usage: prog [-a|--alpha <value>] [-b|--bravo <value>] [-c|--charlie <value>]\n",
            "            [-d|--delta <value>] file...\n",
        );
        assert_eq!(o.usage_string("file..."), expected);
        for line in expected.lines() {
            assert!(line.len() <= USAGE_WIDTH);
        }
    }

    #[test]
    fn test_first_column_limit_applies_to_first_declaration_only() {
        // "[-a|--" + 61 letters + "]" is 68 columns: after "usage: cmd" it
        // ends at column 79
        let long = format!("a|{}", "x".repeat(61));
        let line = format!("usage: cmd [-a|--{}]\n", "x".repeat(61));

        let o = Options::new("cmd", [long.as_str()]).unwrap();
        assert!(o.usage_string("").starts_with("usage: cmd\n"));

        let o = Options::new("cmd", ["-h|help", long.as_str()]).unwrap();
        assert_eq!(o.usage_string(""), line);
    }

    #[test]
    fn test_empty_table_still_prints_positionals() {
        let none: [&str; 0] = [];
        let o = Options::new("cmd", none).unwrap();
        assert_eq!(o.usage_string("files"), "usage: cmd files\n");
        assert_eq!(o.usage_string(""), "usage: cmd\n");
    }

    #[test]
    fn test_usage_writes_to_sink() {
        let o = Options::new("cmd", ["x"]).unwrap();
        let mut buf: Vec<u8> = Vec::new();
        o.usage(&mut buf, "args").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "usage: cmd [-x] args\n");
    }
}
