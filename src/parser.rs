//! Option scanner
//!
//! [`Options`] owns a declaration table and the scan state that carries over
//! between calls to [`Options::step`]:
//!
//! - a cursor into a bundled short-option token (`-abc`) that is only partly
//!   consumed
//! - the list option currently collecting values, if any
//! - whether a literal `--` has been seen
//!
//! Each step pulls at most what it needs from a [`TokenSource`] and reports
//! one [`OptResult`]. The rules, in order:
//!
//! 1. A partly scanned bundle continues with its next letter.
//! 2. No tokens left: end of options.
//! 3. `--` (the first one only): consumed; scanning ends unless positional
//!    arguments are being returned, in which case every later token is a
//!    positional argument.
//! 4. A token that does not look like an option (no leading `-`, a lone `-`,
//!    or anything after `--`) is a value for the pending list option if there
//!    is one, otherwise a positional argument (returned with
//!    [`Ctrl::PARSE_POS`], left unconsumed without it).
//! 5. `--name` (or `+name` with [`Ctrl::PLUS`]) is a long option, `-abc` a
//!    bundle of short options (a long option with [`Ctrl::LONG_ONLY`]).
//!
//! An unknown short option is retried once as a long option and vice versa,
//! quietly, unless [`Ctrl::NO_GUESSING`] is set.

use std::fmt;
use crate::ctrl::Ctrl;
use crate::decl::OptionDecl;
use crate::error::SpecError;
use crate::source::TokenSource;

/// The outcome of one scanner step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptResult {
    /// A declared option, with its value if it has one.
    ///
    /// The character is the declaration's option character, which is the
    /// "no short form" placeholder for long-only declarations; use
    /// [`Options::last_match`] to tell those apart. A required value that
    /// could not be found is reported as `None` here (plus a diagnostic),
    /// so callers must check for it.
    Matched(char, Option<String>),
    /// No more options; remaining tokens are left in the source
    EndOfOptions,
    /// Unknown short option
    BadChar(char),
    /// Unknown long option (the text after the prefix)
    BadKwd(String),
    /// Long-option prefix matching more than one declaration
    Ambiguous(String),
    /// A positional argument (only with [`Ctrl::PARSE_POS`])
    Positional(String),
}

impl OptResult {
    pub fn is_match(&self) -> bool {
        matches!(self, OptResult::Matched(..))
    }

    pub fn is_end(&self) -> bool {
        *self == OptResult::EndOfOptions
    }

    /// Whether this reports a bad or ambiguous option
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            OptResult::BadChar(_) | OptResult::BadKwd(_) | OptResult::Ambiguous(_)
        )
    }

    /// The string attached to the result, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            OptResult::Matched(_, v) => v.as_deref(),
            OptResult::BadKwd(s) | OptResult::Ambiguous(s) | OptResult::Positional(s) => Some(s),
            OptResult::EndOfOptions | OptResult::BadChar(_) => None,
        }
    }
}

/// Result of matching a long-option prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongMatch {
    NoMatch,
    /// Index into [`Options::declarations`]
    Unique(usize),
    Ambiguous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KwdMatch {
    NoMatch,
    Partial,
    Exact,
}

/// Where diagnostics go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Diagnostics {
    /// Print each diagnostic line to stderr
    #[default]
    Stderr,
    /// Collect diagnostic lines in memory
    Buffer(String),
}

impl Diagnostics {
    fn emit(&mut self, command: &str, msg: fmt::Arguments<'_>) {
        tracing::debug!(command, message = %msg, "option diagnostic");
        match self {
            Diagnostics::Stderr => eprintln!("{}: {}.", command, msg),
            Diagnostics::Buffer(buf) => {
                buf.push_str(&format!("{}: {}.\n", command, msg));
            }
        }
    }
}

/// Partly consumed option token
#[derive(Debug, Clone)]
struct Cursor {
    token: String,
    /// Byte offset of the next unread character
    pos: usize,
}

impl Cursor {
    fn rest(&self) -> &str {
        &self.token[self.pos..]
    }
}

/// A declaration table plus scan state
#[derive(Debug, Clone)]
pub struct Options {
    name: String,
    decls: Vec<OptionDecl>,
    ctrls: Ctrl,
    cursor: Option<Cursor>,
    /// List option collecting plain tokens as values
    pending_list: Option<usize>,
    explicit_end: bool,
    last_match: Option<usize>,
    diag: Diagnostics,
}

impl Options {
    /// Build a scanner for `name` (any directory prefix is dropped) from a
    /// table of specification strings.
    pub fn new<I, S>(name: &str, specs: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = basename(name);
        let decls = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                OptionDecl::parse(spec.as_ref())
                    .map_err(|e| e.with_index(i).with_command(name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_decls(name, decls))
    }

    /// Build a scanner from already parsed declarations.
    pub fn from_decls(name: &str, decls: Vec<OptionDecl>) -> Self {
        Self {
            name: basename(name).to_string(),
            decls,
            ctrls: Ctrl::DEFAULT,
            cursor: None,
            pending_list: None,
            explicit_end: false,
            last_match: None,
            diag: Diagnostics::default(),
        }
    }

    pub fn builder(name: impl Into<String>) -> OptionsBuilder {
        OptionsBuilder::new(name)
    }

    /// Command name used in diagnostics and usage
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declarations(&self) -> &[OptionDecl] {
        &self.decls
    }

    pub fn ctrls(&self) -> Ctrl {
        self.ctrls
    }

    pub fn set_ctrls(&mut self, ctrls: Ctrl) {
        self.ctrls = ctrls;
    }

    /// Whether scanning stopped (or, with [`Ctrl::PARSE_POS`], switched to
    /// positional arguments) because of a literal `--`.
    pub fn explicit_endopts(&self) -> bool {
        self.explicit_end
    }

    /// The declaration behind the most recent [`OptResult::Matched`]
    pub fn last_match(&self) -> Option<&OptionDecl> {
        self.last_match.map(|i| &self.decls[i])
    }

    pub fn set_diagnostics(&mut self, diag: Diagnostics) {
        self.diag = diag;
    }

    /// Collected diagnostics (empty when printing to stderr)
    pub fn diagnostics(&self) -> &str {
        match &self.diag {
            Diagnostics::Buffer(buf) => buf,
            Diagnostics::Stderr => "",
        }
    }

    pub fn take_diagnostics(&mut self) -> String {
        match &mut self.diag {
            Diagnostics::Buffer(buf) => std::mem::take(buf),
            Diagnostics::Stderr => String::new(),
        }
    }

    /// Forget any partly scanned token, pending list option and `--`, so the
    /// source can be scanned again from its current position.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.pending_list = None;
        self.explicit_end = false;
        self.last_match = None;
    }

    /// First declaration with the short letter `letter`.
    pub fn match_short(&self, letter: char, ignore_case: bool) -> Option<&OptionDecl> {
        self.find_short(letter, ignore_case).map(|i| &self.decls[i])
    }

    fn find_short(&self, letter: char, ignore_case: bool) -> Option<usize> {
        self.decls.iter().position(|d| match d.letter() {
            Some(c) if c == letter => true,
            Some(c) => ignore_case && eq_ignore_case(c, letter),
            None => false,
        })
    }

    /// Match a (possibly abbreviated) long option name, ignoring case.
    ///
    /// An exact match always wins. Otherwise the prefix must select exactly
    /// one declaration.
    pub fn match_long(&self, prefix: &str) -> LongMatch {
        if prefix.is_empty() {
            return LongMatch::NoMatch;
        }
        let mut first = None;
        let mut partial = 0;
        for (i, decl) in self.decls.iter().enumerate() {
            let Some(long) = decl.long_name() else { continue };
            match kwd_match(long, prefix) {
                KwdMatch::Exact => return LongMatch::Unique(i),
                KwdMatch::Partial => {
                    partial += 1;
                    first.get_or_insert(i);
                }
                KwdMatch::NoMatch => {}
            }
        }
        match (partial, first) {
            (1, Some(i)) => LongMatch::Unique(i),
            (0, _) => LongMatch::NoMatch,
            _ => LongMatch::Ambiguous,
        }
    }

    /// Scan the next option from `src`.
    pub fn step<S: TokenSource + ?Sized>(&mut self, src: &mut S) -> OptResult {
        self.last_match = None;
        let result = self.step_inner(src);
        tracing::trace!(command = %self.name, ?result, "option step");
        result
    }

    /// Iterate over step results up to (not including) end of options.
    pub fn scan<'a, S: TokenSource + ?Sized>(&'a mut self, src: &'a mut S) -> Scan<'a, S> {
        Scan {
            options: self,
            src,
            done: false,
        }
    }

    fn step_inner<S: TokenSource + ?Sized>(&mut self, src: &mut S) -> OptResult {
        let ctrls = self.ctrls;
        let opts_only = !ctrls.contains(Ctrl::PARSE_POS);
        if opts_only {
            self.explicit_end = false;
        }

        if self.cursor.as_ref().is_some_and(|c| !c.rest().is_empty()) {
            return self.parse_short(src, ctrls);
        }
        self.cursor = None;

        let arg = loop {
            let Some(arg) = src.current() else {
                self.pending_list = None;
                return OptResult::EndOfOptions;
            };
            if !self.explicit_end && arg == "--" {
                src.advance();
                self.pending_list = None;
                self.explicit_end = true;
                if opts_only {
                    return OptResult::EndOfOptions;
                }
                continue;
            }
            break arg.to_string();
        };

        if self.explicit_end || !is_option(ctrls, &arg) {
            if let Some(idx) = self.pending_list {
                src.advance();
                self.last_match = Some(idx);
                return OptResult::Matched(self.decls[idx].opt_char(), Some(arg));
            }
            if opts_only {
                return OptResult::EndOfOptions;
            }
            src.advance();
            return OptResult::Positional(arg);
        }

        src.advance();

        if !ctrls.contains(Ctrl::SHORT_ONLY) {
            if arg.starts_with("--") {
                self.cursor = Some(Cursor { token: arg, pos: 2 });
                return self.parse_long(src, ctrls);
            }
            if ctrls.contains(Ctrl::PLUS) && arg.starts_with('+') {
                self.cursor = Some(Cursor { token: arg, pos: 1 });
                return self.parse_long(src, ctrls);
            }
        }

        let long = ctrls.contains(Ctrl::LONG_ONLY) && arg.starts_with('-');
        self.cursor = Some(Cursor { token: arg, pos: 1 });
        if long {
            self.parse_long(src, ctrls)
        } else {
            self.parse_short(src, ctrls)
        }
    }

    /// Scan one short option letter at the cursor.
    fn parse_short<S: TokenSource + ?Sized>(&mut self, src: &mut S, ctrls: Ctrl) -> OptResult {
        self.pending_list = None;

        let Some(cursor) = self.cursor.as_mut() else {
            return OptResult::EndOfOptions;
        };
        let Some(letter) = cursor.rest().chars().next() else {
            self.cursor = None;
            return OptResult::EndOfOptions;
        };
        let start = cursor.pos;
        cursor.pos += letter.len_utf8();

        let Some(idx) = self.find_short(letter, ctrls.contains(Ctrl::ANYCASE)) else {
            if !ctrls.contains(Ctrl::NO_GUESSING) {
                let saved = self.cursor.clone();
                if let Some(cursor) = self.cursor.as_mut() {
                    cursor.pos = start;
                }
                let guess = self.parse_long(src, ctrls | Ctrl::QUIET | Ctrl::NO_GUESSING);
                if guess.is_match() {
                    return guess;
                }
                self.cursor = saved;
            }
            self.diagnose(ctrls, format_args!("unknown option -{}", letter));
            return OptResult::BadChar(letter);
        };

        let opt = self.decls[idx].opt_char();
        let arity = self.decls[idx].arity();
        self.last_match = Some(idx);

        if !arity.takes_value() {
            if self.cursor.as_ref().is_some_and(|c| c.rest().is_empty()) {
                self.cursor = None;
            }
            return OptResult::Matched(opt, None);
        }

        // The rest of the token, if any, is the value
        let rest = self
            .cursor
            .take()
            .map(|c| c.rest().to_string())
            .unwrap_or_default();
        let value = if rest.is_empty() {
            take_value(src, ctrls, arity.is_required())
        } else {
            Some(rest)
        };

        match value {
            Some(value) => {
                if arity.is_list() {
                    self.pending_list = Some(idx);
                }
                OptResult::Matched(opt, Some(value))
            }
            None => {
                if arity.is_required() {
                    self.diagnose(ctrls, format_args!("argument required for -{} option", opt));
                }
                OptResult::Matched(opt, None)
            }
        }
    }

    /// Scan the rest of the cursor token as a long option.
    fn parse_long<S: TokenSource + ?Sized>(&mut self, src: &mut S, ctrls: Ctrl) -> OptResult {
        self.pending_list = None;

        let Some(text) = self.cursor.as_ref().map(|c| c.rest().to_string()) else {
            return OptResult::EndOfOptions;
        };
        let (name, inline) = match text.find(|c: char| c == ':' || c == '=') {
            Some(i) => (&text[..i], Some(text[i + 1..].to_string())),
            None => (text.as_str(), None),
        };
        let prefix = if ctrls.contains(Ctrl::LONG_ONLY) { "-" } else { "--" };

        let idx = match self.match_long(name) {
            LongMatch::Unique(idx) => idx,
            found => {
                let ambiguous = found == LongMatch::Ambiguous;
                if !ambiguous && !ctrls.contains(Ctrl::NO_GUESSING) {
                    let saved = self.cursor.clone();
                    let guess = self.parse_short(src, ctrls | Ctrl::QUIET | Ctrl::NO_GUESSING);
                    if guess.is_match() {
                        return guess;
                    }
                    self.cursor = saved;
                }
                let what = if ambiguous { "ambiguous" } else { "unknown" };
                self.diagnose(ctrls, format_args!("{} option {}{}", what, prefix, text));
                self.cursor = None;
                return if ambiguous {
                    OptResult::Ambiguous(text)
                } else {
                    OptResult::BadKwd(text)
                };
            }
        };

        self.cursor = None;
        self.last_match = Some(idx);
        let opt = self.decls[idx].opt_char();
        let arity = self.decls[idx].arity();
        let display = self.decls[idx].display_name(prefix);

        if !arity.takes_value() {
            if inline.is_some() {
                self.diagnose(ctrls, format_args!("option {} does NOT take an argument", display));
            }
            return OptResult::Matched(opt, inline);
        }

        let value = match inline {
            Some(value) => Some(value),
            None => take_value(src, ctrls, arity.is_required()),
        };
        match value {
            Some(value) => {
                if arity.is_list() {
                    self.pending_list = Some(idx);
                }
                OptResult::Matched(opt, Some(value))
            }
            None => {
                if arity.is_required() {
                    self.diagnose(ctrls, format_args!("argument required for {} option", display));
                }
                OptResult::Matched(opt, None)
            }
        }
    }

    fn diagnose(&mut self, ctrls: Ctrl, msg: fmt::Arguments<'_>) {
        if !ctrls.contains(Ctrl::QUIET) {
            self.diag.emit(&self.name, msg);
        }
    }
}

/// Iterator returned by [`Options::scan`]
pub struct Scan<'a, S: TokenSource + ?Sized> {
    options: &'a mut Options,
    src: &'a mut S,
    done: bool,
}

impl<S: TokenSource + ?Sized> Iterator for Scan<'_, S> {
    type Item = OptResult;

    fn next(&mut self) -> Option<OptResult> {
        if self.done {
            return None;
        }
        match self.options.step(&mut *self.src) {
            OptResult::EndOfOptions => {
                self.done = true;
                None
            }
            result => Some(result),
        }
    }
}

/// Builder for [`Options`]
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    name: String,
    specs: Vec<String>,
    ctrls: Ctrl,
    diag: Diagnostics,
}

impl OptionsBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specs: Vec::new(),
            ctrls: Ctrl::DEFAULT,
            diag: Diagnostics::default(),
        }
    }

    /// Add one specification string
    pub fn spec(mut self, spec: impl Into<String>) -> Self {
        self.specs.push(spec.into());
        self
    }

    /// Add several specification strings
    pub fn specs<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specs.extend(specs.into_iter().map(Into::into));
        self
    }

    pub fn ctrls(mut self, ctrls: Ctrl) -> Self {
        self.ctrls = ctrls;
        self
    }

    pub fn ctrl(mut self, flag: Ctrl, on: bool) -> Self {
        self.ctrls.set(flag, on);
        self
    }

    pub fn quiet(self, quiet: bool) -> Self {
        self.ctrl(Ctrl::QUIET, quiet)
    }

    pub fn parse_positional(self, on: bool) -> Self {
        self.ctrl(Ctrl::PARSE_POS, on)
    }

    /// Collect diagnostics in memory instead of printing them
    pub fn capture_diagnostics(mut self) -> Self {
        self.diag = Diagnostics::Buffer(String::new());
        self
    }

    pub fn build(self) -> Result<Options, SpecError> {
        let mut options = Options::new(&self.name, &self.specs)?;
        options.ctrls = self.ctrls;
        options.diag = self.diag;
        Ok(options)
    }
}

/// Strip any directory prefix from a command name.
fn basename(name: &str) -> &str {
    name.rsplit(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
        .next()
        .unwrap_or(name)
}

fn is_option(ctrls: Ctrl, arg: &str) -> bool {
    arg.len() > 1 && (arg.starts_with('-') || (ctrls.contains(Ctrl::PLUS) && arg.starts_with('+')))
}

/// Take the next token as an option value: always for a required value,
/// otherwise only if it does not look like an option itself.
fn take_value<S: TokenSource + ?Sized>(src: &mut S, ctrls: Ctrl, required: bool) -> Option<String> {
    let next = src.current()?;
    if !required && is_option(ctrls, next) {
        return None;
    }
    let value = next.to_string();
    src.advance();
    Some(value)
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn kwd_match(name: &str, attempt: &str) -> KwdMatch {
    let mut name_chars = name.chars();
    for a in attempt.chars() {
        match name_chars.next() {
            Some(n) if eq_ignore_case(n, a) => {}
            _ => return KwdMatch::NoMatch,
        }
    }
    if name_chars.next().is_some() {
        KwdMatch::Partial
    } else {
        KwdMatch::Exact
    }
}
