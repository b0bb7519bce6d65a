//! emx-options: a getopt-style option scanner
//!
//! Options are declared with compact specification strings and scanned one
//! step at a time from a token source, so callers stay in control of what
//! happens between options (and of everything after them).
//!
//! # Overview
//!
//! ```text
//! c:count <n>     -c 3, -c3, --count 3, --count=3, --co=3
//! v|verbose       -v, --verbose, -vc3 (bundled)
//! g+groups        -g a b c   (list: plain tokens keep feeding -g)
//! -d|debug        hidden from usage, still accepted
//!  |dry-run       long form only
//! ```
//!
//! ```rust,ignore
//! use emx_options::{ArgvSource, OptResult, Options};
//!
//! let mut opts = Options::new("prog", ["c:count <n>", "v|verbose"])?;
//! let mut args = ArgvSource::new(std::env::args().skip(1));
//! loop {
//!     match opts.step(&mut args) {
//!         OptResult::Matched('c', value) => { /* ... */ }
//!         OptResult::Matched('v', _) => { /* ... */ }
//!         OptResult::EndOfOptions => break,
//!         _ => { opts.usage(&mut std::io::stderr(), "file...")?; }
//!     }
//! }
//! let files = args.remaining();
//! ```
//!
//! # Specification syntax
//!
//! | Position | Meaning |
//! |----------|---------|
//! | leading `-` | hidden declaration |
//! | 1st char | short letter (whitespace: no short form) |
//! | 2nd char | arity: `\|` none, `?` optional, `:` required, `*` optional list, `+` required list |
//! | up to space | long name |
//! | after space | value name for usage (default `<value>`) |
//!
//! # Control flags
//!
//! See [`Ctrl`]: case-insensitive short options, quiet mode, `+` long
//! prefix, short-only / long-only scanning, no guessing, and positional
//! argument passthrough.

mod ctrl;
mod decl;
mod error;
mod filter;
mod parser;
mod source;
mod usage;

pub use ctrl::{Ctrl, UnknownCtrl};
pub use decl::{Arity, OptionDecl, DEFAULT_VALUE_NAME};
pub use error::{SpecError, SpecErrorKind};
pub use filter::{compile, matches, Matcher, NameFilter};
pub use parser::{Diagnostics, LongMatch, OptResult, Options, OptionsBuilder, Scan};
pub use source::{
    ArgvSource, Rewind, StrTokSource, StreamSource, TokenSource, DEFAULT_COMMENT,
    DEFAULT_DELIMITERS,
};
pub use usage::{format_decl, USAGE_WIDTH};
