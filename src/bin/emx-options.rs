//! emx-options CLI
//!
//! Normalize a command line against an option table, getopt(1) style:
//! every recognized option is printed in canonical form, followed by `--`
//! and the positional arguments, all shell-quoted.
//!
//! ```text
//! $ emx-options -o 'c:count <n>' -o 'v|verbose' -- -vc3 --verb file
//!  -v -c '3' -v -- 'file'
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{Context, Result};
use clap::Parser;
use emx_options::{
    ArgvSource, Ctrl, OptResult, OptionDecl, Options, StrTokSource, StreamSource, TokenSource,
};

#[derive(Parser, Debug)]
#[command(name = "emx-options")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Normalize command-line options against an option table")]
struct Cli {
    /// Option specification, e.g. 'c:count <n>' (repeatable)
    #[arg(short = 'o', long = "option", value_name = "SPEC", allow_hyphen_values = true)]
    specs: Vec<String>,

    /// Command name used in diagnostics and usage
    #[arg(short = 'n', long = "name", default_value = "emx-options")]
    name: String,

    /// Control flags: anycase, quiet, plus, short-only, long-only, no-guessing, parse-pos
    #[arg(short = 'c', long = "ctrl", value_delimiter = ',')]
    ctrls: Vec<String>,

    /// Don't print diagnostics
    #[arg(short, long)]
    quiet: bool,

    /// Print the usage line for the option table and exit
    #[arg(long = "usage", value_name = "POSITIONALS", num_args = 0..=1, default_missing_value = "")]
    usage: Option<String>,

    /// Read tokens from a file ('-' for stdin), skipping comment lines
    #[arg(long = "from", value_name = "FILE", conflicts_with = "split")]
    from: Option<PathBuf>,

    /// Comment marker for --from
    #[arg(long = "comment", default_value_t = emx_options::DEFAULT_COMMENT, requires = "from")]
    comment: char,

    /// Read tokens from a single string
    #[arg(long = "split", value_name = "STRING")]
    split: Option<String>,

    /// Delimiter characters for --split [default: whitespace]
    #[arg(long = "delimiters", requires = "split")]
    delimiters: Option<String>,

    /// Trace scanner decisions on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Arguments to scan (put them after `--`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(io::stderr)
            .init();
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut ctrls: Ctrl = cli.ctrls.join(",").parse().context("invalid --ctrl value")?;
    if cli.quiet {
        ctrls |= Ctrl::QUIET;
    }

    let mut options = Options::builder(&cli.name)
        .specs(cli.specs.iter().cloned())
        .ctrls(ctrls)
        .build()
        .context("invalid option table")?;
    tracing::debug!(%ctrls, decls = options.declarations().len(), "option table ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(positionals) = cli.usage.as_deref() {
        options.usage(&mut out, positionals)?;
        return Ok(ExitCode::SUCCESS);
    }

    let failed = match (&cli.from, &cli.split) {
        (Some(path), _) if path.as_os_str() == "-" => {
            let src = StreamSource::new(io::stdin().lock()).with_comment(cli.comment);
            normalize_stream(&mut options, src, &mut out)?
        }
        (Some(path), _) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let src = StreamSource::new(BufReader::new(file)).with_comment(cli.comment);
            normalize_stream(&mut options, src, &mut out)
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        (None, Some(text)) => {
            let mut src = match cli.delimiters.as_deref() {
                Some(delims) => StrTokSource::with_delimiters(text.as_str(), delims),
                None => StrTokSource::new(text.as_str()),
            };
            normalize(&mut options, &mut src, &mut out)?
        }
        (None, None) => {
            let mut src = ArgvSource::new(cli.args.iter().cloned());
            normalize(&mut options, &mut src, &mut out)?
        }
    };

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn normalize_stream<R: BufRead, W: Write>(
    options: &mut Options,
    mut src: StreamSource<R>,
    out: &mut W,
) -> Result<bool> {
    let failed = normalize(options, &mut src, out)?;
    if let Some(e) = src.take_error() {
        return Err(e).context("token stream ended early");
    }
    Ok(failed)
}

/// Print the canonical form of every option, then `--` and the positional
/// arguments. Returns whether any bad or ambiguous option was seen.
fn normalize<S: TokenSource + ?Sized, W: Write>(
    options: &mut Options,
    src: &mut S,
    out: &mut W,
) -> io::Result<bool> {
    let mut failed = false;
    let mut positionals = Vec::new();

    loop {
        match options.step(src) {
            OptResult::Matched(_, value) => {
                let flag = options.last_match().map(canonical_flag).unwrap_or_default();
                write!(out, " {}", flag)?;
                if let Some(value) = value {
                    write!(out, " {}", shell_quote(&value))?;
                }
            }
            OptResult::Positional(arg) => positionals.push(arg),
            OptResult::BadChar(_) | OptResult::BadKwd(_) | OptResult::Ambiguous(_) => {
                failed = true;
            }
            OptResult::EndOfOptions => break,
        }
    }

    while let Some(arg) = src.next() {
        positionals.push(arg);
    }

    write!(out, " --")?;
    for arg in &positionals {
        write!(out, " {}", shell_quote(arg))?;
    }
    writeln!(out)?;
    Ok(failed)
}

/// `-x` for declarations with a short letter, `--long` otherwise
fn canonical_flag(decl: &OptionDecl) -> String {
    match (decl.letter(), decl.long_name()) {
        (Some(c), _) => format!("-{}", c),
        (None, Some(long)) => format!("--{}", long),
        (None, None) => String::new(),
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
