//! passgen library crate
//!
//! This crate provides the core functionality for the `passgen` CLI. It is
//! organized into small modules: `charset` (character classes and charset
//! kinds), `generate` (password generation), `clipboard` (the clipboard
//! fallback chain) and `error`. The binary `src/main.rs` calls
//! `passgen_lib::run()` to execute the CLI.
//!
//! Generation and clipboard delivery are independent: a clipboard failure is
//! reported as a warning and never discards a generated password.

pub mod charset;
pub mod clipboard;
pub mod error;
pub mod generate;

use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::charset::CharsetKind;
use crate::clipboard::{ClipboardDispatcher, DEFAULT_TIMEOUT};
use crate::generate::{DEFAULT_LENGTH, generate_many};

/// Older charset keys that both mean `full`.
const LEGACY_FULL_ALIASES: [&str; 2] = ["special", "all"];

/// Top-level CLI. Keep `main.rs` thin.
#[derive(Parser, Debug)]
#[command(name = "passgen", version, about, long_about = None)]
struct Cli {
    /// Password length (8-128 characters)
    #[arg(short = 'l', long = "length", default_value_t = DEFAULT_LENGTH)]
    length: usize,

    /// Character set: full, alnum, letters, digits
    #[arg(short = 'c', long = "charset", default_value = "full")]
    charset: String,

    /// Number of passwords to generate; the first one is copied
    #[arg(short = 'n', long = "count", default_value_t = 1usize)]
    count: usize,

    /// Print diagnostics to stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,

    /// Copy the first password to the clipboard (default)
    #[arg(long = "copy", action = ArgAction::SetTrue, overrides_with = "no_copy")]
    copy: bool,

    /// Leave the clipboard alone
    #[arg(long = "no-copy", action = ArgAction::SetTrue, overrides_with = "copy")]
    no_copy: bool,

    /// Clipboard method to try, repeatable and in order
    /// (arboard, copyq, xclip, wl-copy, powershell, pbcopy)
    #[arg(long = "clipboard-method", value_name = "METHOD")]
    clipboard_methods: Vec<String>,

    /// Seconds to wait for an external clipboard helper (0 waits forever)
    #[arg(long = "clipboard-timeout", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    clipboard_timeout: u64,
}

impl Cli {
    fn wants_copy(&self) -> bool {
        self.copy || !self.no_copy
    }

    fn helper_timeout(&self) -> Option<Duration> {
        (self.clipboard_timeout > 0).then(|| Duration::from_secs(self.clipboard_timeout))
    }
}

/// Run the passgen CLI.
///
/// Parses arguments, generates the requested passwords, prints them, and
/// hands the first one to the clipboard chain unless `--no-copy` is given.
/// Generation and configuration errors are printed to stderr and exit with
/// status 1; a clipboard failure only prints a warning.
///
/// Example:
///
/// ```no_run
/// passgen_lib::run(); // called from src/main.rs
/// ```
pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Built before generating so a bad --clipboard-method fails fast.
    let dispatcher = cli.wants_copy().then(|| {
        build_dispatcher(&cli).unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            std::process::exit(1);
        })
    });

    info!(
        "Generating {}-character password using {} charset",
        cli.length, cli.charset
    );
    let charset = resolve_charset(&cli.charset);

    let passwords = generate_many(cli.length, charset, cli.count).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(1);
    });

    println!(
        "Generated {}-character password using {} charset",
        cli.length, cli.charset
    );
    for password in &passwords {
        println!("Generated Password: {}", password.as_str());
    }

    if let Some(dispatcher) = dispatcher
        && let Some(first) = passwords.first()
        && let Err(e) = dispatcher.copy(first.as_str(), cli.verbose)
    {
        if cli.verbose {
            eprintln!("clipboard error: {}", e);
        }
        eprintln!("warning: password was generated but not copied to clipboard");
    }
}

fn build_dispatcher(cli: &Cli) -> Result<ClipboardDispatcher, error::ClipboardError> {
    let timeout = cli.helper_timeout();
    if cli.clipboard_methods.is_empty() {
        Ok(ClipboardDispatcher::with_defaults(timeout))
    } else {
        ClipboardDispatcher::from_names(&cli.clipboard_methods, timeout)
    }
}

/// Map legacy aliases onto `full`; every other key passes through unchanged.
fn resolve_charset(key: &str) -> &str {
    if LEGACY_FULL_ALIASES.contains(&key) {
        info!("Note: '{}' charset maps to 'full' charset", key);
        CharsetKind::Full.key()
    } else {
        key
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or info with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("passgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.length, 20);
        assert_eq!(cli.charset, "full");
        assert_eq!(cli.count, 1);
        assert!(cli.wants_copy());
        assert_eq!(cli.helper_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn copy_flags_last_one_wins() {
        assert!(!parse(&["--no-copy"]).wants_copy());
        assert!(parse(&["--no-copy", "--copy"]).wants_copy());
        assert!(!parse(&["--copy", "--no-copy"]).wants_copy());
    }

    #[test]
    fn zero_timeout_is_unbounded() {
        assert_eq!(parse(&["--clipboard-timeout", "0"]).helper_timeout(), None);
    }

    #[test]
    fn legacy_aliases_map_to_full() {
        assert_eq!(resolve_charset("special"), "full");
        assert_eq!(resolve_charset("all"), "full");
        assert_eq!(resolve_charset("digits"), "digits");
        assert_eq!(resolve_charset("bogus"), "bogus");
    }

    #[test]
    fn methods_select_the_chain() {
        let cli = parse(&["--clipboard-method", "xclip", "--clipboard-method", "pbcopy"]);
        let d = build_dispatcher(&cli).unwrap();
        assert_eq!(d.names(), vec!["xclip", "pbcopy"]);

        let cli = parse(&["--clipboard-method", "clip.exe"]);
        assert!(build_dispatcher(&cli).is_err());
    }
}
