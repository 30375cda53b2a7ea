//! Command-line surface, parsed with `clap::Parser` in the style this
//! codebase's other `clap`-based host tooling uses.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "markab", about = "Run a compiled Markab ROM image")]
pub struct Args {
    /// ROM image to boot. Debug symbols are auto-loaded from the sibling
    /// `.symbols` file when present.
    #[arg(default_value = "kernel.rom")]
    pub rom: PathBuf,

    /// Select IRC bridge mode instead of terminal mode.
    ///
    /// Accepted but unimplemented: no bridge is wired up in this build, so
    /// passing it is a usage error rather than a silently-ignored flag.
    #[arg(long)]
    pub irc: bool,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

#[derive(Debug, clap::Args)]
#[group(multiple = false)]
pub struct Verbosity {
    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all but warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Verbosity {
    pub fn filter_directive(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
