//! CLI tests: flag parsing, config overrides, and exit codes of whole runs
//! against a local listing server.

use super::Cli;
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

mod flags;
