//! # CLI Argument Definitions

use clap::Parser;
use std::path::PathBuf;

/// Runs factory commands against an in-memory keyed registry.
#[derive(Debug, Parser)]
#[command(name = "keyed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Drive a keyed entity factory from the command line")]
#[command(after_help = COMMANDS_HELP)]
pub struct Cli {
    /// Configuration file with `[factory]` and `[logger]` tables
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command to run; repeat to run several in order
    #[arg(short, long = "exec", value_name = "COMMAND")]
    pub exec: Vec<String>,

    /// Script with one command per line; `#` starts a comment
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Stop at the first failing command
    #[arg(long)]
    pub strict: bool,
}

const COMMANDS_HELP: &str = "\
Commands:
  construct <key> [value]            construct or reconfigure an entity
  fetch <key>                        construct with no value
  select <key>...                    resolve several keys without reconfiguring
  loaded <key>                       whether the key has a live entity
  assign <key> <entity-key> [value]  install a detached entity under <key>
  purge <key>                        purge the live entity for <key>
  show <key>                         print the live entity for <key>
  len                                number of live entities
  purge-all                          purge every live entity";
