pub mod cli;
pub mod command;
pub mod session;
pub mod settings;

use crate::cli::Cli;
use crate::session::Session;
use crate::settings::ShellConfig;
use anyhow::{Context, Result, bail};
use clap::Parser;
use keyed_logger::Logger;
use std::fs;
use std::io::{self, Write};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ShellConfig::load(cli.config.as_deref())?;
    let _logger: Logger = config.logger.init()?;

    let script = match &cli.script {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        },
        None => String::new(),
    };

    let session = Session::new(config.factory, cli.strict);
    let mut out = io::stdout().lock();
    let failures =
        session.run(cli.exec.iter().map(String::as_str).chain(script.lines()), &mut out)?;
    out.flush()?;

    if failures > 0 {
        bail!("{failures} command(s) failed");
    }
    Ok(())
}
