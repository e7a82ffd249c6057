use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use modscout::{cli, logging};
use std::fs;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(logging::Verbosity::from_flags(args.verbose, args.quiet))
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;
    args.validate().context("Invalid arguments")?;

    let units = cli::run(&args)?;
    let rendered = cli::render(&units, args.format)?;

    match &args.output_file {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}
