//! Boxfile CLI: index, clean, check and verify a content-addressed file repository.

use anyhow::Result;
use boxfile::engine::arg_parser::Cli;
use boxfile::engine::handle_run;
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
