//! Rechunk CLI: re-chunk a directory of JSON exports into normalized batch files.

use anyhow::Result;
use clap::Parser;
use rechunk::engine::arg_parser::Cli;
use rechunk::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
