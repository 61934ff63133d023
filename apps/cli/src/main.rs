//! foldertoc CLI: regenerates a README's folder index.
//!
//! Scans the project's top-level folders and rewrites the managed region of
//! the root README with one link per folder and one section per folder README.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
