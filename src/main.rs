//! Smolsite - a manifest-driven micro-site renderer.

mod cli;
mod error;
mod export;
mod logger;
mod manifest;
mod markdown;
mod render;
mod serve;
mod templates;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { interface, port } => serve::serve_site(&cli.manifest, interface, *port),
        Commands::Build { output } => export::export_site(&cli.manifest, output),
    }
}
