//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Smolsite manifest-driven site renderer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Manifest file describing layouts and routes/pages
    #[arg(short, long, default_value = "smolmanifest.json", global = true)]
    pub manifest: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the site over HTTP, re-reading the manifest on every request
    Serve {
        /// Interface to bind on
        #[arg(short, long, default_value = "127.0.0.1")]
        interface: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 4444)]
        port: u16,
    },

    /// Render every page in the manifest into an output directory
    Build {
        /// Output directory for the rendered pages
        #[arg(short, long, default_value = "dist")]
        output: PathBuf,
    },
}
