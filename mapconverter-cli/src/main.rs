//! Maps Converter CLI
//!
//! Serves rotated, reduced map images over HTTP, renders single maps to a
//! file, and maintains the tile cache.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::render::RenderArgs;
use commands::serve::ServeArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "maps-converter")]
#[command(version = mapconverter::VERSION)]
#[command(about = "Map tiles to rotated monochrome images for embedded displays", long_about = None)]
struct Cli {
    /// Configuration file (default ~/.mapconverter/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Render one map to a PNG or JSON file
    Render(RenderArgs),

    /// Inspect or clear the disk cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            runner.log_startup("serve");
            commands::serve::run(&runner, args)
        }
        Commands::Render(args) => {
            runner.log_startup("render");
            commands::render::run(&runner, args)
        }
        Commands::Cache { action } => commands::cache::run(runner.config(), action),
    }
}
