//! SoulLink CLI
//!
//! Command-line tools for the shared inventory save data.
//!
//! # Commands
//!
//! - `inspect` - Show the saved shared inventory
//! - `reset` - Empty the saved shared inventory
//! - `export` / `import` - Move the inventory to and from JSON
//! - `check-config` - Validate a link configuration file

mod commands;

use clap::{Parser, Subcommand};
use soullink_sync_engine::DEFAULT_RECORD_NAME;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SoulLink shared inventory tools.
#[derive(Parser)]
#[command(name = "soullink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the world save directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Name of the shared inventory record
    #[arg(global = true, long, default_value = DEFAULT_RECORD_NAME)]
    record: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the saved shared inventory
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Empty the saved shared inventory and return it to version 0
    Reset {
        /// Reset even if the inventory has items
        #[arg(short, long)]
        force: bool,
    },

    /// Write the saved shared inventory to a JSON file
    Export {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Replace the saved shared inventory with a JSON file
    Import {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Validate a link configuration file (JSON)
    CheckConfig {
        /// Configuration file
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Save path required for inspect")?;
            commands::inspect::run(&path, &cli.record, &format)?;
        }
        Commands::Reset { force } => {
            let path = cli.path.ok_or("Save path required for reset")?;
            commands::reset::run(&path, &cli.record, force)?;
        }
        Commands::Export { out } => {
            let path = cli.path.ok_or("Save path required for export")?;
            commands::transfer::export(&path, &cli.record, &out)?;
        }
        Commands::Import { input } => {
            let path = cli.path.ok_or("Save path required for import")?;
            commands::transfer::import(&path, &cli.record, &input)?;
        }
        Commands::CheckConfig { file } => {
            commands::check_config::run(&file)?;
        }
        Commands::Version => {
            println!("SoulLink CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Record format v{}", soullink_protocol::RECORD_FORMAT);
        }
    }

    Ok(())
}
