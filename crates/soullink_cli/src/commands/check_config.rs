//! Config check command implementation.

use soullink_sync_engine::LinkConfig;
use std::fs;
use std::path::Path;
use tracing::info;

/// Parses and validates a link configuration file.
///
/// Missing fields take their defaults. Prints the effective configuration.
pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking config {:?}", file);

    let config = load(file)?;

    println!("✓ Configuration is valid");
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

/// Reads and validates a link configuration.
pub fn load(file: &Path) -> Result<LinkConfig, Box<dyn std::error::Error>> {
    let config: LinkConfig = serde_json::from_str(&fs::read_to_string(file)?)?;
    config.validate()?;
    Ok(config)
}
