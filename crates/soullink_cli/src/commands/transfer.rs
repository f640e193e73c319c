//! Export and import commands.
//!
//! The exchange format is the persisted record layout rendered as JSON, so an
//! exported file can be edited by hand and imported back.

use super::open;
use soullink_protocol::SavedInventory;
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes the saved inventory to `out` as JSON.
pub fn export(path: &Path, record: &str, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Exporting {} from {:?}", record, path);

    let adapter = open(path, record)?;
    let state = adapter.load()?.unwrap_or_default();
    let saved = SavedInventory::from_state(&state);
    fs::write(out, serde_json::to_string_pretty(&saved)?)?;

    println!("✓ Exported shared inventory");
    println!("  Path: {:?}", out);
    println!("  Version: {}", saved.version);
    println!("  Stacks: {}", saved.slots.len());

    Ok(())
}

/// Replaces the saved inventory with the JSON in `input`.
pub fn import(path: &Path, record: &str, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing {} into {:?}", record, path);

    let saved: SavedInventory = serde_json::from_str(&fs::read_to_string(input)?)?;
    let state = saved.into_state();

    let adapter = open(path, record)?;
    let version = state.version;
    let stacks = state.slots.occupied_count();
    adapter.save_with(|| state)?;

    println!("✓ Imported shared inventory");
    println!("  Version: {}", version);
    println!("  Stacks: {}", stacks);

    Ok(())
}
