//! Reset command implementation.

use super::{open, CliError};
use soullink_protocol::SlotState;
use std::path::Path;
use tracing::info;

/// Empties the saved inventory and returns it to version 0.
///
/// Refuses to discard items unless `force` is set.
pub fn run(path: &Path, record: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!("Resetting {} in {:?}", record, path);

    let adapter = open(path, record)?;
    let current = adapter.load()?.unwrap_or_default();
    if !current.is_empty() && !force {
        return Err(CliError::Refused(format!(
            "shared inventory v{} holds {} stacks; use --force to discard them",
            current.version,
            current.slots.occupied_count()
        ))
        .into());
    }

    adapter.save_with(SlotState::empty)?;

    println!("✓ Shared inventory reset");
    println!("  Discarded: {} stacks", current.slots.occupied_count());
    println!("  Previous version: {}", current.version);

    Ok(())
}
