//! Inspect command implementation.

use super::{open, CliError};
use serde::Serialize;
use soullink_protocol::{SavedInventory, ARMOR_START, MAIN_START, OFFHAND_SLOT};
use soullink_storage::RecordStore;
use std::path::Path;

/// Saved inventory inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Save directory.
    pub path: String,
    /// Record name.
    pub record: String,
    /// Record size in bytes.
    pub size: usize,
    /// Record format revision.
    pub format: u16,
    /// Saved version counter.
    pub version: u64,
    /// Whether the inventory had been seeded.
    pub initialized: bool,
    /// Occupied slots, in slot order.
    pub slots: Vec<SlotLine>,
}

/// One occupied slot.
#[derive(Debug, Serialize)]
pub struct SlotLine {
    /// Slot index.
    pub slot: u32,
    /// Inventory section the slot belongs to.
    pub section: &'static str,
    /// Item identifier.
    pub item: String,
    /// Stack size.
    pub count: u32,
    /// Whether the stack carries extra data.
    pub tagged: bool,
}

/// Runs the inspect command.
pub fn run(path: &Path, record: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = collect(path, record)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Reads and summarizes the record.
pub fn collect(path: &Path, record: &str) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let adapter = open(path, record)?;
    let bytes = adapter
        .store()
        .read(record)?
        .ok_or_else(|| CliError::MissingRecord {
            record: record.to_string(),
            path: path.to_path_buf(),
        })?;
    let saved = SavedInventory::decode(&bytes)?;

    let mut slots: Vec<SlotLine> = saved
        .slots
        .iter()
        .map(|entry| SlotLine {
            slot: entry.slot,
            section: section(entry.slot as usize),
            item: entry.item.item.clone(),
            count: entry.item.count,
            tagged: entry.item.tag.is_some(),
        })
        .collect();
    slots.sort_by_key(|line| line.slot);

    Ok(InspectResult {
        path: path.display().to_string(),
        record: record.to_string(),
        size: bytes.len(),
        format: saved.format,
        version: saved.version,
        initialized: saved.initialized,
        slots,
    })
}

fn section(slot: usize) -> &'static str {
    match slot {
        s if s < MAIN_START => "hotbar",
        s if s < ARMOR_START => "main",
        s if s < OFFHAND_SLOT => "armor",
        OFFHAND_SLOT => "offhand",
        _ => "out of range",
    }
}

fn print_text_output(result: &InspectResult) {
    println!("Shared Inventory");
    println!("================");
    println!("Path:        {}", result.path);
    println!("Record:      {} ({} bytes)", result.record, result.size);
    println!("Format:      {}", result.format);
    println!("Version:     {}", result.version);
    println!("Initialized: {}", result.initialized);
    println!("Occupied:    {}", result.slots.len());

    if !result.slots.is_empty() {
        println!();
        println!("  {:>4}  {:<8}  {:>5}  Item", "Slot", "Section", "Count");
        for line in &result.slots {
            let marker = if line.tagged { " *" } else { "" };
            println!(
                "  {:>4}  {:<8}  {:>5}  {}{}",
                line.slot, line.section, line.count, line.item, marker
            );
        }
    }
}
