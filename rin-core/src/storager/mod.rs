//! Save-slot persistence.
//!
//! Slots live under `<save_path>/<story>/save_slot_<n>.sav`, encoded
//! with bincode's serde codec. The engine itself never touches disk;
//! the driver calls in here on explicit save/load requests.

pub mod types;

use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

use crate::config::SystemConfig;
use crate::engine::ScriptEngine;
use crate::storager::types::{SaveFile, SlotInfo};

const SLOT_PREFIX: &str = "save_slot_";
const SLOT_EXT: &str = ".sav";

fn save_dir(story: &str) -> PathBuf {
    let cfg: SystemConfig = crate::config::system();
    PathBuf::from(&cfg.save_path).join(story)
}

fn slot_path(story: &str, slot: u32) -> PathBuf {
    save_dir(story).join(format!("{SLOT_PREFIX}{slot}{SLOT_EXT}"))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn save_slot(slot: u32, engine: &ScriptEngine) -> anyhow::Result<()> {
    let dir = save_dir(engine.story_title());
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    let full_path = slot_path(engine.story_title(), slot);

    let snapshot = engine.snapshot();
    let save = SaveFile {
        story_title: engine.story_title().to_string(),
        chapter: engine.chapter().to_string(),
        preview: snapshot.state.top().clone(),
        snapshot,
        timestamp: unix_now(),
    };

    let file = File::create(&full_path)
        .with_context(|| format!("Failed to create save slot {:?}", full_path))?;
    let mut writer = BufWriter::new(file);
    let config = bincode::config::standard();
    bincode::serde::encode_into_std_write(&save, &mut writer, config)?;
    log::info!("Saved slot {} at {:?}", slot, full_path);
    Ok(())
}

pub fn load_slot(story: &str, slot: u32) -> anyhow::Result<SaveFile> {
    let full_path = slot_path(story, slot);
    let file = File::open(&full_path)
        .with_context(|| format!("Failed to open save slot {:?}", full_path))?;
    let mut reader = BufReader::new(file);
    let config = bincode::config::standard();
    let save: SaveFile = bincode::serde::decode_from_std_read(&mut reader, config)?;
    Ok(save)
}

/// Lists a story's save slots, sorted by slot id. Unreadable slots are
/// logged and skipped.
pub fn list_slots(story: &str) -> Vec<SlotInfo> {
    let dir = save_dir(story);
    let Ok(entries) = fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(slot_id) = name
            .strip_prefix(SLOT_PREFIX)
            .and_then(|rest| rest.strip_suffix(SLOT_EXT))
            .and_then(|id| id.parse::<u32>().ok())
        else {
            continue;
        };

        match load_slot(story, slot_id) {
            Ok(save) => slots.push(SlotInfo {
                slot_id,
                story_title: save.story_title,
                chapter: save.chapter,
                timestamp: save.timestamp,
                preview: save.preview,
            }),
            Err(e) => log::error!("Error reading save slot {:?}: {e:#}", name),
        }
    }
    slots.sort_by_key(|s| s.slot_id);
    slots
}
