use serde::{Deserialize, Serialize};

use crate::engine::state::{Backdrop, DialogueRecord, EngineState};

/// Resumable position of one playthrough: everything but the script,
/// which is reloaded from the chapter on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySnapshot {
    pub index: usize,
    pub state: EngineState,
    pub history: Vec<DialogueRecord>,
}

/// One save slot on disk.
#[derive(Serialize, Deserialize)]
pub struct SaveFile {
    pub story_title: String,
    pub chapter: String,
    pub snapshot: PlaySnapshot,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    /// Backdrop active at save time, for the slot picker.
    pub preview: Backdrop,
}

/// Slot-picker metadata, decoded without touching the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInfo {
    pub slot_id: u32,
    pub story_title: String,
    pub chapter: String,
    pub timestamp: u64,
    pub preview: Backdrop,
}
