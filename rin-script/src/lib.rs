//! Data model for Rin's JSON visual-novel scripts.
//!
//! A chapter is a flat array of [`ScriptEntry`] values loaded from a
//! `script.json` file. The engine walks that array with a cursor; this
//! crate only defines the entry schema and the jump-target grammar, it
//! performs no interpretation.

pub mod entry;
pub mod target;

pub use entry::{AutoDialogue, ChoiceOption, Presentation, ScriptEntry, SetVariable};
pub use target::{JumpCommand, JumpTarget};

/// Parses a whole script array from JSON source.
///
/// Unknown optional fields are tolerated; a malformed document is a load
/// error surfaced to the caller, the engine is never handed a broken
/// script.
pub fn parse_script(src: &str) -> serde_json::Result<Vec<ScriptEntry>> {
    serde_json::from_str(src)
}
