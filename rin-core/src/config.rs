use serde::{Deserialize, Serialize};

/// Paths and logging, the `[system]` section of `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub library_path: String,
    pub save_path: String,
    pub log_path: String,
    pub log_level: String,
}

/// Engine playback defaults, the `[playback]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// File name of a chapter script inside its chapter directory.
    pub script_file: String,
    /// Fit mode committed to the background stack when an entry sets a
    /// background without one.
    pub default_background_mode: String,
    /// Transition effect for label visuals that name none.
    pub default_transition: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            library_path: "library/".into(),
            save_path: "saves/".into(),
            log_path: "logs/".into(),
            log_level: "info".into(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            script_file: "script.json".into(),
            default_background_mode: "cover".into(),
            default_transition: "cut".into(),
        }
    }
}

pub fn system() -> SystemConfig {
    rin_shared::config::get("system")
}

pub fn playback() -> PlaybackConfig {
    rin_shared::config::get("playback")
}
