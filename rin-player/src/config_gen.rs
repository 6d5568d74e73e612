use std::fs;
use std::path::Path;

use serde::Serialize;

use rin_core::config::{PlaybackConfig, SystemConfig};

#[derive(Serialize)]
struct FullConfig {
    system: SystemConfig,
    playback: PlaybackConfig,
}

pub fn ensure_config_exists(path: &str) {
    if Path::new(path).exists() {
        return;
    }

    println!("Creating default configuration at '{}'...", path);

    let default_config = FullConfig {
        system: SystemConfig::default(),
        playback: PlaybackConfig::default(),
    };

    let toml_str =
        toml::to_string_pretty(&default_config).expect("Failed to serialize default config");

    if let Err(e) = fs::write(path, toml_str) {
        eprintln!("Failed to write config file: {}", e);
    } else {
        println!("Config file created successfully.");
    }
}
