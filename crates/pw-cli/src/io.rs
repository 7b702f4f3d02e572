use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use pw_core::{InstalledRule, Settings};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let bytes = fs::read(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))
}

/// Settings from a file holding either the bare record or `{ "settings": ... }`.
/// Defaults when no path is given.
pub fn read_settings(path: Option<&Path>) -> Result<Settings, String> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let value: serde_json::Value = read_json(path)?;
    let record = match value.get(pw_core::SETTINGS_KEY) {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    serde_json::from_value(record)
        .map_err(|e| format!("Invalid settings in '{}': {}", path.display(), e))
}

/// Installed dynamic rule table. Rules of any shape are accepted.
pub fn read_rules(path: Option<&Path>) -> Result<Vec<InstalledRule>, String> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Vec::new()),
    }
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization failed: {}", e))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    fs::write(path, to_pretty_json(value)?)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

pub fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))
}
