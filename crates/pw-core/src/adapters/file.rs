//! Settings persisted as a JSON document on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::ports::SettingsStore;
use crate::settings::{Settings, SETTINGS_KEY};

/// Stores `{ "settings": { ... } }` at a fixed path.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self) -> Result<Option<Settings>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut document: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&bytes)?;
        match document.remove(SETTINGS_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, settings: &Settings) -> Result<(), StoreError> {
        let mut document = serde_json::Map::new();
        document.insert(SETTINGS_KEY.to_string(), serde_json::to_value(settings)?);
        let bytes = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pureweb-store-{}-{}", std::process::id(), name))
            .join("settings.json")
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_round_trip_and_layout() {
        let path = temp_path("round-trip");
        let store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        let settings = Settings {
            whitelist: vec!["example.com".to_string()],
            ..Settings::default()
        };
        store.set(&settings).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(settings));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["settings"]["whitelist"][0], "example.com");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get().await, Err(StoreError::Serialization(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
