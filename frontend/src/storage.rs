use gloo_storage::errors::StorageError as GlooStorageError;
use gloo_storage::{LocalStorage, Storage};
use shared::config::SETTINGS_STORAGE_KEY;
use shared::history::{HistoryBackend, HISTORY_STORAGE_KEY};
use shared::{EndpointConfig, HistoryEntry, Settings, StorageError};

/// History persisted as one JSON array in browser local storage.
#[derive(Debug, Default)]
pub struct LocalHistory;

impl HistoryBackend for LocalHistory {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        match LocalStorage::get::<Vec<HistoryEntry>>(HISTORY_STORAGE_KEY) {
            Ok(entries) => Ok(entries),
            Err(GlooStorageError::KeyNotFound(_)) => Ok(Vec::new()),
            Err(GlooStorageError::SerdeError(e)) => Err(StorageError::Serde(e)),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        LocalStorage::set(HISTORY_STORAGE_KEY, entries).map_err(|e| match e {
            GlooStorageError::SerdeError(e) => StorageError::Serde(e),
            e => StorageError::Backend(e.to_string()),
        })
    }
}

/// Stored settings, or the bundled defaults when nothing usable is stored.
pub fn load_settings(config: &EndpointConfig) -> Settings {
    match LocalStorage::get::<Settings>(SETTINGS_STORAGE_KEY) {
        Ok(settings) => match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Settings::from_config(config)
            }
        },
        Err(GlooStorageError::KeyNotFound(_)) => Settings::from_config(config),
        Err(e) => {
            log::warn!("Could not read stored settings: {}", e);
            Settings::from_config(config)
        }
    }
}

pub fn save_settings(settings: &Settings) {
    if let Err(e) = LocalStorage::set(SETTINGS_STORAGE_KEY, settings) {
        log::error!("Failed to persist settings: {}", e);
    }
}
