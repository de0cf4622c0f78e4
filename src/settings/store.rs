//! JSON-file settings store

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::Settings;

use super::bounds;

/// Stable identifier the settings record is stored under
pub const SETTINGS_KEY: &str = "interval-timer.settings.v1";

/// Settings store backed by `<dir>/<SETTINGS_KEY>.json`.
///
/// Reads come from memory. Writes update memory first and persist on a
/// background task, so a save is not guaranteed to be on disk before the
/// next read. Background writes are serialized and always persist the
/// latest in-memory value, so the file converges on the last save.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    current: Arc<Mutex<Settings>>,
    /// Held for the duration of each file write
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl SettingsStore {
    /// Open the store in `dir`, falling back to defaults on missing or bad data
    pub fn open(dir: &Path) -> Self {
        let path = Self::path_in(dir);
        let settings = match Self::load_from_path(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Using default settings: {:#}", e);
                Settings::default()
            }
        };

        Self {
            path,
            current: Arc::new(Mutex::new(bounds::clamp(&settings))),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Location of the settings file inside `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", SETTINGS_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings from a file; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> anyhow::Result<Settings> {
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    /// Write settings to a file.
    ///
    /// The contents go to a sibling temp file first and are renamed into
    /// place, so readers see either the old or the new file. Callers writing
    /// the same path concurrently must serialize.
    pub async fn write_to_path(path: &Path, settings: &Settings) -> anyhow::Result<()> {
        let contents =
            serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("failed to write settings file {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("failed to replace settings file {}", path.display()))
    }

    /// Current settings
    pub fn get(&self) -> Settings {
        match self.current.lock() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the settings and persist them in the background.
    ///
    /// Must be called from within a tokio runtime. Returns the clamped
    /// settings and the handle of the write task.
    pub fn save(&self, settings: &Settings) -> (Settings, JoinHandle<()>) {
        let clamped = bounds::clamp(settings);
        match self.current.lock() {
            Ok(mut current) => *current = clamped.clone(),
            Err(poisoned) => *poisoned.into_inner() = clamped.clone(),
        }

        let store = self.clone();
        let handle = tokio::spawn(async move {
            let _guard = store.write_lock.lock().await;
            // Whichever write runs last sees the latest save
            let latest = store.get();
            match Self::write_to_path(&store.path, &latest).await {
                Ok(()) => debug!("Settings persisted to {}", store.path.display()),
                Err(e) => error!("Failed to persist settings: {:#}", e),
            }
        });

        (clamped, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path());
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(SettingsStore::path_in(dir.path()), "{ not json").unwrap();
        assert!(SettingsStore::load_from_path(&SettingsStore::path_in(dir.path())).is_err());

        let store = SettingsStore::open(dir.path());
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn older_file_without_new_fields_loads() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            SettingsStore::path_in(dir.path()),
            r#"{"warmupSec":0,"workSec":20,"restSec":10,"intervals":8,"cooldownSec":0}"#,
        )
        .unwrap();

        let settings = SettingsStore::open(dir.path()).get();
        assert_eq!(settings.work_sec, 20);
        assert!(settings.vibration_enabled);
    }

    #[test]
    fn out_of_range_file_values_are_clamped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(SettingsStore::path_in(dir.path()), r#"{"intervals":1000}"#).unwrap();
        assert_eq!(SettingsStore::open(dir.path()).get().intervals, 99);
    }

    #[tokio::test]
    async fn save_updates_memory_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path());

        let (saved, handle) = store.save(&Settings::new(10, 20, 5, 3, 0));
        assert_eq!(store.get(), saved);
        handle.await.unwrap();

        let reopened = SettingsStore::open(dir.path());
        assert_eq!(reopened.get(), Settings::new(10, 20, 5, 3, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_leave_latest_on_disk() {
        for _ in 0..10 {
            let dir = TempDir::new().unwrap();
            let store = SettingsStore::open(dir.path());

            let saves: Vec<_> = (0..20)
                .map(|i| {
                    let store = store.clone();
                    tokio::spawn(async move { store.save(&Settings::new(i, 30, 10, 3, 0)).1 })
                })
                .collect();
            for save in saves {
                save.await.unwrap().await.unwrap();
            }

            let on_disk = SettingsStore::load_from_path(store.path()).unwrap();
            assert_eq!(on_disk, store.get());
            assert!(!dir.path().join(format!("{}.json.tmp", SETTINGS_KEY)).exists());
        }
    }
}
