use super::file;
use crate::core::error::{Committed, PersistError, StoreError};
use crate::core::models::Settings;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

/// The singleton settings record, with the same locking and mirroring rules
/// as a record collection.
pub struct SettingsStore {
    path: PathBuf,
    settings: RwLock<Settings>,
}

impl SettingsStore {
    /// Loads settings, seeding and writing defaults on first run.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(Settings::FILE_NAME);
        let settings = match file::load(&path)? {
            Some(settings) => {
                info!("Loaded settings");
                settings
            }
            None => {
                info!("No settings found, seeding defaults");
                let seeded = Settings::seeded();
                if let Err(e) = file::save(&path, &seeded) {
                    warn!("Could not write default settings: {e}");
                }
                seeded
            }
        };

        Ok(Self {
            path,
            settings: RwLock::new(settings),
        })
    }

    pub fn get(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, settings: Settings) -> Committed<Settings> {
        let mut current = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        *current = settings;
        let warning = self.persist(&current);
        Committed::new(current.clone(), warning)
    }

    fn persist(&self, settings: &Settings) -> Option<PersistError> {
        file::save(&self.path, settings)
            .inspect_err(|e| warn!("Keeping settings in memory only: {e}"))
            .err()
    }
}
