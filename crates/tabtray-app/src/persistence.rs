use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tabtray_core::{InMemorySettings, SettingsValues, TraySettings};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsFileError {
    #[error("filesystem error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Settings backed by a TOML file. Every write goes straight to disk; write
/// failures are logged and the in-memory value is kept.
pub struct FileSettings {
    values: InMemorySettings,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettings {
    pub fn open(path: impl AsRef<Path>, defaults: SettingsValues) -> Result<Self, SettingsFileError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| SettingsFileError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "settings file not found, using defaults");
                defaults
            }
            Err(source) => return Err(SettingsFileError::Io { path, source }),
        };

        Ok(Self {
            values: InMemorySettings::new(values),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), SettingsFileError> {
        let _guard = self.write_lock.lock();
        let encoded = toml::to_string_pretty(&self.values.values())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsFileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, encoded).map_err(|source| SettingsFileError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self) {
        if let Err(error) = self.save() {
            tracing::warn!(%error, "failed to persist settings");
        }
    }
}

macro_rules! persisted_flags {
    ($($get:ident / $set:ident),* $(,)?) => {
        $(
            fn $get(&self) -> bool {
                self.values.$get()
            }

            fn $set(&self, value: bool) {
                self.values.$set(value);
                self.persist();
            }
        )*
    };
}

impl TraySettings for FileSettings {
    persisted_flags!(
        inactive_tabs_enabled / set_inactive_tabs_enabled,
        search_term_groups_enabled / set_search_term_groups_enabled,
        close_tabs_manually / set_close_tabs_manually,
        close_tabs_after_one_day / set_close_tabs_after_one_day,
        close_tabs_after_one_week / set_close_tabs_after_one_week,
        close_tabs_after_one_month / set_close_tabs_after_one_month,
        auto_close_dialog_dismissed / set_auto_close_dialog_dismissed,
    );
}
