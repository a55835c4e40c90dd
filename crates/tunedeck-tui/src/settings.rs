// Persisted client settings (player_settings.json).
//
// The file holds a flat JSON object keyed by versioned setting names. Keys
// this version does not know about are kept as-is on save, so older and
// newer builds can share one file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub const STORAGE_NAME: &str = "player_settings";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Setting definitions
// ---------------------------------------------------------------------------

/// A named setting plus its storage version. Bumping the version abandons
/// values stored under the previous key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingKey {
    pub name: &'static str,
    pub version: u32,
}

impl SettingKey {
    pub const fn new(name: &'static str, version: u32) -> Self {
        SettingKey { name, version }
    }

    pub fn storage_key(&self) -> String {
        if self.version == 0 {
            self.name.to_string()
        } else {
            format!("{}_v{}", self.name, self.version)
        }
    }
}

pub const CURSOR_FOLLOWS_PLAYBACK: SettingKey = SettingKey::new("cursorFollowsPlayback", 0);
pub const PLAYLIST_COLUMNS: SettingKey = SettingKey::new("playlistColumns", 1);
pub const VOLUME_STEP: SettingKey = SettingKey::new("volumeStep", 0);
pub const SHOW_PLAYBACK_INFO: SettingKey = SettingKey::new("showPlaybackInfo", 0);
pub const WINDOW_TITLE: SettingKey = SettingKey::new("windowTitle", 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub cursor_follows_playback: bool,
    pub playlist_columns: Vec<String>,
    pub volume_step: f64,
    pub show_playback_info: bool,
    pub window_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cursor_follows_playback: true,
            playlist_columns: vec![
                "%artist%".to_string(),
                "%title%".to_string(),
                "%length%".to_string(),
            ],
            volume_step: 2.0,
            show_playback_info: true,
            window_title: "%artist% - %title%".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Open `<dir>/player_settings.json`. A missing file is an empty store;
    /// a corrupt one is logged and treated as empty.
    pub fn open(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(format!("{STORAGE_NAME}.json"));
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(values) => values,
                Err(e) => {
                    warn!("{}", SettingsError::Parse { path: path.clone(), source: e });
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings file at {}, using defaults", path.display());
                Map::new()
            }
            Err(e) => return Err(SettingsError::Io { path, source: e }),
        };
        Ok(SettingsStore { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored value for `key`, or `None` when missing or of the wrong type.
    pub fn get<T: DeserializeOwned>(&self, key: SettingKey) -> Option<T> {
        let storage_key = key.storage_key();
        let value = self.values.get(&storage_key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("ignoring setting `{}`: {}", storage_key, e);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: SettingKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.values.insert(key.storage_key(), v);
            }
            Err(e) => warn!("cannot store setting `{}`: {}", key.name, e),
        }
    }

    pub fn load(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            cursor_follows_playback: self
                .get(CURSOR_FOLLOWS_PLAYBACK)
                .unwrap_or(defaults.cursor_follows_playback),
            playlist_columns: self
                .get(PLAYLIST_COLUMNS)
                .unwrap_or(defaults.playlist_columns),
            volume_step: self
                .get::<f64>(VOLUME_STEP)
                .filter(|step| *step > 0.0)
                .unwrap_or(defaults.volume_step),
            show_playback_info: self
                .get(SHOW_PLAYBACK_INFO)
                .unwrap_or(defaults.show_playback_info),
            window_title: self.get(WINDOW_TITLE).unwrap_or(defaults.window_title),
        }
    }

    /// Write `settings` into the store and flush it to disk.
    pub fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.set(CURSOR_FOLLOWS_PLAYBACK, &settings.cursor_follows_playback);
        self.set(PLAYLIST_COLUMNS, &settings.playlist_columns);
        self.set(VOLUME_STEP, &settings.volume_step);
        self.set(SHOW_PLAYBACK_INFO, &settings.show_playback_info);
        self.set(WINDOW_TITLE, &settings.window_title);
        self.flush()
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(&self.values).map_err(|e| SettingsError::Parse {
            path: self.path.clone(),
            source: e,
        })?;

        // Write to a sibling file and rename so a crash never leaves a
        // truncated settings file behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!("settings saved to {}", self.path.display());
        Ok(())
    }
}
