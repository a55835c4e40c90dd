// Configuration loading and validation (tunedeck.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tunedeck_api::client::DEFAULT_BASE_URL;
use tunedeck_api::DataSourceConfig;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to write default config: {message}")]
    DefaultsCopyError { message: String },

    #[error("cannot determine a config directory for this platform")]
    NoConfigDir,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const CONFIG_FILE_NAME: &str = "tunedeck.toml";

/// Written to disk the first time the app starts without a config file.
pub const DEFAULT_CONFIG: &str = r#"# tunedeck configuration

[server]
# Base URL of the player's web API.
url = "http://127.0.0.1:8880/"

[events]
# Reopen the update stream after this many seconds without a message.
idle_timeout_secs = 15
# Wait this long before reconnecting after a failure.
reconnect_delay_secs = 3
# "updates" streams state snapshots; "events" streams change flags and
# refetches on each notification.
mode = "updates"

[playlist]
# Number of playlist items fetched per window.
page_size = 500

[logging]
# tracing-subscriber EnvFilter directive; RUST_LOG takes precedence.
filter = "tunedeck_tui=info,tunedeck_api=info,warn"
"#;

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub events: EventsConfig,
    pub playlist: PlaylistConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventsMode {
    #[default]
    Updates,
    Events,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub idle_timeout_secs: u64,
    pub reconnect_delay_secs: u64,
    pub mode: EventsMode,
}

impl Default for EventsConfig {
    fn default() -> Self {
        EventsConfig {
            idle_timeout_secs: 15,
            reconnect_delay_secs: 3,
            mode: EventsMode::Updates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub page_size: u32,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        PlaylistConfig { page_size: 500 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "tunedeck_tui=info,tunedeck_api=info,warn".to_string(),
        }
    }
}

/// Raw deserialization target; every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerConfig,
    events: EventsConfig,
    playlist: PlaylistConfig,
    logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let file = ConfigFile::default();
        Config {
            server: file.server,
            events: file.events,
            playlist: file.playlist,
            logging: file.logging,
        }
    }
}

impl Config {
    pub fn data_source_config(&self) -> DataSourceConfig {
        DataSourceConfig {
            idle_timeout: Duration::from_secs(self.events.idle_timeout_secs),
            reconnect_delay: Duration::from_secs(self.events.reconnect_delay_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tunedeck")
}

/// `./config/tunedeck.toml` when it exists, otherwise the platform config
/// directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let local = PathBuf::from("config").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(local);
    }
    project_dirs()
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Directory holding persisted client state (`player_settings.json`).
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(ConfigError::NoConfigDir)
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Write `DEFAULT_CONFIG` to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn ensure_config_file(path: &Path) -> Result<bool, ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", parent.display()),
        })?;
    }

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", path.display()),
                }
            })?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", path.display()),
        }),
    }
}

/// Load and validate the config file at `path`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}

fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        server: file.server,
        events: file.events,
        playlist: file.playlist,
        logging: file.logging,
    };
    validate(&config)?;
    Ok(config)
}

/// Resolve the config location, create it from defaults if missing, load it.
pub fn load_config() -> Result<(Config, PathBuf), ConfigError> {
    let path = config_path()?;
    ensure_config_file(&path)?;
    let config = load_config_from(&path)?;
    Ok((config, path))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    match reqwest::Url::parse(&config.server.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => {
            return Err(ConfigError::ValidationError {
                field: "server.url".into(),
                message: format!("scheme must be http or https, got `{}`", url.scheme()),
            });
        }
        Err(e) => {
            return Err(ConfigError::ValidationError {
                field: "server.url".into(),
                message: e.to_string(),
            });
        }
    }

    let durations: &[(&str, u64)] = &[
        ("events.idle_timeout_secs", config.events.idle_timeout_secs),
        ("events.reconnect_delay_secs", config.events.reconnect_delay_secs),
    ];
    for (name, val) in durations {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let page_size = config.playlist.page_size;
    if !(1..=tunedeck_api::range::DEFAULT_COUNT).contains(&page_size) {
        return Err(ConfigError::ValidationError {
            field: "playlist.page_size".into(),
            message: format!(
                "must be between 1 and {}, got {page_size}",
                tunedeck_api::range::DEFAULT_COUNT
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
