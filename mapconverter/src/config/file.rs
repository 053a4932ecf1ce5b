//! Configuration settings, file location, and loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::cache::{DEFAULT_DISK_CACHE_DIR, DEFAULT_MEMORY_CACHE_BYTES};
use crate::provider::{MapType, SourceCatalog, DEFAULT_TIMEOUT};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "mapconverter.log";

/// Errors that can occur loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root of the persistent tile tier
    pub directory: PathBuf,
    /// Byte budget of the memory tier
    pub memory_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Per-request network timeout in seconds
    pub timeout: u64,
}

/// URL template overrides; anything absent uses the built-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub base: BTreeMap<MapType, String>,
    pub overlay: Option<String>,
}

impl ProviderSettings {
    /// The built-in catalog with overrides applied.
    pub fn catalog(&self) -> SourceCatalog {
        let catalog = self
            .base
            .iter()
            .fold(SourceCatalog::new(), |catalog, (map_type, template)| {
                catalog.with_base_template(*map_type, template.clone())
            });
        match &self.overlay {
            Some(template) => catalog.with_overlay_template(template.clone()),
            None => catalog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub providers: ProviderSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            cache: CacheSettings {
                directory: PathBuf::from(DEFAULT_DISK_CACHE_DIR),
                memory_size: DEFAULT_MEMORY_CACHE_BYTES,
            },
            download: DownloadSettings {
                timeout: DEFAULT_TIMEOUT.as_secs(),
            },
            providers: ProviderSettings::default(),
            logging: LoggingSettings {
                directory: PathBuf::from(DEFAULT_LOG_DIR),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.mapconverter/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.mapconverter).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mapconverter")
}

/// Get the path to the config file (~/.mapconverter/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
