//! Configuration file handling.
//!
//! Settings live in `~/.mapconverter/config.ini`. A missing file means all
//! defaults; present keys overlay them.

mod file;
mod parser;
mod size;

pub use file::{
    config_directory, config_file_path, CacheSettings, ConfigFile, ConfigFileError,
    DownloadSettings, LoggingSettings, ProviderSettings, ServerSettings, DEFAULT_HOST,
    DEFAULT_LOG_DIR, DEFAULT_LOG_FILE, DEFAULT_PORT,
};
pub use size::{format_size, parse_size, SizeParseError};
