//! INI parsing: the single place where key names map to settings fields.

use std::path::PathBuf;

use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};
use super::size::parse_size;
use crate::provider::MapType;

const TEMPLATE_PLACEHOLDERS: [&str; 3] = ["{z}", "{x}", "{y}"];

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Start from `ConfigFile::default()` and overlay any values in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server]
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = non_empty(section, "host") {
            config.server.host = v.to_string();
        }
        if let Some(v) = non_empty(section, "port") {
            config.server.port = v
                .parse()
                .map_err(|_| invalid("server", "port", v, "must be a port number (0-65535)"))?;
        }
    }

    // [cache]
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section, "directory") {
            config.cache.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "memory_size") {
            config.cache.memory_size = parse_size(v).map_err(|_| {
                invalid(
                    "cache",
                    "memory_size",
                    v,
                    "expected format like '512MB', '2GB', or '1024KB'",
                )
            })?;
        }
    }

    // [download]
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = non_empty(section, "timeout") {
            config.download.timeout = match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "download",
                        "timeout",
                        v,
                        "must be a positive number of seconds",
                    ))
                }
            };
        }
    }

    // [providers]
    if let Some(section) = ini.section(Some("providers")) {
        for (key, value) in section.iter() {
            let template = value.trim();
            if template.is_empty() {
                continue;
            }
            if !TEMPLATE_PLACEHOLDERS.iter().all(|p| template.contains(p)) {
                return Err(invalid(
                    "providers",
                    key,
                    template,
                    "template must contain {z}, {x} and {y}",
                ));
            }
            if key == "overlay" {
                config.providers.overlay = Some(template.to_string());
                continue;
            }
            let map_type = key
                .parse::<i64>()
                .ok()
                .and_then(|id| MapType::ALL.iter().copied().find(|m| m.id() as i64 == id))
                .ok_or_else(|| {
                    invalid(
                        "providers",
                        key,
                        template,
                        "key must be a map type id (1-10) or 'overlay'",
                    )
                })?;
            config.providers.base.insert(map_type, template.to_string());
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
