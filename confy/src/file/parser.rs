//! Format-specific parsing utilities for configuration files.

use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Json, Toml},
};
use serde_json::{Map, Value};

use super::error::unsupported_format;
use crate::{ConfigError, ConfigResult};

/// Supported structured formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Select a format from the case-insensitive extension of `path`.
    pub(super) fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(unsupported_format(path, other)),
        }
    }
}

/// Parse `data` read from `path` into a mapping.
///
/// Empty documents yield an empty mapping in either format.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] naming `path` when the content is malformed
/// or its top level is not a mapping.
pub(super) fn parse_config_by_format(
    path: &Path,
    format: FileFormat,
    data: &str,
) -> ConfigResult<Map<String, Value>> {
    if data.trim().is_empty() {
        return Ok(Map::new());
    }
    let figment = match format {
        FileFormat::Json => {
            // Validate first so the diagnostic carries serde_json's line and
            // column rather than figment's provider message.
            serde_json::from_str::<Map<String, Value>>(data)
                .map_err(|e| ConfigError::parse(path, e))?;
            Figment::from(Json::string(data))
        }
        FileFormat::Toml => {
            toml::from_str::<toml::Table>(data).map_err(|e| ConfigError::parse(path, e))?;
            Figment::from(Toml::string(data))
        }
    };
    figment
        .extract::<Map<String, Value>>()
        .map_err(|e| ConfigError::parse(path, e))
}
