//! Loading entrypoints for configuration files.

use camino::Utf8Path;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::read_error;
use super::parser::{FileFormat, parse_config_by_format};
use super::path::expand_path;
use crate::ConfigResult;

/// Reads one configuration file into a plain mapping.
///
/// Implementations receive paths that have already been expanded.
pub trait FileLoader {
    /// Load the mapping stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::FileNotFound`] when `path` does not
    /// exist, [`crate::ConfigError::UnsupportedFormat`] for unknown
    /// extensions and [`crate::ConfigError::Parse`] for malformed content.
    fn load(&self, path: &Utf8Path) -> ConfigResult<Map<String, Value>>;
}

/// Loads `.json` and `.toml` files from the filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredFileLoader;

impl FileLoader for StructuredFileLoader {
    fn load(&self, path: &Utf8Path) -> ConfigResult<Map<String, Value>> {
        let std_path = path.as_std_path();
        let format = FileFormat::from_path(std_path)?;
        let data = std::fs::read_to_string(std_path).map_err(|e| read_error(std_path, e))?;
        let map = parse_config_by_format(std_path, format, &data)?;
        debug!(path = %path, keys = map.len(), "loaded configuration file");
        Ok(map)
    }
}

/// Expand `raw` and load it with [`StructuredFileLoader`].
///
/// # Errors
///
/// Propagates every [`FileLoader::load`] failure.
///
/// # Examples
///
/// ```rust,no_run
/// # fn run() -> confy::ConfigResult<()> {
/// let data = confy::file::load_file("~/.config/app/config.toml")?;
/// assert!(data.contains_key("database"));
/// # Ok(())
/// # }
/// ```
pub fn load_file(raw: &str) -> ConfigResult<Map<String, Value>> {
    StructuredFileLoader.load(&expand_path(raw))
}
