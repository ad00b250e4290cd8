//! Error constructors shared by file loading helpers.

use std::path::Path;
use std::sync::Arc;

use crate::ConfigError;

/// Classify a read failure for `path`.
pub(super) fn read_error(path: &Path, err: std::io::Error) -> Arc<ConfigError> {
    if err.kind() == std::io::ErrorKind::NotFound {
        ConfigError::not_found(path)
    } else {
        Arc::new(ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        })
    }
}

pub(super) fn unsupported_format(path: &Path, extension: Option<&str>) -> Arc<ConfigError> {
    Arc::new(ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: extension.unwrap_or_default().to_owned(),
    })
}
