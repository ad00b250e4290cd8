//! Constructors and classification helpers for configuration errors.

use std::path::Path;
use std::sync::Arc;

use super::{ConfigError, PathError};

impl ConfigError {
    /// Build a [`ConfigError::Parse`] naming `path`.
    #[must_use]
    pub fn parse(path: &Path, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Arc<Self> {
        Arc::new(Self::Parse {
            path: path.to_path_buf(),
            source: source.into(),
        })
    }

    /// Build a [`ConfigError::FileNotFound`] for `path`.
    #[must_use]
    pub fn not_found(path: &Path) -> Arc<Self> {
        Arc::new(Self::FileNotFound {
            path: path.to_path_buf(),
        })
    }

    /// Returns `true` when the error reports a missing configuration file.
    ///
    /// The pipeline uses this to skip absent entries of a multi-file list
    /// while still failing on malformed ones.
    ///
    /// ```
    /// use confy::ConfigError;
    /// use std::path::Path;
    ///
    /// assert!(ConfigError::not_found(Path::new("absent.toml")).is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Missing mandatory keys carried by [`ConfigError::MissingMandatory`].
    #[must_use]
    pub fn missing_keys(&self) -> &[String] {
        match self {
            Self::MissingMandatory { keys } => keys,
            _ => &[],
        }
    }
}

impl PathError {
    pub(crate) fn key_not_found(path: &str, segment: &str, reached: &[&str]) -> Self {
        Self::KeyNotFound {
            path: path.to_owned(),
            segment: segment.to_owned(),
            reached: reached.join("."),
        }
    }

    pub(crate) fn not_traversable(path: &str, segment: &str, reached: &[&str]) -> Self {
        Self::NotTraversable {
            path: path.to_owned(),
            segment: segment.to_owned(),
            reached: reached.join("."),
        }
    }

    /// The segment at which resolution stopped.
    #[must_use]
    pub fn segment(&self) -> &str {
        match self {
            Self::KeyNotFound { segment, .. } | Self::NotTraversable { segment, .. } => segment,
        }
    }
}
