//! Primary error enums for the resolution pipeline and the path accessor.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or querying a configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configuration file that must exist is absent.
    #[error("configuration file not found: '{path}'")]
    FileNotFound {
        /// Path after `~` and variable expansion.
        path: PathBuf,
    },

    /// A configuration file exists but could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file holds malformed JSON or TOML.
    #[error("failed to parse configuration file '{path}': {source}")]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Diagnostic reported by the format parser.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The file extension does not select a supported format.
    #[error("unsupported configuration format '{extension}' for '{path}' (expected .json or .toml)")]
    UnsupportedFormat {
        /// Path of the rejected file.
        path: PathBuf,
        /// Lowercased extension, empty when the path has none.
        extension: String,
    },

    /// A programmatic layer (defaults, initial data, app defaults) is not a mapping.
    #[error("{layer} layer must be a mapping, found {found}")]
    InvalidLayer {
        /// Source label of the offending layer.
        layer: String,
        /// Kind of value that was supplied instead.
        found: &'static str,
    },

    /// One or more mandatory dot-paths did not resolve.
    #[error("Missing mandatory configuration keys: {}", keys.join(", "))]
    MissingMandatory {
        /// Every mandatory path that failed to resolve, in declaration order.
        keys: Vec<String>,
    },

    /// A strict path operation failed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The resolved tree could not be deserialised into the requested type.
    #[error("failed to deserialise configuration: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Failures reported by the dot-path accessor.
///
/// The higher-level [`crate::ConfigTree::get`] and
/// [`crate::ConfigTree::contains`] fold these into `None` and `false`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum PathError {
    /// A segment names a key absent from its mapping.
    #[error("key path '{path}' not found (missing part: '{segment}')")]
    KeyNotFound {
        /// Full dot-path being resolved.
        path: String,
        /// First segment that was missing.
        segment: String,
        /// Dot-path of the mapping that lacked `segment`; empty at the root.
        reached: String,
    },

    /// A segment indexes into a scalar or sequence.
    #[error("cannot access key '{segment}' on non-mapping item at path '{reached}' (full path '{path}')")]
    NotTraversable {
        /// Full dot-path being resolved.
        path: String,
        /// Segment that could not be applied.
        segment: String,
        /// Dot-path of the non-mapping node.
        reached: String,
    },
}
