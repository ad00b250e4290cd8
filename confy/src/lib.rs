//! Layered configuration resolution.
//!
//! `confy` merges programmatic defaults, JSON and TOML files, environment
//! variables (optionally seeded from a dotenv file) and explicit overrides
//! into a single [`ConfigTree`], addressed by dot-paths such as
//! `database.port`. Files can be nested under application namespaces, and
//! every value can be traced back to the source that set it.
//!
//! ```
//! use confy::{Config, EnvSnapshot};
//! use serde_json::json;
//!
//! let config = Config::builder()
//!     .defaults(json!({"feature_flags": {"beta_feature": false}}))
//!     .prefix("APP")
//!     .env_snapshot(EnvSnapshot::from_iter([("APP_FEATURE_FLAGS__BETA_FEATURE", "true")]))
//!     .load_dotenv_file(false)
//!     .track_provenance(true)
//!     .build()?;
//!
//! assert_eq!(config.get_as::<bool>("feature_flags.beta_feature"), Some(true));
//! let origin = config.provenance("feature_flags.beta_feature").map(|e| e.source.as_str());
//! assert_eq!(origin, Some("env:APP_*"));
//! # Ok::<(), std::sync::Arc<confy::ConfigError>>(())
//! ```

use std::sync::Arc;

mod config;
pub mod dotenv;
pub mod env;
mod error;
pub mod file;
pub mod merge;
pub mod namespace;
pub mod path;
mod provenance;
mod result_ext;
mod tree;
pub mod value;

pub use config::{Config, ConfigBuilder, LayerSource};
pub use dotenv::{DotenvLoader, DotenvOutcome, DotenvyLoader, NoDotenv};
pub use env::EnvSnapshot;
pub use error::{ConfigError, PathError};
pub use file::{FileLoader, StructuredFileLoader};
pub use provenance::{ProvenanceEntry, ProvenanceLedger};
pub use result_ext::ConfigResultExt;
pub use tree::{ConfigTree, Node};

/// Result type returned by fallible configuration operations.
pub type ConfigResult<T> = Result<T, Arc<ConfigError>>;
