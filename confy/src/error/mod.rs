//! Error types produced while resolving configuration.

mod constructors;
mod types;

pub use types::{ConfigError, PathError};
