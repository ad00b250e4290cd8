//! Extensions for mapping errors to `ConfigResult` concisely.
//!
//! Use [`ConfigResultExt::into_config`] for error types that implement
//! `Into<ConfigError>` (for example `serde_json::Error`).
//!
//! ```
//! use confy::{ConfigResult, ConfigResultExt};
//!
//! fn serialise() -> ConfigResult<serde_json::Value> {
//!     serde_json::to_value(&42).into_config()
//! }
//! # assert!(serialise().is_ok());
//! ```

use std::sync::Arc;

use crate::{ConfigError, ConfigResult};

/// Generic extension for mapping any `Result<T, E>` with
/// `E: Into<ConfigError>` into a `ConfigResult<T>`.
pub trait ConfigResultExt<T, E> {
    /// Convert `Result<T, E>` into `ConfigResult<T>` using `Into<ConfigError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<ConfigError>`.
    fn into_config(self) -> ConfigResult<T>;
}

impl<T, E> ConfigResultExt<T, E> for Result<T, E>
where
    E: Into<ConfigError>,
{
    fn into_config(self) -> ConfigResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}
