//! Best-effort dotenv loading.
//!
//! A dotenv file populates the process environment without replacing
//! variables that are already set. Its absence is never an error.

use std::path::PathBuf;

use camino::Utf8Path;
use tracing::{debug, warn};

/// The file a [`DotenvLoader`] used and the entries it contained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DotenvOutcome {
    /// Path of the dotenv file that was read.
    pub path: PathBuf,
    /// `(name, value)` pairs in file order.
    pub entries: Vec<(String, String)>,
}

/// Populates the environment from a dotenv file.
pub trait DotenvLoader {
    /// Load `path`, or discover a `.env` file when `path` is `None`.
    ///
    /// Returns `None` when no file was loaded.
    fn load(&self, path: Option<&Utf8Path>) -> Option<DotenvOutcome>;
}

/// [`DotenvLoader`] backed by `dotenvy`.
///
/// Without an explicit path, `.env` is searched for from the working
/// directory upwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct DotenvyLoader;

impl DotenvLoader for DotenvyLoader {
    fn load(&self, path: Option<&Utf8Path>) -> Option<DotenvOutcome> {
        let loaded = match path {
            Some(explicit) => dotenvy::from_path(explicit).map(|()| explicit.as_std_path().to_path_buf()),
            None => dotenvy::dotenv(),
        };
        let file = match loaded {
            Ok(file) => file,
            Err(err) if err.not_found() => {
                debug!(path = ?path, "no dotenv file found");
                return None;
            }
            Err(err) => {
                warn!(path = ?path, %err, "failed to load dotenv file");
                return None;
            }
        };
        let entries = match dotenvy::from_path_iter(&file) {
            Ok(iter) => iter.filter_map(Result::ok).collect(),
            Err(err) => {
                warn!(path = %file.display(), %err, "failed to read dotenv entries");
                Vec::new()
            }
        };
        debug!(path = %file.display(), entries = entries.len(), "loaded dotenv file");
        Some(DotenvOutcome {
            path: file,
            entries,
        })
    }
}

/// [`DotenvLoader`] that never loads anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDotenv;

impl DotenvLoader for NoDotenv {
    fn load(&self, _path: Option<&Utf8Path>) -> Option<DotenvOutcome> {
        None
    }
}
