//! Builder collecting every input of a resolution pass.

use std::fmt;

use camino::Utf8PathBuf;
use serde_json::Value;

use super::Config;
use super::pipeline;
use crate::ConfigResult;
use crate::dotenv::{DotenvLoader, DotenvyLoader};
use crate::env::EnvSnapshot;
use crate::file::{FileLoader, StructuredFileLoader};

/// One configured file, optionally nested under a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FileEntry {
    pub(crate) path: String,
    pub(crate) namespace: Option<String>,
    pub(crate) primary: bool,
}

/// Collects sources and options, then resolves them with
/// [`ConfigBuilder::build`].
///
/// Precedence, lowest first: defaults, app defaults, initial data, files in
/// order (the primary file first), environment variables for the global
/// prefix, per-application environment variables, overrides.
///
/// # Examples
///
/// ```
/// use confy::{Config, EnvSnapshot};
/// use serde_json::json;
///
/// let config = Config::builder()
///     .defaults(json!({"db": {"host": "localhost", "port": 5432}}))
///     .prefix("APP")
///     .env_snapshot(EnvSnapshot::from_iter([("APP_DB_PORT", "6000")]))
///     .load_dotenv_file(false)
///     .override_value("db.host", json!("db.internal"))
///     .build()?;
///
/// assert_eq!(config.get_as::<u16>("db.port"), Some(6000));
/// assert_eq!(config.get_as::<String>("db.host").as_deref(), Some("db.internal"));
/// # Ok::<(), std::sync::Arc<confy::ConfigError>>(())
/// ```
pub struct ConfigBuilder {
    pub(crate) defaults: Option<Value>,
    pub(crate) initial: Vec<Value>,
    pub(crate) files: Vec<FileEntry>,
    pub(crate) app_defaults: Vec<(String, Value)>,
    pub(crate) prefix: Option<String>,
    pub(crate) app_prefixes: Vec<(String, String)>,
    pub(crate) overrides: Vec<(String, Value)>,
    pub(crate) mandatory: Vec<String>,
    pub(crate) track_provenance: bool,
    pub(crate) load_dotenv_file: bool,
    pub(crate) dotenv_path: Option<Utf8PathBuf>,
    pub(crate) file_loader: Box<dyn FileLoader>,
    pub(crate) dotenv_loader: Box<dyn DotenvLoader>,
    pub(crate) env_snapshot: Option<EnvSnapshot>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            defaults: None,
            initial: Vec::new(),
            files: Vec::new(),
            app_defaults: Vec::new(),
            prefix: None,
            app_prefixes: Vec::new(),
            overrides: Vec::new(),
            mandatory: Vec::new(),
            track_provenance: false,
            load_dotenv_file: true,
            dotenv_path: None,
            file_loader: Box::new(StructuredFileLoader),
            dotenv_loader: Box::new(DotenvyLoader),
            env_snapshot: None,
        }
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("defaults", &self.defaults)
            .field("initial", &self.initial)
            .field("files", &self.files)
            .field("app_defaults", &self.app_defaults)
            .field("prefix", &self.prefix)
            .field("app_prefixes", &self.app_prefixes)
            .field("overrides", &self.overrides)
            .field("mandatory", &self.mandatory)
            .field("track_provenance", &self.track_provenance)
            .field("load_dotenv_file", &self.load_dotenv_file)
            .field("dotenv_path", &self.dotenv_path)
            .finish_non_exhaustive()
    }
}

fn upsert<V>(entries: &mut Vec<(String, V)>, key: String, value: V) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

impl ConfigBuilder {
    /// Create a builder with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Programmatic defaults; must be a mapping.
    #[must_use]
    pub fn defaults(mut self, defaults: Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Initial data merged above all defaults; must be a mapping.
    ///
    /// May be called repeatedly; later data wins.
    #[must_use]
    pub fn initial(mut self, data: Value) -> Self {
        self.initial.push(data);
        self
    }

    /// The primary configuration file. It must exist and is merged before
    /// any other file.
    #[must_use]
    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.files.retain(|entry| !entry.primary);
        self.files.insert(
            0,
            FileEntry {
                path: path.into(),
                namespace: None,
                primary: true,
            },
        );
        self
    }

    /// Additional files merged in order. Missing ones are skipped.
    #[must_use]
    pub fn file_paths<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().fold(self, Self::add_file)
    }

    /// Append one additional file.
    #[must_use]
    pub fn add_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(FileEntry {
            path: path.into(),
            namespace: None,
            primary: false,
        });
        self
    }

    /// Append one additional file whose content belongs to `namespace`.
    #[must_use]
    pub fn add_namespaced_file(mut self, path: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.files.push(FileEntry {
            path: path.into(),
            namespace: Some(namespace.into()),
            primary: false,
        });
        self
    }

    /// Defaults for the application `namespace`; must be a mapping.
    #[must_use]
    pub fn app_defaults(mut self, namespace: impl Into<String>, defaults: Value) -> Self {
        upsert(&mut self.app_defaults, namespace.into(), defaults);
        self
    }

    /// Prefix selecting environment variables for the whole tree.
    ///
    /// The empty string selects every variable except well-known system
    /// ones.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Prefix selecting environment variables routed into `namespace`.
    #[must_use]
    pub fn app_prefix(mut self, namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
        upsert(&mut self.app_prefixes, namespace.into(), prefix.into());
        self
    }

    /// Override the value at a dot-path. Strings are coerced like
    /// environment values.
    #[must_use]
    pub fn override_value(mut self, path: impl Into<String>, value: Value) -> Self {
        upsert(&mut self.overrides, path.into(), value);
        self
    }

    /// Override several dot-paths.
    #[must_use]
    pub fn overrides<I, K>(self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        overrides
            .into_iter()
            .fold(self, |builder, (path, value)| builder.override_value(path, value))
    }

    /// Dot-paths that must resolve in the final tree.
    #[must_use]
    pub fn mandatory<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Record which source produced each value.
    #[must_use]
    pub const fn track_provenance(mut self, enabled: bool) -> Self {
        self.track_provenance = enabled;
        self
    }

    /// Whether to load a dotenv file before reading the environment.
    /// Enabled by default.
    #[must_use]
    pub const fn load_dotenv_file(mut self, enabled: bool) -> Self {
        self.load_dotenv_file = enabled;
        self
    }

    /// Explicit dotenv file instead of searching for `.env`.
    #[must_use]
    pub fn dotenv_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.dotenv_path = Some(path.into());
        self
    }

    /// Replace the file loader.
    #[must_use]
    pub fn file_loader(mut self, loader: impl FileLoader + 'static) -> Self {
        self.file_loader = Box::new(loader);
        self
    }

    /// Replace the dotenv loader.
    #[must_use]
    pub fn dotenv_loader(mut self, loader: impl DotenvLoader + 'static) -> Self {
        self.dotenv_loader = Box::new(loader);
        self
    }

    /// Read environment variables from `snapshot` instead of the process.
    ///
    /// Entries of a loaded dotenv file are added to the snapshot without
    /// replacing existing ones.
    #[must_use]
    pub fn env_snapshot(mut self, snapshot: EnvSnapshot) -> Self {
        self.env_snapshot = Some(snapshot);
        self
    }

    /// Resolve every source into a [`Config`].
    ///
    /// # Errors
    ///
    /// Fails when the primary file is missing, any file is malformed or of
    /// an unsupported format, a programmatic layer is not a mapping, or
    /// mandatory keys are missing.
    pub fn build(self) -> ConfigResult<Config> {
        pipeline::resolve(self)
    }
}
