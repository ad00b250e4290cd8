//! Structured configuration file loading.
//!
//! Files are JSON or TOML, selected by extension, and must contain a
//! top-level mapping. Paths may use `~` and `$VAR` forms, which are expanded
//! before the filesystem is touched.

mod error;
mod loader;
mod parser;
mod path;

pub use loader::{FileLoader, StructuredFileLoader, load_file};
pub use path::{expand_path, expand_path_with, resolve_path};

#[cfg(test)]
mod tests;
