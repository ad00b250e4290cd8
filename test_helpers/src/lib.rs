//! Test helpers shared across the confy workspace.
//!
//! - [`env`] serialises mutation of the process environment behind RAII
//!   guards, for suites that exercise the default environment snapshot or
//!   dotenv loading.
//! - [`jail`] wraps [`figment::Jail`] so suites can create configuration
//!   files in a throwaway working directory and return `anyhow` results.

pub mod env;
pub mod jail;
