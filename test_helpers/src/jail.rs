//! Helpers for running configuration scenarios inside a `figment::Jail`.
//!
//! A jail switches the working directory to a fresh temporary directory and
//! restores both the directory and any environment variables it set when the
//! closure returns. Configuration files written with [`write_file`] land in
//! that directory, so relative paths and `.env` discovery resolve there.

use std::path::PathBuf;

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// # Errors
///
/// Returns an error if the jail cannot be initialised or the closure returns
/// a [`figment::Error`].
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Writes `contents` to `name` inside the jail and returns its absolute path.
///
/// # Errors
///
/// Returns a [`figment::Error`] when the file cannot be created.
pub fn write_file(jail: &mut figment::Jail, name: &str, contents: &str) -> figment::error::Result<PathBuf> {
    jail.create_file(name, contents)?;
    Ok(jail.directory().join(name))
}

/// Converts any displayable error into a [`figment::Error`].
///
/// Lets jail closures use `?` on `confy` and `anyhow` results.
#[expect(
    clippy::needless_pass_by_value,
    reason = "callers own the error and map_err passes it by value"
)]
pub fn jail_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
