//! Home and environment variable expansion for configuration paths.

use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};

use crate::{ConfigError, ConfigResult};

/// Expand `~` and `$VAR`/`${VAR}` in `raw` using the process environment.
///
/// Unknown variables are left as written.
#[must_use]
pub fn expand_path(raw: &str) -> Utf8PathBuf {
    expand_path_with(raw, |name| std::env::var(name).ok())
}

/// Expand `~` and variables in `raw`, resolving variables with `lookup`.
///
/// ```
/// use confy::file::expand_path_with;
///
/// let lookup = |name: &str| (name == "CONF").then(|| "/etc/app".to_owned());
/// assert_eq!(expand_path_with("$CONF/app.toml", lookup), "/etc/app/app.toml");
/// assert_eq!(expand_path_with("${CONF}.d/x.json", lookup), "/etc/app.d/x.json");
/// assert_eq!(expand_path_with("$MISSING/x.json", lookup), "$MISSING/x.json");
/// ```
#[must_use]
pub fn expand_path_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> Utf8PathBuf {
    Utf8PathBuf::from(expand_vars(&expand_home(raw), &lookup))
}

fn expand_home(raw: &str) -> String {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return raw.to_owned(),
    };
    match dirs::home_dir().and_then(|home| home.to_str().map(str::to_owned)) {
        Some(home) => format!("{home}{rest}"),
        None => raw.to_owned(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);
        let (token, name, remaining) = split_variable(tail);
        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => out.push_str(&value),
            None => out.push_str(token),
        }
        rest = remaining;
    }
    out.push_str(rest);
    out
}

/// Split `tail`, which starts with `$`, into the variable token, the
/// variable name and the text that follows.
fn split_variable(tail: &str) -> (&str, &str, &str) {
    let after = tail.get(1..).unwrap_or_default();
    if let Some((name, _)) = after.strip_prefix('{').and_then(|braced| braced.split_once('}')) {
        let (token, remaining) = tail.split_at(name.len() + 3);
        return (token, name, remaining);
    }
    let len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
    let (token, remaining) = tail.split_at(len + 1);
    (token, after.get(..len).unwrap_or_default(), remaining)
}

/// Expand `raw` and make it absolute, resolving symlinks when the target
/// exists.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the working directory cannot be
/// determined or canonicalisation fails.
pub fn resolve_path(raw: &str) -> ConfigResult<Utf8PathBuf> {
    let expanded = expand_path(raw);
    let std_path = expanded.as_std_path();
    let resolved = if std_path.exists() {
        std::fs::canonicalize(std_path)
    } else {
        std::path::absolute(std_path)
    }
    .map_err(|source| {
        std::sync::Arc::new(ConfigError::Io {
            path: std_path.to_path_buf(),
            source,
        })
    })?;
    Ok(to_utf8_path(&resolved))
}

/// Convert `path` to UTF-8, falling back to lossy conversion.
fn to_utf8_path(path: &Path) -> Utf8PathBuf {
    Utf8Path::from_path(path).map_or_else(
        || Utf8PathBuf::from(path.to_string_lossy().into_owned()),
        Utf8Path::to_path_buf,
    )
}
