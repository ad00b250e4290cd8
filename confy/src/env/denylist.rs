//! Fixed table of system and shell variables ignored by unprefixed
//! collection.

use uncased::UncasedStr;

const DENIED: &[&str] = &[
    "_",
    "COLORTERM",
    "DBUS_SESSION_BUS_ADDRESS",
    "DISPLAY",
    "EDITOR",
    "HISTFILE",
    "HISTSIZE",
    "HOME",
    "HOSTNAME",
    "LANG",
    "LANGUAGE",
    "LOGNAME",
    "LS_COLORS",
    "MAIL",
    "OLDPWD",
    "PAGER",
    "PATH",
    "PS1",
    "PWD",
    "SHELL",
    "SHLVL",
    "TERM",
    "TMPDIR",
    "TZ",
    "USER",
    "VISUAL",
    "XDG_RUNTIME_DIR",
];

const DENIED_PREFIXES: &[&str] = &["LC_", "SSH_", "TERM_PROGRAM", "XDG_SESSION_"];

/// Returns `true` when `name` is a well-known system variable.
pub(super) fn is_denied(name: &str) -> bool {
    let candidate = UncasedStr::new(name);
    DENIED.iter().any(|denied| candidate == UncasedStr::new(denied))
        || DENIED_PREFIXES.iter().any(|prefix| {
            name.get(..prefix.len())
                .is_some_and(|head| UncasedStr::new(head) == UncasedStr::new(prefix))
        })
}
