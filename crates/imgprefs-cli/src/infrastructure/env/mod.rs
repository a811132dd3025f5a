//! Environment lookup and placeholder expansion.
//!
//! Path preferences may contain `$NAME` or `${NAME}` tokens (the default
//! `dataPath` is `$HOME/Desktop:$HOME/data`).  The core crate stores them
//! verbatim; this module replaces them right before the paths are used.
//!
//! Lookup goes through [`EnvSource`] so tests can supply a fixed environment
//! ([`MapEnv`]) instead of mutating the process environment.

use tracing::warn;

pub mod mock;

pub use mock::MapEnv;

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync {
    /// Returns the value of `name`, or `None` if it is unset or not UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Replaces `$NAME` and `${NAME}` tokens in `input` with values from `env`.
///
/// A name starts with an ASCII letter or `_` and continues with ASCII
/// alphanumerics or `_`.  Tokens naming unset variables are kept verbatim
/// (and logged).  A `$` that does not start a valid token is literal.
pub fn expand_placeholders(input: &str, env: &dyn EnvSource) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        // `consumed` counts bytes after the `$`, braces included.
        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) if is_var_name(&braced[..end]) => (&braced[..end], end + 2),
                _ => ("", 0),
            },
            None => {
                let len = after
                    .char_indices()
                    .take_while(|&(i, c)| {
                        c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())
                    })
                    .count();
                (&after[..len], len)
            }
        };

        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }

        match env.var(name) {
            Some(value) => out.push_str(&value),
            None => {
                warn!(variable = name, input, "environment variable not set; placeholder kept");
                out.push_str(&rest[pos..pos + 1 + consumed]);
            }
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

fn is_var_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
