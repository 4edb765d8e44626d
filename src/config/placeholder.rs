//! Placeholder substitution for configured values.
//!
//! Placeholders take the form `{name}`. Names are looked up in the values
//! registered on the [`Replacer`]; names starting with `env.` additionally
//! fall back to the process environment when environment lookups are enabled.
//! `\{` and `\}` produce literal braces, and an opening brace without a
//! matching close is kept verbatim.

use std::{collections::HashMap, env};

use thiserror::Error;

/// Prefix for placeholders resolved from the process environment.
pub const ENV_PREFIX: &str = "env.";

/// Reasons a placeholder could not be substituted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// No value is known for the placeholder.
    #[error("unrecognized placeholder {{{0}}}")]
    Unknown(String),
    /// The placeholder resolved to an empty string.
    #[error("placeholder {{{0}}} resolved to an empty value")]
    Empty(String),
}

/// Substitution context used while provisioning writers.
#[derive(Clone, Debug)]
pub struct Replacer {
    values: HashMap<String, String>,
    use_env: bool,
}

impl Default for Replacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Replacer {
    /// Create a replacer that resolves `{env.*}` from the process environment.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            use_env: true,
        }
    }

    /// Create a replacer that only knows explicitly registered values.
    pub fn isolated() -> Self {
        Self {
            values: HashMap::new(),
            use_env: false,
        }
    }

    /// Register a static value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Register or overwrite a static value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a single placeholder name.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.get(key) {
            return Some(value.clone());
        }
        let name = key.strip_prefix(ENV_PREFIX)?;
        if self.use_env {
            env::var(name).ok()
        } else {
            None
        }
    }

    /// Substitute every placeholder in `input`.
    ///
    /// With `err_on_unknown`, an unknown placeholder is an error; otherwise
    /// it is left in place. With `err_on_empty`, a placeholder resolving to
    /// `""` is an error; otherwise it is replaced by the empty string.
    pub fn replace_or_err(
        &self,
        input: &str,
        err_on_empty: bool,
        err_on_unknown: bool,
    ) -> Result<String, PlaceholderError> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(idx) = rest.find(|c: char| matches!(c, '{' | '}' | '\\')) {
            out.push_str(&rest[..idx]);
            let tail = &rest[idx..];
            if let Some(escaped) = tail.strip_prefix("\\{").or_else(|| tail.strip_prefix("\\}")) {
                out.push_str(&tail[1..2]);
                rest = escaped;
                continue;
            }
            if !tail.starts_with('{') {
                out.push_str(&tail[..1]);
                rest = &tail[1..];
                continue;
            }
            let Some(close) = tail.find('}') else {
                out.push_str(tail);
                rest = "";
                break;
            };
            let key = &tail[1..close];
            match self.get(key) {
                Some(value) if value.is_empty() && err_on_empty => {
                    return Err(PlaceholderError::Empty(key.to_owned()));
                }
                Some(value) => out.push_str(&value),
                None if err_on_unknown => {
                    return Err(PlaceholderError::Unknown(key.to_owned()));
                }
                None => out.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
