// ABOUTME: In-memory password table keyed by "user@host[:port]" or "user".
// ABOUTME: Parses the INI password file and the GSSH_PASSWORDS environment format.

use crate::config::Target;
use ini::Ini;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

const PASSWORDS_SECTION: &str = "passwords";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("malformed INI: {0}")]
    Ini(String),

    #[error("no [passwords] section")]
    MissingSection,

    #[error("entry {index}: expected `target=password`")]
    BadEnvEntry { index: usize },
}

/// Passwords looked up by target. Keys are case-insensitive.
#[derive(Default, Clone)]
pub struct PasswordTable {
    entries: HashMap<String, Zeroizing<String>>,
}

impl fmt::Debug for PasswordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("PasswordTable").field("keys", &keys).finish()
    }
}

impl PasswordTable {
    /// Parse an INI document and keep the `[passwords]` section.
    ///
    /// Section and key names are matched case-insensitively. `:` separates
    /// keys from values just like `=`, so a port-qualified key escapes it:
    /// `bob@host\:2200 = secret`.
    pub fn from_ini(text: &str) -> Result<Self, TableError> {
        let ini = Ini::load_from_str(text).map_err(|e| TableError::Ini(e.to_string()))?;

        let mut table = Self::default();
        let mut seen_passwords = false;
        for (section, properties) in ini.iter() {
            let is_passwords =
                section.is_some_and(|name| name.trim().eq_ignore_ascii_case(PASSWORDS_SECTION));
            if !is_passwords {
                continue;
            }
            seen_passwords = true;
            for (key, value) in properties.iter() {
                table.insert(key.trim(), value.trim());
            }
        }

        if !seen_passwords {
            return Err(TableError::MissingSection);
        }
        Ok(table)
    }

    /// Parse space-separated `target=password` pairs.
    pub fn from_env_pairs(value: &str) -> Result<Self, TableError> {
        let mut table = Self::default();
        for (index, pair) in value.split_whitespace().enumerate() {
            // First `=` splits, so passwords may contain `=`. A greedy
            // `(.+)=(.+)` match would split on the last one instead.
            match pair.split_once('=') {
                Some((key, password)) if !key.is_empty() && !password.is_empty() => {
                    table.insert(key, password);
                }
                _ => return Err(TableError::BadEnvEntry { index }),
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, key: &str, password: &str) {
        self.entries.insert(
            key.to_ascii_lowercase(),
            Zeroizing::new(password.to_string()),
        );
    }

    /// Look up `user@host[:port]`, then `user`. Empty passwords never match.
    pub fn lookup(&self, target: &Target) -> Option<&str> {
        [target.lookup_key(), target.user.clone()]
            .into_iter()
            .find_map(|key| {
                self.entries
                    .get(&key.to_ascii_lowercase())
                    .map(|p| p.as_str())
                    .filter(|p| !p.is_empty())
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
