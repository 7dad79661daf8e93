// ABOUTME: Locates and loads the password table.
// ABOUTME: A missing or unreadable source yields an empty table rather than an error.

use super::table::PasswordTable;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const PASSWORD_FILE_ENV: &str = "GSSH_PASSWORDFILE";
pub const PASSWORDS_ENV: &str = "GSSH_PASSWORDS";
const DEFAULT_FILE_NAME: &str = ".gssh";

/// Where passwords come from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSource {
    /// An INI file with a `[passwords]` section.
    File(PathBuf),
    /// Pairs in `GSSH_PASSWORDS`.
    Environment,
    /// Nothing configured.
    Unavailable,
}

impl PasswordSource {
    /// Pick the source: explicit path, `GSSH_PASSWORDFILE`, `~/.gssh` if it
    /// exists, then `GSSH_PASSWORDS`.
    pub fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::File(path.to_path_buf());
        }

        if let Some(path) = env::var_os(PASSWORD_FILE_ENV).filter(|p| !p.is_empty()) {
            return Self::File(PathBuf::from(path));
        }

        if let Some(path) = dirs::home_dir().map(|home| home.join(DEFAULT_FILE_NAME)) {
            if path.exists() {
                return Self::File(path);
            }
        }

        if env::var_os(PASSWORDS_ENV).is_some_and(|v| !v.is_empty()) {
            return Self::Environment;
        }

        Self::Unavailable
    }

    /// Read and parse the source. Failures are logged and treated as "no entries".
    pub fn load(&self) -> PasswordTable {
        match self {
            Self::File(path) => match fs::read_to_string(path) {
                Ok(text) => PasswordTable::from_ini(&text).unwrap_or_else(|e| {
                    tracing::warn!("ignoring password file {}: {}", path.display(), e);
                    PasswordTable::default()
                }),
                Err(e) => {
                    tracing::warn!("cannot read password file {}: {}", path.display(), e);
                    PasswordTable::default()
                }
            },
            Self::Environment => {
                let value = env::var(PASSWORDS_ENV).unwrap_or_default();
                PasswordTable::from_env_pairs(&value).unwrap_or_else(|e| {
                    tracing::warn!("ignoring ${}: {}", PASSWORDS_ENV, e);
                    PasswordTable::default()
                })
            }
            Self::Unavailable => {
                tracing::debug!("no password source configured");
                PasswordTable::default()
            }
        }
    }
}
