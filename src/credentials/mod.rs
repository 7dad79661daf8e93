// ABOUTME: Password resolution for the remote target.
// ABOUTME: Explicit password, then password tables, then an interactive prompt.

mod resolver;
mod source;
mod table;

pub use resolver::{CredentialResolver, PasswordPrompt, TerminalPrompt};
pub use source::{PASSWORD_FILE_ENV, PASSWORDS_ENV, PasswordSource};
pub use table::{PasswordTable, TableError};

use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// A plaintext secret, wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Borrow the secret for handing to the transport.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no password available for {target} and stdin is not a terminal")]
    NoCredential { target: String },

    #[error("failed to read password: {0}")]
    Prompt(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_shows_secret() {
        let cred = Credential::new("hunter2");
        let shown = format!("{cred:?}");
        assert!(!shown.contains("hunter2"));
        assert_eq!(cred.expose(), "hunter2");
    }
}
