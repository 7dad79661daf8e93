// ABOUTME: Credential resolution order for a target.
// ABOUTME: Explicit password > password table > interactive prompt.

use super::source::PasswordSource;
use super::{Credential, CredentialError};
use crate::config::Target;
use std::io;

/// Asks the user for a password without echoing it.
pub trait PasswordPrompt: Send + Sync {
    fn prompt(&self, target: &Target) -> io::Result<String>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&self, target: &Target) -> io::Result<String> {
        rpassword::prompt_password(format!("{}@{}'s password: ", target.user, target.host))
    }
}

/// Resolves the password for one target. Never stores what it resolves.
pub struct CredentialResolver<P = TerminalPrompt> {
    explicit: Option<Credential>,
    source: PasswordSource,
    prompt: P,
    interactive: bool,
}

impl<P: PasswordPrompt> CredentialResolver<P> {
    pub fn new(source: PasswordSource, prompt: P) -> Self {
        Self {
            explicit: None,
            source,
            prompt,
            interactive: false,
        }
    }

    /// Password given on the command line. Empty strings count as absent.
    pub fn explicit(mut self, password: Option<String>) -> Self {
        self.explicit = password.filter(|p| !p.is_empty()).map(Credential::new);
        self
    }

    /// Whether prompting is allowed (stdin is a terminal).
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn resolve(&self, target: &Target) -> Result<Credential, CredentialError> {
        if let Some(credential) = &self.explicit {
            tracing::debug!("using password from the command line");
            return Ok(credential.clone());
        }

        let table = self.source.load();
        if let Some(password) = table.lookup(target) {
            tracing::debug!("using password from {:?}", self.source);
            return Ok(Credential::new(password));
        }

        if !self.interactive {
            return Err(CredentialError::NoCredential {
                target: target.lookup_key(),
            });
        }

        let password = self.prompt.prompt(target)?;
        Ok(Credential::new(password))
    }
}
