// ABOUTME: Application-wide error types for gssh.
// ABOUTME: Aggregates the errors that abort a run before a session starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Credential(#[from] crate::credentials::CredentialError),

    #[error(transparent)]
    Ssh(#[from] crate::ssh::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
