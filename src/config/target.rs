// ABOUTME: Remote target parsing for the command line.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@host:port".

use std::env;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 22;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("target cannot be empty")]
    Empty,

    #[error("user name error: empty user before '@'")]
    EmptyUser,

    #[error("hostname error: hostname cannot be empty")]
    EmptyHost,

    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// Where to connect and what to run there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user: String,
    pub host: String,
    pub port: u16,
    /// Remote command line; `None` starts a login shell.
    pub command: Option<String>,
}

impl Target {
    /// Parse `[user@]host[:port]`, defaulting the user to the local login name.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        let (user, rest) = match s.find('@') {
            Some(at_pos) => {
                let user = &s[..at_pos];
                if user.is_empty() {
                    return Err(TargetError::EmptyUser);
                }
                (user.to_string(), &s[at_pos + 1..])
            }
            None => (local_user(), s),
        };

        let (host, port) = match rest.rfind(':') {
            Some(colon_pos) => {
                let port_str = &rest[colon_pos + 1..];
                let port = port_str
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| TargetError::InvalidPort(port_str.to_string()))?;
                (&rest[..colon_pos], port)
            }
            None => (rest, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(TargetError::EmptyHost);
        }

        Ok(Self {
            user,
            host: host.to_string(),
            port,
            command: None,
        })
    }

    /// Attach the remote command, joining words with single spaces.
    pub fn with_command<S: AsRef<str>>(mut self, words: &[S]) -> Self {
        let command = words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        self.command = if command.is_empty() {
            None
        } else {
            Some(command)
        };
        self
    }

    /// Password table key for this target: `user@host`, plus `:port` when non-default.
    pub fn lookup_key(&self) -> String {
        if self.port == DEFAULT_PORT {
            format!("{}@{}", self.user, self.host)
        } else {
            format!("{}@{}:{}", self.user, self.host, self.port)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

fn local_user() -> String {
    env::var("USER").unwrap_or_else(|_| "root".to_string())
}
