// ABOUTME: SSH connection management using russh.
// ABOUTME: Handles connection, host key checking, password authentication, and session channels.

use super::channel::SessionChannel;
use super::error::{Error, Result};
use crate::config::Target;
use crate::credentials::Credential;
use russh::Disconnect;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{check_known_hosts, learn_known_hosts};
use russh::keys::ssh_key;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for establishing an SSH connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Timeout for the TCP connect and handshake (default: 30 seconds).
    pub connect_timeout: Duration,
    /// Interval between keepalive messages (default: 30 seconds).
    pub keepalive_interval: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            connect_timeout: Duration::from_secs(30),
            keepalive_interval: Some(Duration::from_secs(30)),
        }
    }

    /// Connection settings for a parsed target.
    pub fn for_target(target: &Target) -> Self {
        Self::new(&target.host, &target.user).port(target.port)
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// SSH client handler for russh.
///
/// Host keys are checked against `~/.ssh/known_hosts`. Unknown hosts are
/// trusted on first use and remembered; a changed key is rejected.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match check_known_hosts(&self.host, self.port, server_public_key) {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::warn!(
                    "Trust-On-First-Use: accepting unknown host key for {}:{}",
                    self.host,
                    self.port
                );
                if let Err(e) = learn_known_hosts(&self.host, self.port, server_public_key) {
                    tracing::warn!("Failed to save host key to known_hosts: {}", e);
                }
                Ok(true)
            }
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::error!(
                    "host key for {}:{} does not match known_hosts",
                    self.host,
                    self.port
                );
                Ok(false)
            }
            // Unreadable known_hosts: treat as unknown host
            Err(_) => Ok(true),
        }
    }
}

/// An authenticated SSH connection.
pub struct Connection {
    config: ConnectionConfig,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Connection {
    /// Connect to the remote host and authenticate with a password.
    pub async fn connect(config: ConnectionConfig, credential: &Credential) -> Result<Self> {
        let russh_config = Config {
            inactivity_timeout: None,
            keepalive_interval: config.keepalive_interval,
            ..Default::default()
        };

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
        };

        let connect = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        );
        let mut handle = match tokio::time::timeout(config.connect_timeout, connect).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                return Err(if e.to_string().contains("Connection refused") {
                    Error::Connection(format!(
                        "connection refused to {}:{}",
                        config.host, config.port
                    ))
                } else {
                    Error::Connection(e.to_string())
                });
            }
            Err(_) => {
                return Err(Error::ConnectTimeout {
                    host: config.host.clone(),
                    port: config.port,
                    timeout: config.connect_timeout,
                });
            }
        };

        let result = handle
            .authenticate_password(&config.user, credential.expose())
            .await
            .map_err(Error::Protocol)?;
        if !result.success() {
            return Err(Error::AuthenticationFailed {
                user: config.user.clone(),
                host: config.host.clone(),
            });
        }
        tracing::debug!("authenticated as {} on {}:{}", config.user, config.host, config.port);

        Ok(Self { config, handle })
    }

    /// Open the session channel for the one command this client runs.
    pub async fn open_session(&self) -> Result<SessionChannel> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::ChannelOpen(e.to_string()))?;
        Ok(SessionChannel::new(channel))
    }

    /// Disconnect from the server.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        Ok(())
    }
}
