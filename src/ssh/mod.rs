// ABOUTME: SSH client module for remote server connections.
// ABOUTME: Password authentication with known_hosts verification and one session channel per run.

mod channel;
mod client;
mod error;

pub use channel::SessionChannel;
pub use client::{Connection, ConnectionConfig};
pub use error::{Error, Result};
