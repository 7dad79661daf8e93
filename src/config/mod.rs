// ABOUTME: Immutable run configuration built once from the command line.
// ABOUTME: Passed explicitly to the credential resolver and session orchestrator.

mod target;

pub use target::{DEFAULT_PORT, Target, TargetError};

use std::path::PathBuf;
use std::time::Duration;

/// Whether the remote PTY echoes input back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EchoPolicy {
    /// Echo for an interactive shell, no echo when a PTY is forced.
    #[default]
    Auto,
    /// Always request echo.
    On,
    /// Never request echo.
    Off,
}

/// Options for one client invocation.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Allocate a PTY even when one would not be needed (`-t`).
    pub force_tty: bool,
    /// Forward the local environment as `env` requests (`-e`).
    pub pass_env: bool,
    /// Kill the remote command after this long (`-w`).
    pub timeout: Option<Duration>,
    /// Echo mode for the remote PTY.
    pub echo: EchoPolicy,
    /// Password file given with `-f`.
    pub password_file: Option<PathBuf>,
}

impl ClientOptions {
    /// Build the timeout from whole seconds; zero disables it.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }
}
