// ABOUTME: The remote channel seam used by the session orchestrator.
// ABOUTME: Implemented over russh in the ssh module and by scripted channels in tests.

use super::error::ChannelError;
use super::pty::{PtyRequest, TerminalGeometry};
use async_trait::async_trait;
use bytes::Bytes;

/// Something the remote side sent on the session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Bytes on the remote stdout.
    Stdout(Bytes),
    /// Bytes on the remote stderr (extended data type 1).
    Stderr(Bytes),
    /// The remote command exited with this status.
    ExitStatus(u32),
    /// The remote command was killed by this signal.
    ExitSignal(String),
    /// Positive reply to the last request sent with `want_reply`.
    Success,
    /// Negative reply to the last request sent with `want_reply`.
    Failure,
    /// The remote side will send no more data.
    Eof,
    /// The channel is closed.
    Close,
}

/// One session channel, bound to a single command or shell.
///
/// Requests that expect a reply (`request_pty`, `exec`, `shell`) only send the
/// request; the reply arrives later as [`ChannelEvent::Success`] or
/// [`ChannelEvent::Failure`]. `next_event` must be cancel-safe.
#[async_trait]
pub trait RemoteChannel: Send {
    async fn request_pty(&mut self, request: &PtyRequest) -> Result<(), ChannelError>;

    /// Fire-and-forget `env` request.
    async fn set_env(&mut self, name: &str, value: &str) -> Result<(), ChannelError>;

    async fn exec(&mut self, command: &str) -> Result<(), ChannelError>;

    async fn shell(&mut self) -> Result<(), ChannelError>;

    /// Fire-and-forget `window-change` request.
    async fn window_change(&mut self, geometry: TerminalGeometry) -> Result<(), ChannelError>;

    async fn data(&mut self, data: &[u8]) -> Result<(), ChannelError>;

    /// Close the remote stdin.
    async fn eof(&mut self) -> Result<(), ChannelError>;

    /// Send SIGTERM to the remote process and close the channel.
    async fn terminate(&mut self) -> Result<(), ChannelError>;

    async fn next_event(&mut self) -> Option<ChannelEvent>;
}
