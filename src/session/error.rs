// ABOUTME: Session orchestration error types.
// ABOUTME: Covers PTY negotiation, command start, local terminal, and channel failures.

use thiserror::Error;

/// A request on the remote channel could not be sent.
#[derive(Debug, Error)]
#[error("{request} request failed: {reason}")]
pub struct ChannelError {
    pub request: &'static str,
    pub reason: String,
}

impl ChannelError {
    pub fn new(request: &'static str, reason: impl ToString) -> Self {
        Self {
            request,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("request for pseudo terminal failed: {0}")]
    PtyRequest(#[source] ChannelError),

    #[error("request for pseudo terminal failed: refused by remote side")]
    PtyRejected,

    #[error("channel closed while waiting for pseudo terminal")]
    ClosedDuringPty,

    #[error("request for terminal window size failed: {0}")]
    WindowSize(#[source] std::io::Error),

    #[error("failed to switch terminal to raw mode: {0}")]
    RawMode(#[source] std::io::Error),

    #[error("failed to start remote command: {0}")]
    Start(#[source] ChannelError),

    #[error("failed to start remote command: refused by remote side")]
    StartRejected,

    #[error("channel closed without exit status")]
    NoExitStatus,
}
