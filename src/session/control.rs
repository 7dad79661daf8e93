// ABOUTME: Requests from helper tasks to the task that owns the remote channel.
// ABOUTME: Only the signal forwarder sends these; the timeout pre-empts the session directly.

use super::pty::TerminalGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Send a window-change request.
    Resize(TerminalGeometry),
}
