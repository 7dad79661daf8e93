// ABOUTME: Pseudo-terminal negotiation and terminal geometry.
// ABOUTME: Sends pty-req with xterm, the local window size, and the echo mode.

use super::channel::{ChannelEvent, RemoteChannel};
use super::error::SessionError;

/// Terminal type announced to the remote side.
pub const TERM: &str = "xterm";

/// Pixel size assumed for one character cell.
pub const PIXELS_PER_CELL: u32 = 8;

const DEFAULT_COLUMNS: u32 = 80;
const DEFAULT_ROWS: u32 = 24;

/// Window size in characters and pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    pub columns: u32,
    pub rows: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl TerminalGeometry {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            pixel_width: columns * PIXELS_PER_CELL,
            pixel_height: rows * PIXELS_PER_CELL,
        }
    }
}

impl Default for TerminalGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

/// Parameters of a `pty-req`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyRequest {
    pub term: String,
    pub geometry: TerminalGeometry,
    pub echo: bool,
}

/// Request a PTY and wait for the remote side to accept it.
///
/// Any failure is fatal for the session; there is no retry.
pub async fn negotiate_pty<C>(
    channel: &mut C,
    geometry: TerminalGeometry,
    echo: bool,
) -> Result<(), SessionError>
where
    C: RemoteChannel + ?Sized,
{
    let request = PtyRequest {
        term: TERM.to_string(),
        geometry,
        echo,
    };
    channel
        .request_pty(&request)
        .await
        .map_err(SessionError::PtyRequest)?;

    loop {
        match channel.next_event().await {
            Some(ChannelEvent::Success) => {
                tracing::debug!(
                    "pseudo terminal granted: {}x{} echo={}",
                    geometry.columns,
                    geometry.rows,
                    echo
                );
                return Ok(());
            }
            Some(ChannelEvent::Failure) => return Err(SessionError::PtyRejected),
            Some(ChannelEvent::Eof | ChannelEvent::Close) | None => {
                return Err(SessionError::ClosedDuringPty);
            }
            Some(other) => tracing::trace!("ignoring {:?} while waiting for pty reply", other),
        }
    }
}
