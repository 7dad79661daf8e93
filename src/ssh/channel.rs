// ABOUTME: russh session channel adapted to the RemoteChannel seam.
// ABOUTME: Maps ChannelMsg to ChannelEvent and issues pty-req, exec, shell, env, and window-change.

use crate::session::{ChannelError, ChannelEvent, PtyRequest, RemoteChannel, TerminalGeometry};
use async_trait::async_trait;
use bytes::Bytes;
use russh::client::Msg;
use russh::{Channel, ChannelMsg, Pty, Sig};

/// A single-use `session` channel.
pub struct SessionChannel {
    channel: Channel<Msg>,
}

impl SessionChannel {
    pub(crate) fn new(channel: Channel<Msg>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl RemoteChannel for SessionChannel {
    async fn request_pty(&mut self, request: &PtyRequest) -> Result<(), ChannelError> {
        let g = request.geometry;
        self.channel
            .request_pty(
                true,
                &request.term,
                g.columns,
                g.rows,
                g.pixel_width,
                g.pixel_height,
                &[(Pty::ECHO, u32::from(request.echo))],
            )
            .await
            .map_err(|e| ChannelError::new("pty-req", e))
    }

    async fn set_env(&mut self, name: &str, value: &str) -> Result<(), ChannelError> {
        self.channel
            .set_env(false, name, value)
            .await
            .map_err(|e| ChannelError::new("env", e))
    }

    async fn exec(&mut self, command: &str) -> Result<(), ChannelError> {
        self.channel
            .exec(true, command)
            .await
            .map_err(|e| ChannelError::new("exec", e))
    }

    async fn shell(&mut self) -> Result<(), ChannelError> {
        self.channel
            .request_shell(true)
            .await
            .map_err(|e| ChannelError::new("shell", e))
    }

    async fn window_change(&mut self, geometry: TerminalGeometry) -> Result<(), ChannelError> {
        self.channel
            .window_change(
                geometry.columns,
                geometry.rows,
                geometry.pixel_width,
                geometry.pixel_height,
            )
            .await
            .map_err(|e| ChannelError::new("window-change", e))
    }

    async fn data(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        self.channel
            .data(data)
            .await
            .map_err(|e| ChannelError::new("data", e))
    }

    async fn eof(&mut self) -> Result<(), ChannelError> {
        self.channel
            .eof()
            .await
            .map_err(|e| ChannelError::new("eof", e))
    }

    async fn terminate(&mut self) -> Result<(), ChannelError> {
        if let Err(e) = self.channel.signal(Sig::TERM).await {
            tracing::debug!("signal request failed: {}", e);
        }
        self.channel
            .close()
            .await
            .map_err(|e| ChannelError::new("close", e))
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let event = match self.channel.wait().await? {
                ChannelMsg::Data { data } => ChannelEvent::Stdout(Bytes::copy_from_slice(&data)),
                ChannelMsg::ExtendedData { data, ext: 1 } => {
                    ChannelEvent::Stderr(Bytes::copy_from_slice(&data))
                }
                ChannelMsg::ExitStatus { exit_status } => ChannelEvent::ExitStatus(exit_status),
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    ChannelEvent::ExitSignal(format!("{signal_name:?}"))
                }
                ChannelMsg::Success => ChannelEvent::Success,
                ChannelMsg::Failure => ChannelEvent::Failure,
                ChannelMsg::Eof => ChannelEvent::Eof,
                ChannelMsg::Close => ChannelEvent::Close,
                _ => continue,
            };
            return Some(event);
        }
    }
}
