// ABOUTME: In-memory RemoteChannel that plays a scripted remote side.
// ABOUTME: Records every request so tests can assert on order and arguments.

use async_trait::async_trait;
use bytes::Bytes;
use gssh::session::{ChannelError, ChannelEvent, PtyRequest, RemoteChannel, TerminalGeometry};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A request the client sent to the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestPty(PtyRequest),
    SetEnv(String, String),
    Exec(String),
    Shell,
    WindowChange(TerminalGeometry),
    Data(Vec<u8>),
    Eof,
    Terminate,
}

/// What the remote command does once it has started.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Emit these events right after accepting the start request.
    Script(Vec<ChannelEvent>),
    /// Echo all of stdin back on stdout once stdin is closed, then exit 0.
    Cat,
    /// Exit 0 after the first window-change request.
    ExitOnResize,
    /// Never exit on its own.
    Hang,
}

/// Shared view of what the channel saw, readable after the channel is consumed.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    /// All bytes written to the remote stdin, in order.
    pub fn stdin(&self) -> Vec<u8> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Data(d) => Some(d.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.lock().iter().position(|c| c == call)
    }

    fn push(&self, call: Call) {
        self.0.lock().push(call);
    }
}

pub struct ScriptedChannel {
    journal: Journal,
    behavior: Behavior,
    pty_reply: Option<ChannelEvent>,
    start_reply: ChannelEvent,
    stall_start: bool,
    fail_terminate: bool,
    pending: VecDeque<ChannelEvent>,
    received: Vec<u8>,
    closed: bool,
}

impl ScriptedChannel {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            journal: Journal::default(),
            behavior,
            pty_reply: Some(ChannelEvent::Success),
            start_reply: ChannelEvent::Success,
            stall_start: false,
            fail_terminate: false,
            pending: VecDeque::new(),
            received: Vec::new(),
            closed: false,
        }
    }

    /// A command that prints `stdout` and exits with `status`.
    pub fn exiting(stdout: &str, status: u32) -> Self {
        let mut events = Vec::new();
        if !stdout.is_empty() {
            events.push(ChannelEvent::Stdout(Bytes::copy_from_slice(stdout.as_bytes())));
        }
        events.extend([
            ChannelEvent::ExitStatus(status),
            ChannelEvent::Eof,
            ChannelEvent::Close,
        ]);
        Self::new(Behavior::Script(events))
    }

    pub fn refuse_pty(mut self) -> Self {
        self.pty_reply = Some(ChannelEvent::Failure);
        self
    }

    /// Never answer the PTY request.
    pub fn silent_pty(mut self) -> Self {
        self.pty_reply = None;
        self
    }

    pub fn refuse_start(mut self) -> Self {
        self.start_reply = ChannelEvent::Failure;
        self
    }

    /// The exec or shell request never completes, as with a stalled transport.
    pub fn stall_start(mut self) -> Self {
        self.stall_start = true;
        self
    }

    /// Closing the channel fails, as it does once the connection is gone.
    pub fn failing_terminate(mut self) -> Self {
        self.fail_terminate = true;
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    async fn started(&mut self) {
        if self.stall_start {
            std::future::pending::<()>().await;
        }
        self.pending.push_back(self.start_reply.clone());
        if self.start_reply != ChannelEvent::Success {
            return;
        }
        if let Behavior::Script(events) = &self.behavior {
            self.pending.extend(events.iter().cloned());
        }
    }

    fn exit_cleanly(&mut self, output: Option<Bytes>) {
        if let Some(output) = output {
            self.pending.push_back(ChannelEvent::Stdout(output));
        }
        self.pending.extend([
            ChannelEvent::ExitStatus(0),
            ChannelEvent::Eof,
            ChannelEvent::Close,
        ]);
    }
}

#[async_trait]
impl RemoteChannel for ScriptedChannel {
    async fn request_pty(&mut self, request: &PtyRequest) -> Result<(), ChannelError> {
        self.journal.push(Call::RequestPty(request.clone()));
        self.pending.extend(self.pty_reply.clone());
        Ok(())
    }

    async fn set_env(&mut self, name: &str, value: &str) -> Result<(), ChannelError> {
        self.journal
            .push(Call::SetEnv(name.to_string(), value.to_string()));
        Ok(())
    }

    async fn exec(&mut self, command: &str) -> Result<(), ChannelError> {
        self.journal.push(Call::Exec(command.to_string()));
        self.started().await;
        Ok(())
    }

    async fn shell(&mut self) -> Result<(), ChannelError> {
        self.journal.push(Call::Shell);
        self.started().await;
        Ok(())
    }

    async fn window_change(&mut self, geometry: TerminalGeometry) -> Result<(), ChannelError> {
        self.journal.push(Call::WindowChange(geometry));
        if matches!(self.behavior, Behavior::ExitOnResize) {
            self.exit_cleanly(None);
        }
        Ok(())
    }

    async fn data(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::new("data", "channel closed"));
        }
        self.journal.push(Call::Data(data.to_vec()));
        self.received.extend_from_slice(data);
        Ok(())
    }

    async fn eof(&mut self) -> Result<(), ChannelError> {
        self.journal.push(Call::Eof);
        if matches!(self.behavior, Behavior::Cat) {
            let echoed = Bytes::from(std::mem::take(&mut self.received));
            self.exit_cleanly(Some(echoed));
        }
        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), ChannelError> {
        self.journal.push(Call::Terminate);
        self.pending.clear();
        self.closed = true;
        if self.fail_terminate {
            return Err(ChannelError::new("close", "connection already gone"));
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.closed {
            return None;
        }
        // Nothing happens until the client sends another request.
        std::future::pending().await
    }
}
