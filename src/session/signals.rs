// ABOUTME: Forwards local terminal resizes to the remote PTY as window-change requests.
// ABOUTME: SIGINT/SIGTERM only stop the forwarder; teardown stays with the orchestrator.

use super::control::ControlRequest;
use super::terminal::{self, LocalTerminal};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSignal {
    Resize,
    Interrupt,
    Terminate,
}

/// A stream of local signals.
#[async_trait]
pub trait SignalSource: Send {
    /// Next signal, or `None` when the source is exhausted.
    async fn recv(&mut self) -> Option<LocalSignal>;
}

/// SIGWINCH, SIGINT, and SIGTERM delivered through tokio.
#[cfg(unix)]
pub struct UnixSignals {
    winch: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl UnixSignals {
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            winch: signal(SignalKind::window_change())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for UnixSignals {
    async fn recv(&mut self) -> Option<LocalSignal> {
        tokio::select! {
            s = self.winch.recv() => s.map(|_| LocalSignal::Resize),
            s = self.interrupt.recv() => s.map(|_| LocalSignal::Interrupt),
            s = self.terminate.recv() => s.map(|_| LocalSignal::Terminate),
        }
    }
}

/// Background task turning signals into control requests.
pub struct SignalForwarder {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SignalForwarder {
    pub fn spawn(
        mut signals: Box<dyn SignalSource>,
        terminal: Arc<dyn LocalTerminal>,
        control: mpsc::Sender<ControlRequest>,
    ) -> Self {
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    signal = signals.recv() => match signal {
                        Some(LocalSignal::Resize) => {
                            let geometry = match terminal::geometry(terminal.as_ref()) {
                                Ok(g) => g,
                                Err(e) => {
                                    tracing::debug!("cannot read terminal size after resize: {}", e);
                                    continue;
                                }
                            };
                            if control.send(ControlRequest::Resize(geometry)).await.is_err() {
                                break;
                            }
                        }
                        Some(LocalSignal::Interrupt | LocalSignal::Terminate) => {
                            tracing::debug!("local interrupt received, no longer forwarding resizes");
                            break;
                        }
                        None => break,
                    },
                }
            }
        });

        Self {
            stop,
            task: Some(task),
        }
    }

    /// Stop listening and wait for the task to exit.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::debug!("signal forwarder ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SignalForwarder {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
