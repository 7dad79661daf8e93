// ABOUTME: Runs one remote command or shell to completion and reduces it to an exit outcome.
// ABOUTME: Owns the channel; the timeout pre-empts every step, resizes arrive over a queue.

use super::channel::{ChannelEvent, RemoteChannel};
use super::control::ControlRequest;
use super::error::SessionError;
use super::mode::{Invocation, Mode, SessionPlan};
use super::outcome::{ExitOutcome, OutcomeCell};
use super::pty::{TerminalGeometry, negotiate_pty};
use super::pump::{LocalIo, Pump};
use super::signals::{SignalForwarder, SignalSource};
use super::terminal::{self, LocalTerminal, RawModeGuard};
use super::timeout::TimeoutGuard;
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

const CONTROL_QUEUE_DEPTH: usize = 16;

/// Drives a single session according to its plan.
pub struct Orchestrator {
    plan: SessionPlan,
    terminal: Arc<dyn LocalTerminal>,
    signals: Option<Box<dyn SignalSource>>,
}

impl Orchestrator {
    pub fn new(plan: SessionPlan, terminal: Arc<dyn LocalTerminal>) -> Self {
        Self {
            plan,
            terminal,
            signals: None,
        }
    }

    /// Signal source used when the plan forwards resizes.
    pub fn signals(mut self, signals: Box<dyn SignalSource>) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Run the session. The channel is consumed and never reused.
    ///
    /// The timeout covers every step after this call, from `env` requests to
    /// draining local output. When it fires, whatever step is in progress is
    /// abandoned, the remote command is terminated, and queued output is dropped.
    pub async fn run<C, I, O, E>(self, mut channel: C, io: LocalIo<I, O, E>) -> ExitOutcome
    where
        C: RemoteChannel,
        I: AsyncRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
    {
        let outcome = Arc::new(OutcomeCell::new());
        let mut timer = TimeoutGuard::arm(self.plan.timeout, outcome.clone());

        let result = tokio::select! {
            biased;
            () = timer.expired() => {
                if let Err(e) = channel.terminate().await {
                    tracing::debug!("failed to terminate remote command: {}", e);
                }
                Ok(ExitOutcome::TimedOut)
            }
            result = self.drive(&mut channel, io) => result,
        };

        // no-op when the timeout already claimed the outcome
        outcome.decide(match result {
            Ok(exit) => exit,
            Err(e) => ExitOutcome::LocalError(e.to_string()),
        });
        timer.disarm();
        outcome
            .get()
            .cloned()
            .unwrap_or_else(|| ExitOutcome::LocalError("session ended without a result".into()))
    }

    async fn drive<C, I, O, E>(
        self,
        channel: &mut C,
        io: LocalIo<I, O, E>,
    ) -> Result<ExitOutcome, SessionError>
    where
        C: RemoteChannel,
        I: AsyncRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
    {
        let Self {
            plan,
            terminal,
            signals,
        } = self;

        if plan.pass_env {
            pass_environment(channel, env::vars_os().filter_map(|(k, v)| {
                Some((k.into_string().ok()?, v.into_string().ok()?))
            }))
            .await;
        }

        if let Some(pty) = plan.pty {
            let geometry = local_geometry(plan.mode, terminal.as_ref())?;
            negotiate_pty(channel, geometry, pty.echo).await?;
        }

        let _raw_mode = if plan.raw_terminal {
            Some(RawModeGuard::enter(terminal.clone()).map_err(SessionError::RawMode)?)
        } else {
            None
        };

        let mut pump = Pump::start(io);
        let (control_tx, mut control_rx) = mpsc::channel(CONTROL_QUEUE_DEPTH);

        let forwarder = match signals {
            Some(signals) if plan.forward_signals => {
                Some(SignalForwarder::spawn(signals, terminal.clone(), control_tx))
            }
            _ => None,
        };

        let started = match &plan.invocation {
            Invocation::Exec(command) => {
                tracing::debug!("executing remote command");
                channel.exec(command).await
            }
            Invocation::Shell => {
                tracing::debug!("starting remote shell");
                channel.shell().await
            }
        };

        let result = match started {
            Ok(()) => {
                wait_for_exit(channel, &mut pump, &mut control_rx, plan.close_stdin_on_eof).await
            }
            Err(e) => Err(SessionError::Start(e)),
        };

        pump.drain().await;
        if let Some(forwarder) = forwarder {
            forwarder.stop().await;
        }
        result
    }
}

/// Geometry for the PTY request. Batch runs fall back to 80x24 without a terminal.
fn local_geometry(
    mode: Mode,
    terminal: &dyn LocalTerminal,
) -> Result<TerminalGeometry, SessionError> {
    match mode {
        Mode::Interactive => terminal::geometry(terminal).map_err(SessionError::WindowSize),
        Mode::Batch => Ok(terminal::geometry(terminal).unwrap_or_default()),
    }
}

async fn pass_environment<C>(channel: &mut C, vars: impl IntoIterator<Item = (String, String)>)
where
    C: RemoteChannel + ?Sized,
{
    for (name, value) in vars {
        if let Err(e) = channel.set_env(&name, &value).await {
            tracing::warn!("env request for {} failed: {}", name, e);
        }
    }
}

/// Pump data until the remote command has exited and sent EOF, or the channel closes.
async fn wait_for_exit<C>(
    channel: &mut C,
    pump: &mut Pump,
    control: &mut mpsc::Receiver<ControlRequest>,
    close_stdin_on_eof: bool,
) -> Result<ExitOutcome, SessionError>
where
    C: RemoteChannel + ?Sized,
{
    let mut exit: Option<ExitOutcome> = None;
    let mut got_eof = false;
    let mut stdin_open = true;
    let mut control_open = true;

    loop {
        tokio::select! {
            chunk = pump.next_input(), if stdin_open => match chunk {
                Some(data) => {
                    if let Err(e) = channel.data(&data).await {
                        tracing::debug!("stopped forwarding stdin: {}", e);
                        stdin_open = false;
                    }
                }
                None => {
                    stdin_open = false;
                    if close_stdin_on_eof {
                        if let Err(e) = channel.eof().await {
                            tracing::debug!("failed to close remote stdin: {}", e);
                        }
                    }
                }
            },

            request = control.recv(), if control_open => match request {
                Some(ControlRequest::Resize(geometry)) => {
                    if let Err(e) = channel.window_change(geometry).await {
                        tracing::warn!("window-change request failed: {}", e);
                    }
                }
                None => control_open = false,
            },

            event = channel.next_event() => match event {
                Some(ChannelEvent::Stdout(data)) => pump.stdout(data).await,
                Some(ChannelEvent::Stderr(data)) => pump.stderr(data).await,
                Some(ChannelEvent::ExitStatus(code)) => {
                    tracing::debug!("remote command exited with status {}", code);
                    exit = Some(ExitOutcome::Exited(code));
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelEvent::ExitSignal(signal)) => {
                    tracing::debug!("remote command killed by signal {}", signal);
                    exit = Some(ExitOutcome::Signaled(signal));
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelEvent::Eof) => {
                    got_eof = true;
                    if exit.is_some() {
                        break;
                    }
                }
                Some(ChannelEvent::Success) => tracing::trace!("remote side accepted request"),
                Some(ChannelEvent::Failure) => return Err(SessionError::StartRejected),
                Some(ChannelEvent::Close) | None => break,
            },
        }
    }

    exit.ok_or(SessionError::NoExitStatus)
}
