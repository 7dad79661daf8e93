// ABOUTME: Remote session orchestration: mode, PTY, stream pumping, signals, timeout, exit code.
// ABOUTME: Works against the RemoteChannel and LocalTerminal seams so it can run without a server.

mod channel;
mod control;
mod error;
mod mode;
mod orchestrator;
mod outcome;
mod pty;
mod pump;
mod signals;
mod terminal;
mod timeout;

pub use channel::{ChannelEvent, RemoteChannel};
pub use control::ControlRequest;
pub use error::{ChannelError, SessionError};
pub use mode::{Invocation, Mode, PtyPlan, SessionPlan};
pub use orchestrator::Orchestrator;
pub use outcome::{ExitOutcome, OutcomeCell, TIMEOUT_EXIT_CODE};
pub use pty::{PIXELS_PER_CELL, PtyRequest, TERM, TerminalGeometry, negotiate_pty};
pub use pump::{LocalIo, Pump};
#[cfg(unix)]
pub use signals::UnixSignals;
pub use signals::{LocalSignal, SignalForwarder, SignalSource};
pub use terminal::{Console, LocalTerminal, RawModeGuard, geometry};
pub use timeout::TimeoutGuard;
