// ABOUTME: Interactive vs. batch mode selection and the per-run session plan.
// ABOUTME: The plan fixes PTY, raw mode, signal forwarding, and stdin EOF handling up front.

use super::terminal::LocalTerminal;
use crate::config::{ClientOptions, EchoPolicy, Target};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// stdin is a terminal.
    Interactive,
    /// stdin is a pipe or file.
    Batch,
}

impl Mode {
    pub fn select(terminal: &dyn LocalTerminal) -> Self {
        if terminal.stdin_is_terminal() {
            Self::Interactive
        } else {
            Self::Batch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Exec(String),
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtyPlan {
    pub echo: bool,
}

/// Everything decided before the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub mode: Mode,
    pub invocation: Invocation,
    pub pty: Option<PtyPlan>,
    /// Put the local terminal in raw mode for the session.
    pub raw_terminal: bool,
    /// Forward SIGWINCH as window-change requests. Only with a raw terminal,
    /// since listening for SIGINT replaces its default action.
    pub forward_signals: bool,
    /// Send EOF to the remote stdin when local stdin ends.
    pub close_stdin_on_eof: bool,
    pub pass_env: bool,
    pub timeout: Option<Duration>,
}

impl SessionPlan {
    pub fn new(mode: Mode, target: &Target, options: &ClientOptions) -> Self {
        let invocation = match &target.command {
            Some(command) => Invocation::Exec(command.clone()),
            None => Invocation::Shell,
        };
        let interactive_shell = mode == Mode::Interactive && invocation == Invocation::Shell;

        let pty = (interactive_shell || options.force_tty).then(|| PtyPlan {
            echo: match options.echo {
                EchoPolicy::Auto => interactive_shell,
                EchoPolicy::On => true,
                EchoPolicy::Off => false,
            },
        });

        Self {
            mode,
            invocation,
            pty,
            raw_terminal: interactive_shell,
            // a cooked terminal keeps its default Ctrl-C handling
            forward_signals: interactive_shell,
            close_stdin_on_eof: mode == Mode::Batch,
            pass_env: options.pass_env,
            timeout: options.timeout,
        }
    }
}
