// ABOUTME: The single result of a client invocation and its process exit code.
// ABOUTME: OutcomeCell lets completion and the timeout race; the first writer wins.

use std::sync::OnceLock;

/// Exit code used when the timeout fires, as timeout(1) does.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The remote command exited with this status.
    Exited(u32),
    /// The remote command was killed by a signal.
    Signaled(String),
    /// The session failed locally or on the channel.
    LocalError(String),
    /// The timeout fired and the session was torn down.
    TimedOut,
}

impl ExitOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exited(code) => i32::try_from(*code).unwrap_or(255),
            Self::Signaled(_) | Self::LocalError(_) => FAILURE_EXIT_CODE,
            Self::TimedOut => TIMEOUT_EXIT_CODE,
        }
    }

    /// Message for stderr, if this outcome deserves one.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Signaled(signal) => Some(format!("remote command killed by signal {signal}")),
            Self::LocalError(message) => Some(message.clone()),
            Self::Exited(_) | Self::TimedOut => None,
        }
    }
}

/// Single-assignment holder for the outcome.
#[derive(Debug, Default)]
pub struct OutcomeCell(OnceLock<ExitOutcome>);

impl OutcomeCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `outcome` unless one is already recorded. Returns whether it was recorded.
    pub fn decide(&self, outcome: ExitOutcome) -> bool {
        self.0.set(outcome).is_ok()
    }

    pub fn get(&self) -> Option<&ExitOutcome> {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(ExitOutcome::Exited(0).exit_code(), 0);
        assert_eq!(ExitOutcome::Exited(42).exit_code(), 42);
        assert_eq!(ExitOutcome::Signaled("KILL".into()).exit_code(), 1);
        assert_eq!(ExitOutcome::LocalError("x".into()).exit_code(), 1);
        assert_eq!(ExitOutcome::TimedOut.exit_code(), 124);
    }

    #[test]
    fn first_decision_wins() {
        let cell = OutcomeCell::new();
        assert!(cell.decide(ExitOutcome::TimedOut));
        assert!(!cell.decide(ExitOutcome::Exited(0)));
        assert!(!cell.decide(ExitOutcome::LocalError("closed".into())));
        assert_eq!(cell.get(), Some(&ExitOutcome::TimedOut));
    }

    #[test]
    fn only_failures_have_diagnostics() {
        assert_eq!(ExitOutcome::Exited(3).diagnostic(), None);
        assert_eq!(ExitOutcome::TimedOut.diagnostic(), None);
        assert!(
            ExitOutcome::Signaled("SEGV".into())
                .diagnostic()
                .unwrap()
                .contains("SEGV")
        );
    }
}
