// ABOUTME: Local terminal primitives: tty detection, window size, raw mode.
// ABOUTME: RawModeGuard restores cooked mode on every exit path, including unwinding.

use super::pty::TerminalGeometry;
use std::io::{self, IsTerminal};
use std::sync::Arc;

/// The local terminal the client runs in.
pub trait LocalTerminal: Send + Sync {
    fn stdin_is_terminal(&self) -> bool;

    /// Window size as (columns, rows).
    fn window_size(&self) -> io::Result<(u16, u16)>;

    fn enable_raw_mode(&self) -> io::Result<()>;

    fn disable_raw_mode(&self) -> io::Result<()>;
}

/// The process's own terminal, driven through crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl LocalTerminal for Console {
    fn stdin_is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn window_size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn enable_raw_mode(&self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

/// Current window size of `terminal` as a geometry.
pub fn geometry(terminal: &dyn LocalTerminal) -> io::Result<TerminalGeometry> {
    let (columns, rows) = terminal.window_size()?;
    Ok(TerminalGeometry::new(u32::from(columns), u32::from(rows)))
}

/// Holds the terminal in raw mode until dropped.
pub struct RawModeGuard {
    terminal: Arc<dyn LocalTerminal>,
}

impl RawModeGuard {
    pub fn enter(terminal: Arc<dyn LocalTerminal>) -> io::Result<Self> {
        terminal.enable_raw_mode()?;
        tracing::debug!("local terminal switched to raw mode");
        Ok(Self { terminal })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.disable_raw_mode() {
            tracing::warn!("failed to restore terminal mode: {}", e);
        }
    }
}
