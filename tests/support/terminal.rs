// ABOUTME: Fake local terminal and a signal source driven by the test.
// ABOUTME: Tracks raw mode transitions and lets tests change the window size.

use async_trait::async_trait;
use gssh::session::{LocalSignal, LocalTerminal, SignalSource};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

pub struct FakeTerminal {
    tty: bool,
    size: Mutex<Option<(u16, u16)>>,
    raw: AtomicBool,
    raw_entries: AtomicUsize,
}

impl FakeTerminal {
    /// An interactive terminal of the given size.
    pub fn tty(columns: u16, rows: u16) -> Self {
        Self {
            tty: true,
            size: Mutex::new(Some((columns, rows))),
            raw: AtomicBool::new(false),
            raw_entries: AtomicUsize::new(0),
        }
    }

    /// stdin redirected from a pipe, no window size available.
    pub fn pipe() -> Self {
        Self {
            tty: false,
            size: Mutex::new(None),
            raw: AtomicBool::new(false),
            raw_entries: AtomicUsize::new(0),
        }
    }

    pub fn resize(&self, columns: u16, rows: u16) {
        *self.size.lock() = Some((columns, rows));
    }

    pub fn is_raw(&self) -> bool {
        self.raw.load(Ordering::SeqCst)
    }

    pub fn raw_entries(&self) -> usize {
        self.raw_entries.load(Ordering::SeqCst)
    }
}

impl LocalTerminal for FakeTerminal {
    fn stdin_is_terminal(&self) -> bool {
        self.tty
    }

    fn window_size(&self) -> io::Result<(u16, u16)> {
        self.size
            .lock()
            .ok_or_else(|| io::Error::other("not a terminal"))
    }

    fn enable_raw_mode(&self) -> io::Result<()> {
        self.raw.store(true, Ordering::SeqCst);
        self.raw_entries.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disable_raw_mode(&self) -> io::Result<()> {
        self.raw.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Signals injected by the test through the paired sender.
pub struct InjectedSignals(mpsc::UnboundedReceiver<LocalSignal>);

impl InjectedSignals {
    pub fn new() -> (mpsc::UnboundedSender<LocalSignal>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self(rx))
    }
}

#[async_trait]
impl SignalSource for InjectedSignals {
    async fn recv(&mut self) -> Option<LocalSignal> {
        self.0.recv().await
    }
}
