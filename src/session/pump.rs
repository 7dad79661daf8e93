// ABOUTME: Concurrent copying between the local standard streams and the remote channel.
// ABOUTME: One task per stream direction; draining joins both output tasks.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Stderr, Stdin, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CHUNK_SIZE: usize = 32 * 1024;
const QUEUE_DEPTH: usize = 64;

/// The local ends of the three standard streams.
pub struct LocalIo<I, O, E> {
    pub stdin: I,
    pub stdout: O,
    pub stderr: E,
}

impl LocalIo<Stdin, Stdout, Stderr> {
    /// The process's own standard streams.
    pub fn process() -> Self {
        Self {
            stdin: tokio::io::stdin(),
            stdout: tokio::io::stdout(),
            stderr: tokio::io::stderr(),
        }
    }
}

/// Running copy tasks for one session.
///
/// The orchestrator pulls local input with [`Pump::next_input`] and pushes
/// remote output with [`Pump::stdout`] / [`Pump::stderr`]. Output is not
/// considered delivered until [`Pump::drain`] returns.
pub struct Pump {
    input: mpsc::Receiver<Bytes>,
    stdout_tx: Option<mpsc::Sender<Bytes>>,
    stderr_tx: Option<mpsc::Sender<Bytes>>,
    stdin_task: JoinHandle<()>,
    stdout_task: Option<JoinHandle<std::io::Result<u64>>>,
    stderr_task: Option<JoinHandle<std::io::Result<u64>>>,
}

impl Pump {
    pub fn start<I, O, E>(io: LocalIo<I, O, E>) -> Self
    where
        I: AsyncRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
    {
        let (input_tx, input) = mpsc::channel(QUEUE_DEPTH);
        let (stdout_tx, stdout_rx) = mpsc::channel(QUEUE_DEPTH);
        let (stderr_tx, stderr_rx) = mpsc::channel(QUEUE_DEPTH);

        Self {
            input,
            stdout_tx: Some(stdout_tx),
            stderr_tx: Some(stderr_tx),
            stdin_task: tokio::spawn(read_input(io.stdin, input_tx)),
            stdout_task: Some(tokio::spawn(write_output(stdout_rx, io.stdout, "stdout"))),
            stderr_task: Some(tokio::spawn(write_output(stderr_rx, io.stderr, "stderr"))),
        }
    }

    /// Next chunk of local stdin. `None` once stdin ended or failed.
    pub async fn next_input(&mut self) -> Option<Bytes> {
        self.input.recv().await
    }

    pub async fn stdout(&self, data: Bytes) {
        forward(self.stdout_tx.as_ref(), data, "stdout").await;
    }

    pub async fn stderr(&self, data: Bytes) {
        forward(self.stderr_tx.as_ref(), data, "stderr").await;
    }

    /// Close the output queues and wait until both writers have finished.
    ///
    /// The stdin reader is abandoned: a blocked terminal read cannot be interrupted.
    pub async fn drain(mut self) {
        self.stdout_tx.take();
        self.stderr_tx.take();
        self.stdin_task.abort();

        let tasks = [
            ("stdout", self.stdout_task.take()),
            ("stderr", self.stderr_task.take()),
        ];
        for (name, task) in tasks {
            let Some(task) = task else {
                continue;
            };
            match task.await {
                Ok(Ok(bytes)) => tracing::debug!("{} drained ({} bytes)", name, bytes),
                Ok(Err(e)) => tracing::debug!("local {} write failed: {}", name, e),
                Err(e) => tracing::debug!("{} copy task ended abnormally: {}", name, e),
            }
        }
    }
}

/// A pump dropped without draining abandons whatever output is still queued.
impl Drop for Pump {
    fn drop(&mut self) {
        self.stdin_task.abort();
        for task in [self.stdout_task.take(), self.stderr_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}

async fn forward(tx: Option<&mpsc::Sender<Bytes>>, data: Bytes, name: &str) {
    let Some(tx) = tx else {
        return;
    };
    if tx.send(data).await.is_err() {
        tracing::trace!("dropping remote {} data, local writer is gone", name);
    }
}

async fn read_input<R>(mut reader: R, tx: mpsc::Sender<Bytes>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("local stdin reached end of stream");
                break;
            }
            Ok(n) => {
                if tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!("local stdin read error: {}", e);
                break;
            }
        }
    }
}

async fn write_output<W>(
    mut rx: mpsc::Receiver<Bytes>,
    mut writer: W,
    name: &'static str,
) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut total = 0u64;
    while let Some(chunk) = rx.recv().await {
        writer.write_all(&chunk).await?;
        writer.flush().await?;
        total += chunk.len() as u64;
    }
    tracing::trace!("remote {} reached end of stream", name);
    writer.flush().await?;
    Ok(total)
}
