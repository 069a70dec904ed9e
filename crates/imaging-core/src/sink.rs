//! Single-writer output sink.
//!
//! Workers never touch the output streams. They send finished jobs to one
//! task that owns both writers and writes each record as a whole line, so
//! concurrent results cannot interleave.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::job::JobOutcome;

/// What the sink can be asked to write.
#[derive(Debug)]
pub enum SinkMessage {
    /// A finished job. Successes go to the output stream, failures to the
    /// diagnostic stream.
    Outcome(JobOutcome),
    /// A free-form line for the diagnostic stream.
    Diagnostic(String),
}

/// Sending half, cloned into every forwarding task.
#[derive(Debug, Clone)]
pub struct ResultSender {
    tx: mpsc::UnboundedSender<SinkMessage>,
}

impl ResultSender {
    pub fn send(&self, outcome: JobOutcome) {
        let id = outcome.result.id;
        if self.tx.send(SinkMessage::Outcome(outcome)).is_err() {
            tracing::warn!(id, "Result sink is gone, dropping result");
        }
    }

    pub fn diagnostic(&self, line: impl Into<String>) {
        if self.tx.send(SinkMessage::Diagnostic(line.into())).is_err() {
            tracing::warn!("Result sink is gone, dropping diagnostic");
        }
    }
}

/// Returned by the sink task once every sender is dropped.
#[derive(Debug)]
pub struct SinkReport<O, E> {
    pub out: O,
    pub err: E,
    /// Successful results written to `out`.
    pub succeeded: usize,
    /// Failed results written to `err`.
    pub failed: usize,
    /// Results whose stream had already failed and were never written.
    pub lost: usize,
    /// The first write error, if any stream failed.
    pub write_error: Option<std::io::Error>,
}

/// Start the writer task. It runs until every [`ResultSender`] is dropped.
///
/// A write error does not stop the task. The failed stream is abandoned and
/// the queue keeps draining, so outcomes are still released in order and
/// the other stream keeps receiving its lines.
pub fn spawn_sink<O, E>(out: O, err: E) -> (ResultSender, JoinHandle<SinkReport<O, E>>)
where
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(write_loop(rx, out, err));
    (ResultSender { tx }, handle)
}

/// One output stream, abandoned after its first write error.
struct Stream<W> {
    name: &'static str,
    writer: W,
    broken: bool,
}

impl<W: AsyncWrite + Unpin> Stream<W> {
    fn new(name: &'static str, writer: W) -> Self {
        Self {
            name,
            writer,
            broken: false,
        }
    }

    /// Write one whole line. Returns false if the line was not written.
    async fn write_line(&mut self, line: &[u8], first_error: &mut Option<std::io::Error>) -> bool {
        if self.broken {
            return false;
        }
        let written = async {
            self.writer.write_all(line).await?;
            self.writer.flush().await
        }
        .await;

        match written {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    stream = self.name,
                    error = %e,
                    "Output stream failed, abandoning it"
                );
                self.broken = true;
                first_error.get_or_insert(e);
                false
            }
        }
    }
}

async fn write_loop<O, E>(
    mut rx: mpsc::UnboundedReceiver<SinkMessage>,
    out: O,
    err: E,
) -> SinkReport<O, E>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut out = Stream::new("stdout", out);
    let mut err = Stream::new("stderr", err);
    let mut write_error = None;
    let mut succeeded = 0;
    let mut failed = 0;
    let mut lost = 0;

    while let Some(message) = rx.recv().await {
        match message {
            SinkMessage::Outcome(outcome) => {
                let result = &outcome.result;
                let mut line = match serde_json::to_vec(result) {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!(id = result.id, error = %e, "Could not serialize result");
                        continue;
                    }
                };
                line.push(b'\n');

                let stream_ok = if result.is_success() {
                    out.write_line(&line, &mut write_error).await
                } else {
                    err.write_line(&line, &mut write_error).await
                };

                match (stream_ok, result.is_success()) {
                    (true, true) => succeeded += 1,
                    (true, false) => failed += 1,
                    (false, _) => {
                        lost += 1;
                        tracing::warn!(
                            id = result.id,
                            error = result.error.as_deref().unwrap_or_default(),
                            preview = ?result.preview_path,
                            thumbnail = ?result.thumbnail_path,
                            "Result not written"
                        );
                    }
                }
                // Debug-mode outputs are deleted here, after the line is out
                drop(outcome);
            }
            SinkMessage::Diagnostic(text) => {
                let mut line = text.into_bytes();
                line.push(b'\n');
                err.write_line(&line, &mut write_error).await;
            }
        }
    }

    SinkReport {
        out: out.writer,
        err: err.writer,
        succeeded,
        failed,
        lost,
        write_error,
    }
}
