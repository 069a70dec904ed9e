//! Line-delimited job dispatcher.
//!
//! Reads one JSON job per line, hands each to the pool in its own task and
//! forwards the outcome to the sink as soon as that job finishes. Reading
//! never waits on a job; results come out in completion order.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

use crate::job::Job;
use crate::pool::WorkerPool;
use crate::sink::ResultSender;

/// Counts for one run over an input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Jobs parsed and handed to the pool.
    pub submitted: usize,
    /// Lines that were not a job record.
    pub malformed: usize,
}

/// Dispatch every job in `input`, returning once the input is exhausted and
/// every submitted job's outcome has been handed to `sink`.
///
/// # Errors
///
/// Only a read error on `input` ends dispatch early. Jobs already submitted
/// still finish and report.
pub async fn dispatch<R>(
    mut input: R,
    pool: &WorkerPool,
    sink: &ResultSender,
) -> std::io::Result<DispatchSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = DispatchSummary::default();
    let mut in_flight = JoinSet::new();
    let mut line = Vec::new();

    let read_result = loop {
        line.clear();
        match input.read_until(b'\n', &mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        let record = trim_line(&line);
        if record.is_empty() {
            continue;
        }

        match serde_json::from_slice::<Job>(record) {
            Ok(job) => {
                summary.submitted += 1;
                let pool = pool.clone();
                let sink = sink.clone();
                in_flight.spawn(async move {
                    sink.send(pool.run(job).await);
                });
            }
            Err(e) => {
                summary.malformed += 1;
                tracing::debug!(error = %e, "Skipping malformed job line");
                sink.diagnostic(format!("Failed to unmarshal task: {e}"));
            }
        }

        // Reap what has already finished so the set tracks only live jobs
        while let Some(joined) = in_flight.try_join_next() {
            log_join_failure(joined);
        }
    };

    while let Some(joined) = in_flight.join_next().await {
        log_join_failure(joined);
    }

    tracing::info!(
        submitted = summary.submitted,
        malformed = summary.malformed,
        "Input exhausted, all jobs reported"
    );

    read_result.map(|()| summary)
}

fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Result forwarding task failed");
    }
}
