//! imaging - batch preview/thumbnail generator
//!
//! Reads line-delimited JSON jobs on stdin and reports one JSON result per
//! job: successes on stdout, failures on stderr. Logs also go to stderr.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use imaging_core::{dispatch, spawn_sink, ExternalDecoder, WorkerPool};

use crate::cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("imaging={level},imaging_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let exe = std::env::current_exe().ok();
    let config = args.pipeline_config(exe.as_deref());
    config.validate().context("invalid configuration")?;

    let decoder = ExternalDecoder::locate(&config.decoder_path)?;
    let workers = args.workers.unwrap_or_else(WorkerPool::default_size);

    tracing::info!(
        decoder = %decoder.path().display(),
        workers,
        preview_width = config.preview_width,
        thumb_width = config.thumb_width,
        debug = config.debug,
        "Starting imaging"
    );

    let pool = WorkerPool::new(workers, Arc::new(config), Arc::new(decoder));
    let (sender, sink) = spawn_sink(tokio::io::stdout(), tokio::io::stderr());

    let dispatched = dispatch(BufReader::new(tokio::io::stdin()), &pool, &sender).await;
    drop(sender);

    let report = sink.await.context("result sink task failed")?;
    let summary = dispatched.context("failed reading jobs")?;

    tracing::info!(
        submitted = summary.submitted,
        malformed = summary.malformed,
        succeeded = report.succeeded,
        failed = report.failed,
        lost = report.lost,
        "Done"
    );

    match report.write_error {
        Some(e) => Err(anyhow::Error::new(e)
            .context(format!("failed writing results, {} not reported", report.lost))),
        None => Ok(()),
    }
}
