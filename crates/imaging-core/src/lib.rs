//! Imaging Core - preview and thumbnail derivative pipeline
//!
//! This crate turns job records (a source path plus declared widths) into a
//! JPEG preview and a smaller JPEG thumbnail per job, running jobs on a
//! bounded pool and reporting each result as soon as it finishes.
//!
//! # Module Structure
//!
//! - `strategy` - Picks how much decoding the external RAW decoder must do
//! - `extract` - Runs the decoder (or falls back to the source file)
//! - `decode` - JPEG/TIFF/PNM decoding and resizing
//! - `encode` - JPEG encoding
//! - `render` - Preview and thumbnail generation into temporary files
//! - `job` - Job records, results and the per-job processor
//! - `pool` - Bounded worker pool
//! - `sink` - Single-writer output for results
//! - `dispatch` - Line-delimited input reader feeding the pool

pub mod config;
pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod extract;
pub mod job;
pub mod pool;
pub mod render;
pub mod sink;
pub mod strategy;

pub use config::{ConfigError, PipelineConfig};
pub use dispatch::{dispatch, DispatchSummary};
pub use extract::{ExternalDecoder, RawDecoder};
pub use job::{process_job, Job, JobError, JobOutcome, JobResult};
pub use pool::{DispatchError, WorkerPool};
pub use sink::{spawn_sink, ResultSender, SinkReport};
pub use strategy::{select_strategy, ExtractionStrategy};
