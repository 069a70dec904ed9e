//! Job records and the per-job processor.
//!
//! A job moves through `Start -> SourcePrepared -> Decoded -> Rendered -> Done`.
//! Any stage can end it early with an error, and every error is turned into a
//! [`JobResult`] here; nothing propagates past [`process_job`].

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::EncodeError;
use crate::extract::{prepare_source, RawDecoder};
use crate::render::{render_with, write_output, RenderError, RenderedPair};
use crate::strategy::select_strategy;

/// One unit of work as read from the input stream.
///
/// Absent fields take zero values, so an incomplete record still yields a
/// result for its id (a missing `filename` fails as a missing source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "filename", default)]
    pub source_path: PathBuf,
    /// Full source width as declared by the caller. Zero when unknown.
    #[serde(rename = "imageWidth", default)]
    pub full_width: u32,
    #[serde(rename = "thumbWidth", default)]
    pub thumb_width: u32,
}

/// Everything that can end a job early.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("File does not exist")]
    SourceMissing,

    #[error("could not create temporary file: {0}")]
    TempFile(String),

    #[error("could not read image data: {0}")]
    Io(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Outcome of one job. Either `error` is set or both paths are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireResult", from = "WireResult")]
pub struct JobResult {
    pub id: i64,
    pub error: Option<String>,
    pub preview_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
}

impl JobResult {
    pub fn success(id: i64, preview: PathBuf, thumbnail: PathBuf) -> Self {
        Self {
            id,
            error: None,
            preview_path: Some(preview),
            thumbnail_path: Some(thumbnail),
        }
    }

    pub fn failure(id: i64, error: impl Into<String>) -> Self {
        Self {
            id,
            error: Some(error.into()),
            preview_path: None,
            thumbnail_path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Output record layout: `error` is always present (empty on success) and
/// `response` always carries both keys (empty on failure).
#[derive(Serialize, Deserialize)]
struct WireResult {
    id: i64,
    error: String,
    response: WireResponse,
}

#[derive(Default, Serialize, Deserialize)]
struct WireResponse {
    preview: String,
    thumbnail: String,
}

impl From<JobResult> for WireResult {
    fn from(result: JobResult) -> Self {
        let path = |p: Option<PathBuf>| p.map(|p| p.display().to_string()).unwrap_or_default();
        Self {
            id: result.id,
            error: result.error.unwrap_or_default(),
            response: WireResponse {
                preview: path(result.preview_path),
                thumbnail: path(result.thumbnail_path),
            },
        }
    }
}

impl From<WireResult> for JobResult {
    fn from(wire: WireResult) -> Self {
        if wire.error.is_empty() {
            JobResult::success(
                wire.id,
                wire.response.preview.into(),
                wire.response.thumbnail.into(),
            )
        } else {
            JobResult::failure(wire.id, wire.error)
        }
    }
}

/// A finished job on its way to the output sink.
///
/// In debug mode the rendered files are still owned here and are deleted
/// when the outcome is dropped, which the sink does right after writing the
/// result line.
#[derive(Debug)]
pub struct JobOutcome {
    pub result: JobResult,
    retained: Option<RenderedPair>,
}

impl JobOutcome {
    pub fn new(result: JobResult) -> Self {
        Self {
            result,
            retained: None,
        }
    }

    /// Whether dropping this outcome deletes its output files.
    pub fn is_self_cleaning(&self) -> bool {
        self.retained.is_some()
    }
}

/// Run one job end to end.
pub fn process_job(job: &Job, config: &PipelineConfig, decoder: &dyn RawDecoder) -> JobOutcome {
    process_with(job, config, decoder, write_output)
}

/// [`process_job`] with the output write step supplied by the caller.
pub(crate) fn process_with<W>(
    job: &Job,
    config: &PipelineConfig,
    decoder: &dyn RawDecoder,
    write: W,
) -> JobOutcome
where
    W: Fn(&File, &DecodedImage) -> Result<(), EncodeError>,
{
    let started = Instant::now();

    let outcome = match run(job, config, decoder, write) {
        Ok(pair) if config.debug => JobOutcome {
            result: JobResult::success(
                job.id,
                pair.preview.to_path_buf(),
                pair.thumbnail.to_path_buf(),
            ),
            retained: Some(pair),
        },
        Ok(pair) => match persist(pair) {
            Ok((preview, thumbnail)) => {
                JobOutcome::new(JobResult::success(job.id, preview, thumbnail))
            }
            Err(e) => JobOutcome::new(JobResult::failure(job.id, e.to_string())),
        },
        Err(e) => JobOutcome::new(JobResult::failure(job.id, e.to_string())),
    };

    match &outcome.result.error {
        None => tracing::debug!(
            id = job.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Job finished"
        ),
        Some(error) => tracing::error!(
            id = job.id,
            source = %job.source_path.display(),
            %error,
            "Job failed"
        ),
    }

    outcome
}

fn run<W>(
    job: &Job,
    config: &PipelineConfig,
    decoder: &dyn RawDecoder,
    write: W,
) -> Result<RenderedPair, JobError>
where
    W: Fn(&File, &DecodedImage) -> Result<(), EncodeError>,
{
    let strategy = select_strategy(job.full_width, job.thumb_width, config.preview_width);
    tracing::debug!(id = job.id, ?strategy, source = %job.source_path.display(), "Processing job");

    let temp_dir = config.temp_dir();

    // Start -> SourcePrepared
    let source = prepare_source(decoder, strategy, &job.source_path, &temp_dir)?;
    let bytes = source
        .read_bytes()
        .map_err(|e| JobError::Io(e.to_string()))?;
    // The decoder output is an intermediate; remove it before rendering
    drop(source);

    // SourcePrepared -> Decoded
    let image = decode_image(&bytes)?;
    drop(bytes);

    // Decoded -> Rendered
    Ok(render_with(
        &image,
        config.preview_width,
        config.thumb_width,
        &temp_dir,
        write,
    )?)
}

/// Hand both files over to the caller. A half-kept pair is rolled back.
fn persist(pair: RenderedPair) -> Result<(PathBuf, PathBuf), JobError> {
    let RenderedPair { preview, thumbnail } = pair;

    let preview = preview
        .keep()
        .map_err(|e| JobError::TempFile(e.error.to_string()))?;

    match thumbnail.keep() {
        Ok(thumbnail) => Ok((preview, thumbnail)),
        Err(e) => {
            let _ = std::fs::remove_file(&preview);
            Err(JobError::TempFile(e.error.to_string()))
        }
    }
}
