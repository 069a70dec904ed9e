//! Source preparation through an external RAW decoder.
//!
//! The decoder is a capability behind [`RawDecoder`], so the subprocess in
//! [`ExternalDecoder`] can be replaced by an in-process implementation
//! without touching the job processor.
//!
//! A decoder failure is not fatal. If the source still exists it is assumed
//! to be directly viewable (a plain JPEG, say) and is used as-is.

mod external;

use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::job::JobError;
use crate::strategy::ExtractionStrategy;

pub use external::ExternalDecoder;

/// Failures of a single decoder invocation.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to start decoder: {0}")]
    Spawn(String),

    #[error("decoder exited with {0}")]
    Exit(String),

    #[error("decoder I/O error: {0}")]
    Io(String),
}

/// Turns a RAW source into viewable image bytes.
pub trait RawDecoder: Send + Sync {
    /// Decode `source` with `strategy`, writing the image bytes to `output`.
    fn decode_into(
        &self,
        strategy: ExtractionStrategy,
        source: &Path,
        output: &File,
    ) -> Result<(), ExtractError>;
}

/// The byte stream a job decodes, owned by that job.
#[derive(Debug)]
pub enum PreparedSource {
    /// Decoder output. The temporary file is removed when this is dropped.
    Decoded(NamedTempFile),
    /// The original source, used when the decoder could not handle it.
    Original(PathBuf),
}

impl PreparedSource {
    /// Read the whole stream into memory.
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match self {
            PreparedSource::Decoded(file) => std::fs::read(file.path()),
            PreparedSource::Original(path) => std::fs::read(path),
        }
    }

    /// Whether the decoder failed and the original file is being used.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PreparedSource::Original(_))
    }
}

/// Run `decoder` on `source` into a scoped temporary file under `temp_dir`.
///
/// # Errors
///
/// - `JobError::TempFile` if the temporary file cannot be created
/// - `JobError::SourceMissing` if the decoder failed and `source` is gone
pub fn prepare_source(
    decoder: &dyn RawDecoder,
    strategy: ExtractionStrategy,
    source: &Path,
    temp_dir: &Path,
) -> Result<PreparedSource, JobError> {
    let mut output = tempfile::Builder::new()
        .prefix("imaging-src-")
        .tempfile_in(temp_dir)
        .map_err(|e| JobError::TempFile(e.to_string()))?;

    match decoder.decode_into(strategy, source, output.as_file()) {
        Ok(()) => {
            rewind(output.as_file_mut()).map_err(|e| JobError::TempFile(e.to_string()))?;
            Ok(PreparedSource::Decoded(output))
        }
        Err(e) => {
            // The file may have been moved or deleted while queued
            if let Err(stat) = std::fs::metadata(source) {
                if stat.kind() == io::ErrorKind::NotFound {
                    return Err(JobError::SourceMissing);
                }
            }

            tracing::warn!(
                source = %source.display(),
                ?strategy,
                error = %e,
                "Decoder failed, using source file directly"
            );
            // `output` is dropped here, removing the empty temp file
            Ok(PreparedSource::Original(source.to_path_buf()))
        }
    }
}

fn rewind(file: &mut File) -> io::Result<()> {
    file.sync_all()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stand-in decoders for tests.

    use std::io::Write;

    use super::*;

    #[cfg(unix)]
    pub(crate) use super::external::testing::{write_script, CAT_LAST_ARG};

    /// Always fails, like a decoder handed a file it cannot parse.
    pub struct FailingDecoder;

    impl RawDecoder for FailingDecoder {
        fn decode_into(
            &self,
            _strategy: ExtractionStrategy,
            _source: &Path,
            _output: &File,
        ) -> Result<(), ExtractError> {
            Err(ExtractError::Exit("exit status: 1".to_string()))
        }
    }

    /// Copies the source bytes through, like an embedded preview extraction
    /// of a file whose preview is the whole file.
    pub struct PassthroughDecoder;

    impl RawDecoder for PassthroughDecoder {
        fn decode_into(
            &self,
            _strategy: ExtractionStrategy,
            source: &Path,
            mut output: &File,
        ) -> Result<(), ExtractError> {
            let bytes = std::fs::read(source).map_err(|e| ExtractError::Io(e.to_string()))?;
            output
                .write_all(&bytes)
                .map_err(|e| ExtractError::Io(e.to_string()))
        }
    }
}
