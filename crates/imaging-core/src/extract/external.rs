//! Subprocess-backed RAW decoder (dcraw command-line compatible).

use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{ExtractError, RawDecoder};
use crate::config::ConfigError;
use crate::strategy::ExtractionStrategy;

/// Flag asking the decoder to write the image to standard output.
const STDOUT_FLAG: &str = "-c";

/// Runs a dcraw-compatible executable once per job.
///
/// There is no timeout: a decoder that hangs holds its worker until it exits.
#[derive(Debug, Clone)]
pub struct ExternalDecoder {
    path: PathBuf,
}

impl ExternalDecoder {
    /// Check that `path` is an executable file and wrap it.
    pub fn locate(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let metadata =
            std::fs::metadata(&path).map_err(|_| ConfigError::DecoderNotFound(path.clone()))?;

        if !metadata.is_file() || !is_executable(&metadata) {
            return Err(ConfigError::DecoderNotExecutable(path));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full argument list for one invocation.
    pub fn args(strategy: ExtractionStrategy, source: &Path) -> Vec<&OsStr> {
        let mut args = vec![OsStr::new(STDOUT_FLAG)];
        args.extend(strategy.decoder_flags().iter().map(|flag| OsStr::new(*flag)));
        args.push(source.as_os_str());
        args
    }
}

impl RawDecoder for ExternalDecoder {
    fn decode_into(
        &self,
        strategy: ExtractionStrategy,
        source: &Path,
        output: &File,
    ) -> Result<(), ExtractError> {
        let stdout = output
            .try_clone()
            .map_err(|e| ExtractError::Io(e.to_string()))?;

        let result = Command::new(&self.path)
            .args(Self::args(strategy, source))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ExtractError::Spawn(e.to_string()))?;

        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(ExtractError::Exit(result.status.to_string()))
        } else {
            Err(ExtractError::Exit(format!("{}: {}", result.status, stderr)))
        }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[cfg(all(test, unix))]
pub(crate) mod testing {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Write an executable `/bin/sh` script named `name` into `dir`.
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A decoder that prints its last argument's contents.
    pub const CAT_LAST_ARG: &str = "for last; do :; done\ncat \"$last\"";
}
