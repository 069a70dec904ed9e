//! Process-wide pipeline configuration.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default preview width in pixels.
pub const DEFAULT_PREVIEW_WIDTH: u32 = 1200;
/// Default thumbnail width in pixels.
pub const DEFAULT_THUMB_WIDTH: u32 = 400;
/// File name of the external decoder, looked up next to the running binary.
pub const DEFAULT_DECODER_NAME: &str = "dcraw-json";

/// Errors raised while building or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroWidth { name: &'static str },

    #[error("decoder not found at {0}")]
    DecoderNotFound(PathBuf),

    #[error("decoder at {0} is not an executable file")]
    DecoderNotExecutable(PathBuf),
}

/// Settings shared read-only by every job. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Width of the preview derivative.
    pub preview_width: u32,
    /// Width of the thumbnail derivative.
    pub thumb_width: u32,
    /// Path of the external RAW decoder executable.
    pub decoder_path: PathBuf,
    /// Delete outputs right after their result is emitted (load testing).
    pub debug: bool,
    /// Where temporary artifacts are created. `None` means the OS temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preview_width: DEFAULT_PREVIEW_WIDTH,
            thumb_width: DEFAULT_THUMB_WIDTH,
            decoder_path: PathBuf::from(DEFAULT_DECODER_NAME),
            debug: true,
            temp_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Reject widths the pipeline cannot render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_width == 0 {
            return Err(ConfigError::ZeroWidth {
                name: "preview width",
            });
        }
        if self.thumb_width == 0 {
            return Err(ConfigError::ZeroWidth {
                name: "thumbnail width",
            });
        }
        Ok(())
    }

    /// Directory for temporary artifacts.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Default decoder location: `dcraw-json` in the same directory as `exe`.
pub fn sibling_decoder_path(exe: &Path) -> PathBuf {
    exe.parent()
        .map(|dir| dir.join(DEFAULT_DECODER_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DECODER_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.preview_width, 1200);
        assert_eq!(config.thumb_width, 400);
        assert!(config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_widths_rejected() {
        let mut config = PipelineConfig::default();
        config.thumb_width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroWidth {
                name: "thumbnail width"
            })
        ));

        let mut config = PipelineConfig::default();
        config.preview_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temp_dir_override() {
        let mut config = PipelineConfig::default();
        assert_eq!(config.temp_dir(), std::env::temp_dir());

        config.temp_dir = Some(PathBuf::from("/var/tmp/imaging"));
        assert_eq!(config.temp_dir(), PathBuf::from("/var/tmp/imaging"));
    }

    #[test]
    fn test_sibling_decoder_path() {
        assert_eq!(
            sibling_decoder_path(Path::new("/opt/imaging/bin/imaging")),
            PathBuf::from("/opt/imaging/bin/dcraw-json")
        );
    }
}
