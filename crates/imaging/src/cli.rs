//! Command-line and environment configuration.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use imaging_core::config::{sibling_decoder_path, DEFAULT_PREVIEW_WIDTH, DEFAULT_THUMB_WIDTH};
use imaging_core::PipelineConfig;

/// Reads JSON jobs from stdin, one per line, and writes a JPEG preview and
/// thumbnail for each. Successful results go to stdout, failures to stderr.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the dcraw-json decoder [default: dcraw-json next to this binary]
    #[arg(long = "dcraw", env = "IMAGING_DCRAW", value_name = "PATH")]
    pub dcraw: Option<PathBuf>,

    /// Preview image width
    #[arg(
        long,
        alias = "previewWidth",
        env = "IMAGING_PREVIEW_WIDTH",
        default_value_t = DEFAULT_PREVIEW_WIDTH
    )]
    pub preview_width: u32,

    /// Thumbnail image width
    #[arg(
        long,
        alias = "thumbWidth",
        env = "IMAGING_THUMB_WIDTH",
        default_value_t = DEFAULT_THUMB_WIDTH
    )]
    pub thumb_width: u32,

    /// Debug mode: verbose logs, outputs deleted right after being reported
    #[arg(long, env = "IMAGING_DEBUG", default_value_t = true, action = ArgAction::Set)]
    pub debug: bool,

    /// Concurrent jobs [default: available parallelism]
    #[arg(long, env = "IMAGING_WORKERS")]
    pub workers: Option<usize>,

    /// Directory for temporary and output files [default: system temp dir]
    #[arg(long, env = "IMAGING_TEMP_DIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl Args {
    /// Build the pipeline configuration. `exe` locates the default decoder.
    pub fn pipeline_config(&self, exe: Option<&Path>) -> PipelineConfig {
        let decoder_path = self.dcraw.clone().unwrap_or_else(|| match exe {
            Some(exe) => sibling_decoder_path(exe),
            None => PipelineConfig::default().decoder_path,
        });

        PipelineConfig {
            preview_width: self.preview_width,
            thumb_width: self.thumb_width,
            decoder_path,
            debug: self.debug,
            temp_dir: self.temp_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("imaging").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let config = args.pipeline_config(Some(Path::new("/usr/local/bin/imaging")));

        assert_eq!(config.preview_width, 1200);
        assert_eq!(config.thumb_width, 400);
        assert!(config.debug);
        assert_eq!(config.decoder_path, PathBuf::from("/usr/local/bin/dcraw-json"));
        assert!(config.temp_dir.is_none());
        assert!(args.workers.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--dcraw",
            "/opt/dcraw",
            "--preview-width",
            "800",
            "--thumbWidth",
            "200",
            "--debug",
            "false",
            "--workers",
            "3",
            "--temp-dir",
            "/scratch",
        ]);
        let config = args.pipeline_config(None);

        assert_eq!(config.decoder_path, PathBuf::from("/opt/dcraw"));
        assert_eq!((config.preview_width, config.thumb_width), (800, 200));
        assert!(!config.debug);
        assert_eq!(config.temp_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(args.workers, Some(3));
    }

    #[test]
    fn test_rejects_bad_width() {
        let parsed = Args::try_parse_from(["imaging", "--preview-width", "-4"]);
        assert!(parsed.is_err());
    }
}
