//! Preview and thumbnail rendering.
//!
//! The preview is scaled from the decoded source with a bilinear filter. The
//! thumbnail is scaled from the preview, not the source, with nearest
//! neighbour. Both are JPEG-encoded into fresh temporary files.
//!
//! Either both files come back or neither survives: every error path drops
//! the unpersisted handles, which deletes them.

use std::fs::File;
use std::path::Path;

use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;

use crate::decode::{resize_to_width, DecodeError, DecodedImage, FilterType};
use crate::encode::{write_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};

const PREVIEW_FILTER: FilterType = FilterType::Bilinear;
const THUMBNAIL_FILTER: FilterType = FilterType::Nearest;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create temporary file: {0}")]
    TempFile(String),

    #[error("could not resize image: {0}")]
    Resize(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// The two encoded derivatives. Each path is deleted on drop unless kept.
#[derive(Debug)]
pub struct RenderedPair {
    pub preview: TempPath,
    pub thumbnail: TempPath,
}

/// Render `image` into a preview `preview_width` wide and a thumbnail
/// `thumb_width` wide, both under `temp_dir`.
pub fn render(
    image: &DecodedImage,
    preview_width: u32,
    thumb_width: u32,
    temp_dir: &Path,
) -> Result<RenderedPair, RenderError> {
    render_with(image, preview_width, thumb_width, temp_dir, write_output)
}

/// [`render`] with the final write step supplied by the caller.
pub(crate) fn render_with<W>(
    image: &DecodedImage,
    preview_width: u32,
    thumb_width: u32,
    temp_dir: &Path,
    write: W,
) -> Result<RenderedPair, RenderError>
where
    W: Fn(&File, &DecodedImage) -> Result<(), EncodeError>,
{
    let preview_file = create_output(temp_dir, "imaging-preview-")?;
    let thumb_file = create_output(temp_dir, "imaging-thumb-")?;

    let preview = resize_to_width(image, preview_width, PREVIEW_FILTER)?;
    let thumbnail = resize_to_width(&preview, thumb_width, THUMBNAIL_FILTER)?;

    write(preview_file.as_file(), &preview)?;
    write(thumb_file.as_file(), &thumbnail)?;

    Ok(RenderedPair {
        preview: preview_file.into_temp_path(),
        thumbnail: thumb_file.into_temp_path(),
    })
}

/// Encode `image` as a JPEG into `file`.
pub(crate) fn write_output(file: &File, image: &DecodedImage) -> Result<(), EncodeError> {
    write_jpeg(file, image, DEFAULT_JPEG_QUALITY)
}

fn create_output(temp_dir: &Path, prefix: &str) -> Result<NamedTempFile, RenderError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".jpg")
        .tempfile_in(temp_dir)
        .map_err(|e| RenderError::TempFile(e.to_string()))
}
