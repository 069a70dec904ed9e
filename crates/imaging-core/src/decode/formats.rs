//! Ordered multi-format decode: JPEG, then TIFF, then PNM.
//!
//! This is not content sniffing. Each decoder is run to completion and the
//! first one that yields a raster wins.

use std::path::Path;

use super::jpeg::decode_jpeg;
use super::{DecodeError, DecodedImage, SourceFormat};

/// Decode a byte stream with the first decoder in [`SourceFormat::ORDER`]
/// that accepts it.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` when every decoder rejects the
/// stream.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    for format in SourceFormat::ORDER {
        match decode_as(bytes, format) {
            Ok(image) => {
                tracing::trace!(?format, width = image.width, height = image.height, "Decoded");
                return Ok(image);
            }
            Err(e) => tracing::trace!(?format, error = %e, "Decoder rejected stream"),
        }
    }

    Err(DecodeError::UnsupportedFormat)
}

/// Read a file fully and decode it with [`decode_image`].
pub fn decode_file(path: &Path) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| DecodeError::IoError(e.to_string()))?;
    decode_image(&bytes)
}

fn decode_as(bytes: &[u8], format: SourceFormat) -> Result<DecodedImage, DecodeError> {
    let decoded = match format {
        SourceFormat::Jpeg => decode_jpeg(bytes)?,
        SourceFormat::Tiff | SourceFormat::Pnm => {
            let img = image::load_from_memory_with_format(bytes, format.to_image_format())
                .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
            DecodedImage::from_rgb_image(img.into_rgb8())
        }
    };

    if decoded.is_empty() {
        return Err(DecodeError::InvalidDimensions {
            width: decoded.width,
            height: decoded.height,
        });
    }
    Ok(decoded)
}
