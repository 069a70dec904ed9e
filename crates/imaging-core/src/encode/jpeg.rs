//! JPEG encoding for preview and thumbnail output.
//!
//! This module provides JPEG encoding using the `image` crate's JPEG encoder,
//! either into memory or straight into a writer such as a temporary file.

use std::io::{BufWriter, Cursor, Write};

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use crate::decode::DecodedImage;

/// Quality used for every derivative; matches the encoder's stock default.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// Writing the encoded bytes failed
    #[error("Failed to write JPEG: {0}")]
    Io(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());
    encode_into(&mut buffer, pixels, width, height, quality)?;
    Ok(buffer.into_inner())
}

/// Encode a decoded raster as JPEG into `writer`, flushing before returning.
pub fn write_jpeg<W: Write>(
    writer: W,
    image: &DecodedImage,
    quality: u8,
) -> Result<(), EncodeError> {
    let mut writer = BufWriter::new(writer);
    encode_into(&mut writer, &image.pixels, image.width, image.height, quality)?;
    writer.flush().map_err(|e| EncodeError::Io(e.to_string()))
}

fn encode_into<W: Write>(
    writer: &mut W,
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    JpegEncoder::new_with_quality(writer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=50, 1u32..=50)
    }

    proptest! {
        /// Property: Encoding always produces valid JPEG when given valid input.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            (width, height) in dimensions_strategy(),
            quality in 0u8..=255,
        ) {
            let size = (width as usize) * (height as usize) * 3;
            let pixels = vec![128u8; size];

            let result = encode_jpeg(&pixels, width, height, quality);
            prop_assert!(result.is_ok(), "Valid input should produce valid output");

            let jpeg_bytes = result.unwrap();
            prop_assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8], "Should have SOI marker");
            let len = jpeg_bytes.len();
            prop_assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9], "Should have EOI marker");
        }

        /// Property: Encoded output decodes back to the same dimensions.
        #[test]
        fn prop_encoded_dimensions_survive_decode(
            (width, height) in dimensions_strategy(),
        ) {
            let image = DecodedImage::new(width, height, vec![90u8; (width * height * 3) as usize]);
            let mut out = Vec::new();
            write_jpeg(&mut out, &image, DEFAULT_JPEG_QUALITY).unwrap();

            let decoded = crate::decode::decode_image(&out).unwrap();
            prop_assert_eq!((decoded.width, decoded.height), (width, height));
        }

        /// Property: Mismatched pixel data length always returns error.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in dimensions_strategy(),
            delta in 1usize..=10,
            longer in any::<bool>(),
        ) {
            let expected_size = (width as usize) * (height as usize) * 3;
            let actual_size = if longer { expected_size + delta } else { expected_size - delta.min(expected_size) };
            prop_assume!(actual_size != expected_size);

            let result = encode_jpeg(&vec![128u8; actual_size], width, height, 90);
            prop_assert!(
                matches!(result, Err(EncodeError::InvalidPixelData { .. })),
                "Mismatched pixel data should return InvalidPixelData error"
            );
        }
    }
}
