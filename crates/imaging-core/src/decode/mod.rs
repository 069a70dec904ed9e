//! Image decode capability.
//!
//! This module provides functionality for:
//! - Decoding a byte stream as JPEG, TIFF or PNM (tried in that order)
//! - Applying EXIF orientation to JPEG streams
//! - Resizing rasters to a target width for previews and thumbnails
//!
//! # Decode Order
//!
//! JPEG is tried first because embedded-preview extraction, the cheapest
//! decoder path, produces JPEG. Half and full resolution decodes produce
//! TIFF. PNM is kept for decoders that emit portable pixmaps.
//!
//! # Examples
//!
//! ```ignore
//! use imaging_core::decode::{decode_image, resize_to_width, FilterType};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let preview = resize_to_width(&image, 1200, FilterType::Bilinear).unwrap();
//! ```

mod formats;
mod jpeg;
mod resize;
mod types;

pub use formats::{decode_file, decode_image};
pub use jpeg::decode_jpeg;
pub use resize::{resize, resize_to_width};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, SourceFormat};
