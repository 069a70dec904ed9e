//! Image encoding for derivative output.
//!
//! Previews and thumbnails are always written as JPEG at
//! [`DEFAULT_JPEG_QUALITY`].
//!
//! # Examples
//!
//! ```ignore
//! use imaging_core::encode::encode_jpeg;
//!
//! let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
//! let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 90).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, write_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};
