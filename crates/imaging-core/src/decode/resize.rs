//! Image resizing for preview and thumbnail generation.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is zero.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Scale an image to `width`, deriving the height from the source aspect ratio.
///
/// Unlike a fit-to-box resize this always lands on exactly `width`, upscaling
/// sources narrower than the target.
pub fn resize_to_width(
    image: &DecodedImage,
    width: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    let height = height_for_width(image.width, image.height, width);
    if image.is_empty() || height == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    resize(image, width, height, filter)
}

/// Height that keeps `src_width:src_height` at `width`, rounded, never below 1.
fn height_for_width(src_width: u32, src_height: u32, width: u32) -> u32 {
    if src_width == 0 || src_height == 0 || width == 0 {
        return 0;
    }

    let height = (src_height as f64 * width as f64 / src_width as f64).round() as u32;
    height.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(resize(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&img, 50, 0, FilterType::Nearest).is_err());
    }

    #[test]
    fn test_resize_to_width_landscape() {
        let img = create_test_image(600, 400);
        let resized = resize_to_width(&img, 120, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 120);
        assert_eq!(resized.height, 80);
    }

    #[test]
    fn test_resize_to_width_portrait() {
        let img = create_test_image(300, 500);
        let resized = resize_to_width(&img, 40, FilterType::Nearest).unwrap();

        assert_eq!(resized.width, 40);
        assert_eq!(resized.height, 67); // 500 * 40 / 300 = 66.67
    }

    #[test]
    fn test_resize_to_width_upscales() {
        let img = create_test_image(50, 25);
        let resized = resize_to_width(&img, 100, FilterType::Bilinear).unwrap();

        assert_eq!((resized.width, resized.height), (100, 50));
    }

    #[test]
    fn test_resize_to_width_zero_target() {
        let img = create_test_image(50, 25);
        assert!(matches!(
            resize_to_width(&img, 0, FilterType::Bilinear),
            Err(DecodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_resize_to_width_empty_source() {
        let img = DecodedImage::new(0, 0, vec![]);
        assert!(resize_to_width(&img, 10, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_height_for_width_keeps_thin_strips_visible() {
        assert_eq!(height_for_width(10_000, 1, 100), 1);
        assert_eq!(height_for_width(6000, 4000, 1200), 800);
        assert_eq!(height_for_width(0, 0, 1200), 0);
    }
}
