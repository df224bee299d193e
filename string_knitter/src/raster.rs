//! Bridges between image files and [`LuminanceField`]s.
use std::path::Path;

use image::{imageops::FilterType, DynamicImage};

use crate::{
    error::{ConfigError, Result},
    LuminanceField,
};

/// Grayscale first, then resample to `size x size`. The aspect ratio is not
/// preserved: the source is expected to be square already.
pub fn field_from_image(image: &DynamicImage, size: u32, filter: FilterType) -> Result<LuminanceField> {
    if size == 0 {
        return Err(ConfigError::EmptyField.into());
    }
    let gray = image.to_luma8();
    let resized = image::imageops::resize(&gray, size, size, filter);
    LuminanceField::try_from(resized)
}

pub fn load_field(path: impl AsRef<Path>, size: u32, filter: FilterType) -> Result<LuminanceField> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), size, "loading source image");
    let image = image::open(path)?;
    if image.width() != image.height() {
        tracing::warn!(
            width = image.width(),
            height = image.height(),
            "source image is not square, it will be stretched"
        );
    }
    field_from_image(&image, size, filter)
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, RgbImage};

    use super::*;
    use crate::geometry::Point;

    #[test]
    fn converts_to_gray_before_resizing() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0])));
        let field = field_from_image(&image, 8, FilterType::Triangle).unwrap();
        assert_eq!(field.size(), 8);
        assert!(field.pixels().iter().all(|&luma| luma == 0));
    }

    #[test]
    fn keeps_dark_regions_where_they_were() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([255]));
        for y in 0..10 {
            for x in 0..5 {
                gray.put_pixel(x, y, Luma([0]));
            }
        }
        let field = field_from_image(&DynamicImage::ImageLuma8(gray), 10, FilterType::Nearest).unwrap();
        assert_eq!(field.get(Point::new(1, 4)), Some(0));
        assert_eq!(field.get(Point::new(8, 4)), Some(255));
    }

    #[test]
    fn zero_size_is_rejected() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert!(field_from_image(&image, 0, FilterType::Nearest).is_err());
    }

    #[test]
    fn missing_files_surface_as_image_errors() {
        let err = load_field("/definitely/not/here.png", 10, FilterType::Nearest).unwrap_err();
        assert!(matches!(err, crate::Error::Image(_)));
    }
}
