use image::GrayImage;

use crate::{
    darkness::{Darkness, Whiten},
    error::{ConfigError, Error, Result},
    geometry::Point,
    Grid,
};

/// Square grid of 8-bit luminance values, row major. Darker pixels are
/// "owed" string; scoring sums that debt and consuming pays it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuminanceField {
    pixels: Vec<u8>,
    grid: Grid,
}

impl LuminanceField {
    pub fn new(size: usize, pixels: Vec<u8>) -> Result<Self> {
        if size == 0 {
            return Err(ConfigError::EmptyField.into());
        }
        let expected = size * size;
        if pixels.len() != expected {
            return Err(ConfigError::FieldSizeMismatch {
                expected,
                actual: pixels.len(),
            }
            .into());
        }
        Ok(Self {
            pixels,
            grid: Grid::square(size),
        })
    }

    pub fn filled(size: usize, luma: u8) -> Result<Self> {
        Self::new(size, vec![luma; size * size])
    }

    pub fn white(size: usize) -> Result<Self> {
        Self::filled(size, u8::MAX)
    }

    pub fn size(&self) -> usize {
        self.grid.width
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, point: Point) -> Option<u8> {
        self.grid.index_of(point).map(|index| self.pixels[index])
    }

    pub fn set(&mut self, point: Point, luma: u8) -> Result<()> {
        let index = self.index_of(point)?;
        self.pixels[index] = luma;
        Ok(())
    }

    pub fn total_luminance(&self) -> u64 {
        self.pixels.iter().map(|&luma| u64::from(luma)).sum()
    }

    /// Sum of `255 - luma` over the pixels of the chord `a`-`b`.
    pub fn score(&self, a: Point, b: Point) -> Result<u64> {
        self.check_chord(a, b)?;
        Ok(self.chord_score(a, b))
    }

    /// Whitens every pixel of the chord `a`-`b`.
    pub fn consume(&mut self, a: Point, b: Point) -> Result<()> {
        self.consume_with(a, b, &Whiten)
    }

    /// Lightens every pixel of the chord `a`-`b` according to `darkness`.
    pub fn consume_with(&mut self, a: Point, b: Point, darkness: &impl Darkness) -> Result<()> {
        self.check_chord(a, b)?;
        self.lighten_chord(a, b, darkness);
        Ok(())
    }

    pub fn to_image(&self) -> GrayImage {
        // Dimensions come from a validated square grid, so the buffer always fits.
        GrayImage::from_fn(self.size() as u32, self.size() as u32, |x, y| {
            image::Luma([self.pixels[y as usize * self.size() + x as usize]])
        })
    }

    // Both endpoints in bounds implies the whole chord is: a rasterized pixel
    // never leaves the bounding box of its endpoints.
    pub(crate) fn check_chord(&self, a: Point, b: Point) -> Result<()> {
        self.index_of(a)?;
        self.index_of(b)?;
        Ok(())
    }

    /// Callers must have checked the endpoints with [`Self::check_chord`].
    pub(crate) fn chord_score(&self, a: Point, b: Point) -> u64 {
        self.grid
            .get_pixel_indexes_in_segment(a, b)
            .map(|index| u64::from(u8::MAX - self.pixels[index]))
            .sum()
    }

    pub(crate) fn lighten_chord(&mut self, a: Point, b: Point, darkness: &impl Darkness) {
        let grid = self.grid;
        for index in grid.get_pixel_indexes_in_segment(a, b) {
            let luma = &mut self.pixels[index];
            *luma = darkness.compute(*luma).max(luma.saturating_add(1));
        }
    }

    fn index_of(&self, point: Point) -> Result<usize> {
        self.grid
            .index_of(point)
            .ok_or_else(|| Error::out_of_bounds(point, self.grid))
    }
}

impl TryFrom<GrayImage> for LuminanceField {
    type Error = Error;

    fn try_from(image: GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(ConfigError::NonSquareField {
                width: width as usize,
                height: height as usize,
            }
            .into());
        }
        Self::new(width as usize, image.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::darkness::FlatDarkness;

    fn p(x: isize, y: isize) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn rejects_empty_and_mismatched_fields() {
        assert!(matches!(
            LuminanceField::new(0, vec![]),
            Err(Error::InvalidConfiguration(ConfigError::EmptyField))
        ));
        assert!(matches!(
            LuminanceField::new(3, vec![0; 8]),
            Err(Error::InvalidConfiguration(ConfigError::FieldSizeMismatch {
                expected: 9,
                actual: 8
            }))
        ));
    }

    #[test]
    fn score_sums_darkness_along_the_chord() {
        let mut field = LuminanceField::white(5).unwrap();
        field.set(p(1, 0), 0).unwrap();
        field.set(p(3, 0), 200).unwrap();
        field.set(p(3, 1), 0).unwrap();
        assert_eq!(field.score(p(0, 0), p(4, 0)).unwrap(), 255 + 55);
        assert_eq!(field.score(p(4, 0), p(0, 0)).unwrap(), 255 + 55);
    }

    #[test]
    fn white_field_scores_zero() {
        let field = LuminanceField::white(8).unwrap();
        assert_eq!(field.score(p(0, 0), p(7, 5)).unwrap(), 0);
        assert_eq!(field.score(p(2, 2), p(2, 2)).unwrap(), 0);
    }

    #[test]
    fn score_rejects_points_outside_the_field() {
        let field = LuminanceField::white(4).unwrap();
        let err = field.score(p(0, 0), p(4, 1)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { point, .. } if point == p(4, 1)));
    }

    #[test]
    fn consume_whitens_the_chord_and_nothing_else() {
        let mut field = LuminanceField::filled(6, 10).unwrap();
        field.consume(p(0, 0), p(5, 5)).unwrap();
        for i in 0..6 {
            assert_eq!(field.get(p(i, i)), Some(255));
        }
        assert_eq!(field.get(p(1, 0)), Some(10));
        assert_eq!(field.score(p(5, 5), p(0, 0)).unwrap(), 0);

        let before = field.clone();
        field.consume(p(0, 0), p(5, 5)).unwrap();
        assert_eq!(field, before);
    }

    #[test]
    fn consume_with_never_darkens() {
        let mut field = LuminanceField::filled(3, 100).unwrap();
        field.set(p(2, 0), 250).unwrap();
        field.consume_with(p(0, 0), p(2, 0), &FlatDarkness(20)).unwrap();
        assert_eq!(field.get(p(0, 0)), Some(120));
        assert_eq!(field.get(p(2, 0)), Some(255));
        assert_eq!(field.get(p(0, 1)), Some(100));
    }

    #[test]
    fn consume_with_lightens_even_when_darkness_does_not() {
        struct Idle;

        impl Darkness for Idle {
            fn compute(&self, luma: u8) -> u8 {
                luma
            }
        }

        let mut field = LuminanceField::filled(4, 0).unwrap();
        field.set(p(3, 0), 255).unwrap();
        let before = field.total_luminance();
        field.consume_with(p(0, 0), p(3, 0), &Idle).unwrap();
        assert_eq!(field.get(p(0, 0)), Some(1));
        assert_eq!(field.get(p(3, 0)), Some(255));
        assert_eq!(field.total_luminance(), before + 3);
    }

    #[test]
    fn image_round_trip_keeps_layout() {
        let mut field = LuminanceField::white(4).unwrap();
        field.set(p(3, 1), 7).unwrap();
        let image = field.to_image();
        assert_eq!(image.get_pixel(3, 1).0, [7]);
        assert_eq!(LuminanceField::try_from(image).unwrap(), field);
    }

    #[test]
    fn non_square_images_are_rejected() {
        let image = GrayImage::new(4, 3);
        assert!(matches!(
            LuminanceField::try_from(image),
            Err(Error::InvalidConfiguration(ConfigError::NonSquareField { width: 4, height: 3 }))
        ));
    }
}
