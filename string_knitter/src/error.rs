//! Error type and result alias for the crate.
//!
//! Every failure is reported before the first string is drawn: a run either
//! returns its full path or nothing.
use thiserror::Error;

use crate::geometry::Point;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("point {point} lies outside the {width}x{height} field")]
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one hook is required")]
    NoHooks,
    #[error("at least one string is required")]
    NoStrings,
    #[error("the hook circle needs a positive radius")]
    ZeroRadius,
    #[error("the luminance field is empty")]
    EmptyField,
    #[error("the luminance field must be square, got {width}x{height}")]
    NonSquareField { width: usize, height: usize },
    #[error("expected {expected} luminance values, got {actual}")]
    FieldSizeMismatch { expected: usize, actual: usize },
    #[error("{name} must be a positive finite length, got {value}")]
    InvalidLength { name: &'static str, value: f32 },
    #[error("the string ({string}mm) is thicker than the circle ({circle}mm)")]
    StringTooThick { string: f32, circle: f32 },
    #[error("resolution {0} is too small, at least 2 pixels are required")]
    ResolutionTooSmall(u32),
    #[error("percentage darkness must not exceed 1, got {0}")]
    InvalidPercentage(f32),
    #[error("percentage darkness must be positive, got {0}")]
    NonPositivePercentage(f32),
    #[error("flat darkness must lighten by at least 1")]
    ZeroFlatDarkness,
    #[error("scaling a {size}px field by {scale} does not fit in an image")]
    ScaleTooLarge { size: usize, scale: u32 },
}

impl Error {
    pub(crate) fn out_of_bounds(point: Point, grid: crate::Grid) -> Self {
        Self::OutOfBounds {
            point,
            width: grid.width,
            height: grid.height,
        }
    }
}
