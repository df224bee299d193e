pub mod geometry {
    pub mod circle;
    pub mod line;
    pub mod point;

    pub use circle::Circle;
    pub use line::{rasterize, Line};
    pub use point::Point;
}

mod algorithm;
pub mod config;
pub mod darkness;
pub mod error;
mod field;
pub mod grid;
pub mod hooks;
pub mod raster;
pub mod verboser;

pub use algorithm::*;
pub use config::Config;
pub use darkness::{Darkness, DarknessMode, FlatDarkness, PercentageDarkness, Whiten};
pub use error::{ConfigError, Error, Result};
pub use field::LuminanceField;
pub use grid::Grid;
pub use hooks::{hooks, Hook, HookTable};
