//! Run parameters, expressed the way a frame is built: physical sizes in
//! millimetres, from which the working resolution follows.
use serde::{Deserialize, Serialize};

use crate::{
    algorithm::Selection,
    darkness::DarknessMode,
    error::{ConfigError, Result},
    geometry::{Circle, Point},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hook_count: usize,
    pub string_count: usize,
    /// Diameter of the hook circle in millimetres.
    pub circle_diameter: f32,
    /// Diameter of the string in millimetres. One string covers one pixel.
    pub string_diameter: f32,
    pub selection: Selection,
    pub darkness: DarknessMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hook_count: 200,
            string_count: 1500,
            circle_diameter: 600.0,
            string_diameter: 0.3,
            selection: Selection::Sequential,
            darkness: DarknessMode::Whiten,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.hook_count == 0 {
            return Err(ConfigError::NoHooks.into());
        }
        if self.string_count == 0 {
            return Err(ConfigError::NoStrings.into());
        }
        for (name, value) in [
            ("circle diameter", self.circle_diameter),
            ("string diameter", self.string_diameter),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidLength { name, value }.into());
            }
        }
        if self.string_diameter > self.circle_diameter {
            return Err(ConfigError::StringTooThick {
                string: self.string_diameter,
                circle: self.circle_diameter,
            }
            .into());
        }
        self.darkness.validate()?;
        let resolution = self.resolution();
        if resolution < 2 {
            return Err(ConfigError::ResolutionTooSmall(resolution).into());
        }
        Ok(())
    }

    /// Side of the square field in pixels, chosen so the string is one pixel
    /// wide.
    pub fn resolution(&self) -> u32 {
        let ratio = f64::from(self.circle_diameter) / f64::from(self.string_diameter);
        // Float to int `as` saturates, which keeps absurd ratios representable.
        ratio.round() as u32
    }

    /// The largest circle centred in a `size` field whose rounded hook
    /// positions all stay inside it.
    pub fn circle(size: usize) -> Result<Circle> {
        let radius = size.saturating_sub(1) / 2;
        if radius == 0 {
            return Err(ConfigError::ZeroRadius.into());
        }
        let center = (size / 2) as isize;
        Ok(Circle::new(Point::new(center, center), radius))
    }
}
