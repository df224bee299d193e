use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// How much a drawn string lightens each pixel it crosses.
///
/// Implementations must return a value above `luma` unless it is already
/// white; the field clamps the result anyway so that every covered pixel gets
/// at least one unit lighter.
pub trait Darkness: Send + Sync {
    fn compute(&self, luma: u8) -> u8;
}

/// Turns every crossed pixel fully white.
#[derive(Clone, Copy, Debug, Default)]
pub struct Whiten;

impl Darkness for Whiten {
    fn compute(&self, _: u8) -> u8 {
        u8::MAX
    }
}

/// Adds a fixed amount of luminance.
#[derive(Clone, Copy, Debug)]
pub struct FlatDarkness(pub u8);

impl Darkness for FlatDarkness {
    fn compute(&self, luma: u8) -> u8 {
        luma.saturating_add(self.0).max(luma.saturating_add(1))
    }
}

/// Removes a fraction of the remaining darkness.
#[derive(Clone, Copy, Debug)]
pub struct PercentageDarkness(pub f32);

impl Darkness for PercentageDarkness {
    fn compute(&self, luma: u8) -> u8 {
        let darkness = f32::from(u8::MAX - luma);
        let lightened = f32::from(luma) + darkness * self.0.clamp(0.0, 1.0);
        let lightened = lightened.round().clamp(f32::from(luma), f32::from(u8::MAX)) as u8;
        lightened.max(luma.saturating_add(1))
    }
}

impl<D: Darkness + ?Sized> Darkness for &D {
    fn compute(&self, luma: u8) -> u8 {
        (**self).compute(luma)
    }
}

impl<D: Darkness + ?Sized> Darkness for Box<D> {
    fn compute(&self, luma: u8) -> u8 {
        (**self).compute(luma)
    }
}

/// Serializable choice of [`Darkness`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DarknessMode {
    #[default]
    Whiten,
    Flat(u8),
    Percentage(f32),
}

impl DarknessMode {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Flat(0) => Err(ConfigError::ZeroFlatDarkness.into()),
            Self::Percentage(value) if value.is_nan() || value <= 0.0 => {
                Err(ConfigError::NonPositivePercentage(value).into())
            }
            Self::Percentage(value) if value > 1.0 => Err(ConfigError::InvalidPercentage(value).into()),
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Box<dyn Darkness> {
        match *self {
            Self::Whiten => Box::new(Whiten),
            Self::Flat(amount) => Box::new(FlatDarkness(amount)),
            Self::Percentage(fraction) => Box::new(PercentageDarkness(fraction)),
        }
    }
}
