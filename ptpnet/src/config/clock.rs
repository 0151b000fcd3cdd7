use rand::Rng;

use super::ConfigError;
use crate::clock::NodeId;

/// Construction parameters of a single slave clock
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClockConfig {
    pub id: NodeId,
    /// Distance from the master, in links
    pub hop: u16,
    /// Multiplicative error of the clock rate
    pub drift: f64,
}

/// Range the drift factor of slave clocks is drawn from
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(deny_unknown_fields)
)]
pub struct DriftRange {
    pub min: f64,
    pub max: f64,
}

impl Default for DriftRange {
    /// Within 0.6% of nominal
    fn default() -> Self {
        Self {
            min: 0.994,
            max: 1.006,
        }
    }
}

impl DriftRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        let range = Self { min, max };
        range.check()?;
        Ok(range)
    }

    /// A range that always yields `drift`
    pub fn fixed(drift: f64) -> Result<Self, ConfigError> {
        Self::new(drift, drift)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        let valid = self.min.is_finite()
            && self.max.is_finite()
            && self.min > 0.0
            && self.min <= self.max;

        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidDriftRange {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Draw a drift factor uniformly from `[min, max)`
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }
}
