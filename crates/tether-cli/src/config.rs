//! Checker configuration from environment.

use std::env;

use tether_core::{TetherError, TetherSafetyCheckParams, DEFAULT_NDIGITS};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub max_angle: f64,
    pub max_length: f64,
    pub min_distance: f64,
    pub ndigits: u32,
}

impl Default for Config {
    fn default() -> Self {
        let params = TetherSafetyCheckParams::default();
        Self {
            max_angle: params.max_angle(),
            max_length: params.max_length(),
            min_distance: params.min_distance(),
            ndigits: DEFAULT_NDIGITS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing or unparsable values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_angle: lookup("TETHER_MAX_ANGLE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_angle),
            max_length: lookup("TETHER_MAX_LENGTH")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_length),
            min_distance: lookup("TETHER_MIN_DISTANCE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.min_distance),
            ndigits: lookup("TETHER_NDIGITS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.ndigits),
        }
    }

    /// Apply command line overrides on top of this config.
    pub fn with_overrides(
        mut self,
        max_angle: Option<f64>,
        max_length: Option<f64>,
        min_distance: Option<f64>,
        ndigits: Option<u32>,
    ) -> Self {
        if let Some(value) = max_angle {
            self.max_angle = value;
        }
        if let Some(value) = max_length {
            self.max_length = value;
        }
        if let Some(value) = min_distance {
            self.min_distance = value;
        }
        if let Some(value) = ndigits {
            self.ndigits = value;
        }
        self
    }

    pub fn params(&self) -> Result<TetherSafetyCheckParams, TetherError> {
        TetherSafetyCheckParams::new(self.max_angle, self.max_length, self.min_distance)
    }
}
