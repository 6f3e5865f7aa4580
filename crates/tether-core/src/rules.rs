//! Safety thresholds for tether checks.

use crate::error::TetherError;
use serde::{Deserialize, Serialize};

/// Default rounding precision of [`TetherSafetyCheckParams::to_view`].
pub const DEFAULT_NDIGITS: u32 = 3;

/// Tether-specific safety check parameters.
///
/// Immutable once constructed; reconfiguring means building a new value.
/// Every field is finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams", rename_all = "camelCase")]
pub struct TetherSafetyCheckParams {
    /// Maximum deviation from vertical in degrees
    max_angle: f64,
    /// Maximum tether length in meters
    max_length: f64,
    /// Minimum distance between tethers in meters
    min_distance: f64,
}

impl Default for TetherSafetyCheckParams {
    fn default() -> Self {
        Self {
            max_angle: 45.0,
            max_length: 50.0,
            min_distance: 5.0,
        }
    }
}

impl TetherSafetyCheckParams {
    /// Create a validated parameter set.
    ///
    /// # Arguments
    /// * `max_angle` - Maximum deviation from vertical in degrees
    /// * `max_length` - Maximum tether length in meters
    /// * `min_distance` - Minimum clearance between two tethers in meters
    pub fn new(max_angle: f64, max_length: f64, min_distance: f64) -> Result<Self, TetherError> {
        Ok(Self {
            max_angle: positive("maxAngle", max_angle)?,
            max_length: positive("maxLength", max_length)?,
            min_distance: positive("minDistance", min_distance)?,
        })
    }

    pub fn max_angle(&self) -> f64 {
        self.max_angle
    }

    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// Rounded, read-only projection for display and export.
    ///
    /// Each field is rounded to `ndigits` decimal places with
    /// [`round_to`]; nothing else is transformed.
    pub fn to_view(&self, ndigits: u32) -> TetherSafetyCheckParamsView {
        TetherSafetyCheckParamsView {
            max_angle: round_to(self.max_angle, ndigits),
            max_length: round_to(self.max_length, ndigits),
            min_distance: round_to(self.min_distance, ndigits),
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, TetherError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TetherError::InvalidParameter { name, value })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawParams {
    max_angle: f64,
    max_length: f64,
    min_distance: f64,
}

impl Default for RawParams {
    fn default() -> Self {
        let params = TetherSafetyCheckParams::default();
        Self {
            max_angle: params.max_angle,
            max_length: params.max_length,
            min_distance: params.min_distance,
        }
    }
}

impl TryFrom<RawParams> for TetherSafetyCheckParams {
    type Error = TetherError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        Self::new(raw.max_angle, raw.max_length, raw.min_distance)
    }
}

/// Serialized shape of the parameters: `maxAngle`, `maxLength`, `minDistance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TetherSafetyCheckParamsView {
    pub max_angle: f64,
    pub max_length: f64,
    pub min_distance: f64,
}

/// Round `value` to `ndigits` decimal places, halves away from zero.
///
/// Values whose scaled form would overflow are returned unchanged.
pub fn round_to(value: f64, ndigits: u32) -> f64 {
    let scale = 10f64.powi(ndigits.min(i32::MAX as u32) as i32);
    let scaled = value * scale;
    if !scale.is_finite() || !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}
