//! Core data models for tether safety checks.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or displacement) in the world frame, in meters.
///
/// Serialized as a plain `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Coordinate3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate3D {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when none of the components is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Componentwise minimum.
    pub fn lower(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Componentwise maximum.
    pub fn upper(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl From<[f64; 3]> for Coordinate3D {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Coordinate3D> for [f64; 3] {
    fn from(c: Coordinate3D) -> Self {
        [c.x, c.y, c.z]
    }
}

impl From<(f64, f64, f64)> for Coordinate3D {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

impl Add for Coordinate3D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coordinate3D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Coordinate3D {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Which end of a tether a coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Ground-fixed end
    Anchor,
    /// Drone end
    Tip,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Anchor => f.write_str("anchor"),
            Endpoint::Tip => f.write_str("tip"),
        }
    }
}

/// A tether modeled as the straight segment from its ground anchor to the
/// current drone position.
///
/// Anchor and tip may coincide; a zero-length tether is a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tether {
    pub anchor: Coordinate3D,
    pub tip: Coordinate3D,
}

impl Tether {
    pub fn new(anchor: impl Into<Coordinate3D>, tip: impl Into<Coordinate3D>) -> Self {
        Self {
            anchor: anchor.into(),
            tip: tip.into(),
        }
    }

    /// Displacement from anchor to tip.
    pub fn direction(&self) -> Coordinate3D {
        crate::spatial::vector_between(self.anchor, self.tip)
    }

    /// Length of the tether in meters.
    pub fn length(&self) -> f64 {
        crate::spatial::distance_between(self.anchor, self.tip)
    }

    /// First endpoint with a non-finite component, anchor checked first.
    pub fn non_finite_endpoint(&self) -> Option<Endpoint> {
        if !self.anchor.is_finite() {
            Some(Endpoint::Anchor)
        } else if !self.tip.is_finite() {
            Some(Endpoint::Tip)
        } else {
            None
        }
    }

    /// Point at parameter `s` along the tether (0 = anchor, 1 = tip).
    pub fn point_at(&self, s: f64) -> Coordinate3D {
        self.anchor + self.direction() * s
    }
}
