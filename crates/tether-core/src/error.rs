//! Error types for tether safety checks.

use crate::models::Endpoint;
use thiserror::Error;

/// Errors raised before any evaluation work is done.
///
/// Degenerate geometry (zero-length tethers) and too few tethers for the
/// clearance metric are not errors; they show up as absent result fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TetherError {
    /// A safety parameter was zero, negative, NaN or infinite
    #[error("invalid safety parameter {name}: {value} (must be finite and positive)")]
    InvalidParameter { name: &'static str, value: f64 },
    /// A tether endpoint has a NaN or infinite component
    #[error("tether {index} has a non-finite {endpoint} coordinate")]
    NonFiniteCoordinate { index: usize, endpoint: Endpoint },
    /// Adding this tether stretches the snapshot's bounding box past the
    /// largest representable distance
    #[error("tether {index} puts the snapshot extent beyond representable distances")]
    ExtentOverflow { index: usize },
    /// A frame in a sequence contains an invalid tether
    #[error("frame {frame}: {source}")]
    InvalidFrame {
        frame: i64,
        #[source]
        source: Box<TetherError>,
    },
}

impl TetherError {
    /// Index of the offending tether, if the error concerns one.
    pub fn tether_index(&self) -> Option<usize> {
        match self {
            TetherError::InvalidParameter { .. } => None,
            TetherError::NonFiniteCoordinate { index, .. } => Some(*index),
            TetherError::ExtentOverflow { index } => Some(*index),
            TetherError::InvalidFrame { source, .. } => source.tether_index(),
        }
    }
}
