//! Tether safety analysis for tethered drone shows.
//!
//! Given the anchor and tip of every tether at an instant (or over a
//! sequence of frames), reports the largest angle from vertical, the
//! longest tether and the smallest clearance between two tethers, along
//! with the tethers or point pairs responsible for each violation.

pub mod error;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod safety;
pub mod sequence;
pub mod spatial;

pub use error::TetherError;
pub use metrics::{
    evaluate_angles, evaluate_clearance, evaluate_lengths, AngleFindings, ClosestPair,
    DistanceFindings, LengthFindings,
};
pub use models::{Coordinate3D, Endpoint, Tether};
pub use rules::{round_to, TetherSafetyCheckParams, TetherSafetyCheckParamsView, DEFAULT_NDIGITS};
pub use safety::{
    evaluate, evaluate_into, validate_tethers, TetherSafetyCheckResult, TetherSafetyChecker,
};
pub use sequence::{check_frames, Frame, FrameReport, FrameValue, SequenceReport, SequenceSummary};
pub use spatial::{
    angle_from_vertical, distance_between, norm, segment_distance, vector_between,
    SegmentDistance,
};
