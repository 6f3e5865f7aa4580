//! Per-metric evaluators.
//!
//! Each evaluator is a stateless function over an immutable tether slice.
//! The aggregator in [`crate::safety`] merges their findings into a result.

use crate::models::{Coordinate3D, Tether};
use crate::rules::TetherSafetyCheckParams;
use crate::spatial::{angle_from_vertical, segment_distance, SegmentDistance};

/// Output of [`evaluate_angles`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleFindings {
    /// Largest angle from vertical, absent when no tether has a direction
    pub max_angle: Option<f64>,
    /// Tips of tethers above `max_angle`, in input order
    pub over_threshold: Vec<Coordinate3D>,
}

/// Output of [`evaluate_lengths`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LengthFindings {
    /// Longest tether, absent when there are no tethers
    pub max_length: Option<f64>,
    /// Tips of tethers above `max_length`, in input order
    pub over_threshold: Vec<Coordinate3D>,
}

/// The pair of tethers with the smallest clearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPair {
    /// Index of the first tether, always lower than `second`
    pub first: usize,
    pub second: usize,
    pub approach: SegmentDistance,
}

/// Output of [`evaluate_clearance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceFindings {
    /// Absent when fewer than two tethers were supplied
    pub closest: Option<ClosestPair>,
}

/// Angle from vertical of every tether that has a direction.
///
/// Zero-length tethers are skipped entirely: they neither raise the maximum
/// nor appear among the violations.
pub fn evaluate_angles(tethers: &[Tether], params: &TetherSafetyCheckParams) -> AngleFindings {
    let mut findings = AngleFindings::default();

    for tether in tethers {
        let Some(angle) = angle_from_vertical(tether) else {
            continue;
        };
        findings.max_angle = Some(findings.max_angle.map_or(angle, |max| max.max(angle)));
        if angle > params.max_angle() {
            findings.over_threshold.push(tether.tip);
        }
    }

    findings
}

/// Length of every tether. Zero-length tethers contribute `0`.
pub fn evaluate_lengths(tethers: &[Tether], params: &TetherSafetyCheckParams) -> LengthFindings {
    let mut findings = LengthFindings::default();

    for tether in tethers {
        let length = tether.length();
        findings.max_length = Some(findings.max_length.map_or(length, |max| max.max(length)));
        if length > params.max_length() {
            findings.over_threshold.push(tether.tip);
        }
    }

    findings
}

/// Minimum segment distance over all unordered tether pairs.
///
/// Ties keep the pair that comes first in `(i, j)` order with `i < j`, so
/// the outcome does not depend on how the pair loop is scheduled.
pub fn evaluate_clearance(tethers: &[Tether]) -> DistanceFindings {
    if tethers.len() < 2 {
        return DistanceFindings::default();
    }

    #[cfg(feature = "parallel")]
    let closest = {
        use rayon::prelude::*;
        (0..tethers.len() - 1)
            .into_par_iter()
            .filter_map(|i| closest_in_row(tethers, i))
            .reduce_with(nearer)
    };

    #[cfg(not(feature = "parallel"))]
    let closest = (0..tethers.len() - 1)
        .filter_map(|i| closest_in_row(tethers, i))
        .reduce(nearer);

    DistanceFindings { closest }
}

/// Closest partner `j > i` for tether `i`.
fn closest_in_row(tethers: &[Tether], i: usize) -> Option<ClosestPair> {
    let first = &tethers[i];
    tethers
        .iter()
        .enumerate()
        .skip(i + 1)
        .map(|(j, second)| ClosestPair {
            first: i,
            second: j,
            approach: segment_distance(first, second),
        })
        .reduce(nearer)
}

/// Smaller distance wins; equal distances keep the lower index pair.
fn nearer(a: ClosestPair, b: ClosestPair) -> ClosestPair {
    let a_key = (a.first, a.second);
    let b_key = (b.first, b.second);
    if b.approach.distance < a.approach.distance
        || (b.approach.distance == a.approach.distance && b_key < a_key)
    {
        b
    } else {
        a
    }
}
