//! Tether safety check aggregation.
//!
//! Runs the angle, length and clearance evaluators over one snapshot of
//! tethers and collects their findings into a [`TetherSafetyCheckResult`].

use serde::Serialize;

use crate::error::TetherError;
use crate::metrics::{
    evaluate_angles, evaluate_clearance, evaluate_lengths, AngleFindings, DistanceFindings,
    LengthFindings,
};
use crate::models::{Coordinate3D, Tether};
use crate::rules::TetherSafetyCheckParams;
use crate::spatial::distance_between;

/// Findings of a single tether safety check.
///
/// Every evaluation rebuilds the whole record; nothing carries over from a
/// previous pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TetherSafetyCheckResult {
    max_angle: Option<f64>,
    tethers_over_max_angle: Vec<Coordinate3D>,

    max_length: Option<f64>,
    tethers_over_max_length: Vec<Coordinate3D>,

    min_distance: Option<f64>,
    closest_points: Option<(Coordinate3D, Coordinate3D)>,
    /// Input indices of the tethers realizing `min_distance`
    closest_tethers: Option<(usize, usize)>,
}

impl TetherSafetyCheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest angle from vertical seen in the last pass, in degrees.
    pub fn max_angle(&self) -> Option<f64> {
        self.max_angle
    }

    /// Tips of the tethers over the angle threshold, in input order.
    pub fn tethers_over_max_angle(&self) -> &[Coordinate3D] {
        &self.tethers_over_max_angle
    }

    /// Longest tether seen in the last pass, in meters.
    pub fn max_length(&self) -> Option<f64> {
        self.max_length
    }

    /// Tips of the tethers over the length threshold, in input order.
    pub fn tethers_over_max_length(&self) -> &[Coordinate3D] {
        &self.tethers_over_max_length
    }

    /// Smallest distance between two distinct tethers, in meters.
    ///
    /// Recorded regardless of the clearance threshold.
    pub fn min_distance(&self) -> Option<f64> {
        self.min_distance
    }

    /// One point per tether realizing [`Self::min_distance`].
    pub fn closest_points(&self) -> Option<(Coordinate3D, Coordinate3D)> {
        self.closest_points
    }

    pub fn closest_tethers(&self) -> Option<(usize, usize)> {
        self.closest_tethers
    }

    /// Reset every field to its absent/empty state.
    pub fn clear(&mut self) {
        self.tethers_over_max_length.clear();
        self.tethers_over_max_angle.clear();
        self.closest_points = None;
        self.closest_tethers = None;
        self.min_distance = None;
        self.max_angle = None;
        self.max_length = None;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the observed clearance is below `params.min_distance()`.
    pub fn is_clearance_violated(&self, params: &TetherSafetyCheckParams) -> bool {
        self.min_distance
            .is_some_and(|distance| distance < params.min_distance())
    }

    /// True when any of the three metrics is out of bounds.
    pub fn has_violations(&self, params: &TetherSafetyCheckParams) -> bool {
        !self.tethers_over_max_angle.is_empty()
            || !self.tethers_over_max_length.is_empty()
            || self.is_clearance_violated(params)
    }

    fn apply_angles(&mut self, findings: AngleFindings) {
        self.max_angle = findings.max_angle;
        self.tethers_over_max_angle = findings.over_threshold;
    }

    fn apply_lengths(&mut self, findings: LengthFindings) {
        self.max_length = findings.max_length;
        self.tethers_over_max_length = findings.over_threshold;
    }

    fn apply_clearance(&mut self, findings: DistanceFindings) {
        if let Some(pair) = findings.closest {
            self.min_distance = Some(pair.approach.distance);
            self.closest_points =
                Some((pair.approach.point_on_first, pair.approach.point_on_second));
            self.closest_tethers = Some((pair.first, pair.second));
        }
    }
}

/// Reject the snapshot if any endpoint is NaN or infinite, or if the
/// snapshot spans more than the largest finite distance.
///
/// Within a finite extent every length and pairwise distance is finite.
/// Reports the lowest offending tether index.
pub fn validate_tethers(tethers: &[Tether]) -> Result<(), TetherError> {
    let mut bounds: Option<(Coordinate3D, Coordinate3D)> = None;
    for (index, tether) in tethers.iter().enumerate() {
        if let Some(endpoint) = tether.non_finite_endpoint() {
            return Err(TetherError::NonFiniteCoordinate { index, endpoint });
        }

        let (lo, hi) = bounds.unwrap_or((tether.anchor, tether.anchor));
        let lo = lo.lower(tether.anchor).lower(tether.tip);
        let hi = hi.upper(tether.anchor).upper(tether.tip);
        if !distance_between(lo, hi).is_finite() {
            return Err(TetherError::ExtentOverflow { index });
        }
        bounds = Some((lo, hi));
    }
    Ok(())
}

/// Evaluate one snapshot into a fresh result.
pub fn evaluate(
    tethers: &[Tether],
    params: &TetherSafetyCheckParams,
) -> Result<TetherSafetyCheckResult, TetherError> {
    let mut result = TetherSafetyCheckResult::new();
    evaluate_into(&mut result, tethers, params)?;
    Ok(result)
}

/// Evaluate one snapshot into a caller-owned result buffer.
///
/// On success the buffer is fully overwritten. On failure it is left
/// untouched and the error names the first invalid tether.
pub fn evaluate_into(
    result: &mut TetherSafetyCheckResult,
    tethers: &[Tether],
    params: &TetherSafetyCheckParams,
) -> Result<(), TetherError> {
    if let Err(err) = validate_tethers(tethers) {
        tracing::warn!("Rejected tether snapshot: {}", err);
        return Err(err);
    }

    let (angles, lengths, clearance) = run_evaluators(tethers, params);

    result.clear();
    result.apply_angles(angles);
    result.apply_lengths(lengths);
    result.apply_clearance(clearance);

    tracing::debug!(
        tethers = tethers.len(),
        max_angle = ?result.max_angle,
        max_length = ?result.max_length,
        min_distance = ?result.min_distance,
        over_angle = result.tethers_over_max_angle.len(),
        over_length = result.tethers_over_max_length.len(),
        "Evaluated tether snapshot"
    );

    Ok(())
}

#[cfg(feature = "parallel")]
fn run_evaluators(
    tethers: &[Tether],
    params: &TetherSafetyCheckParams,
) -> (AngleFindings, LengthFindings, DistanceFindings) {
    let ((angles, lengths), clearance) = rayon::join(
        || {
            rayon::join(
                || evaluate_angles(tethers, params),
                || evaluate_lengths(tethers, params),
            )
        },
        || evaluate_clearance(tethers),
    );
    (angles, lengths, clearance)
}

#[cfg(not(feature = "parallel"))]
fn run_evaluators(
    tethers: &[Tether],
    params: &TetherSafetyCheckParams,
) -> (AngleFindings, LengthFindings, DistanceFindings) {
    (
        evaluate_angles(tethers, params),
        evaluate_lengths(tethers, params),
        evaluate_clearance(tethers),
    )
}

/// Stateful checker for a live session.
///
/// Owns the parameters and a result buffer that is rebuilt on every
/// [`TetherSafetyChecker::evaluate`] call. Readers on other threads must
/// serialize access against in-flight evaluations themselves.
#[derive(Debug, Clone, Default)]
pub struct TetherSafetyChecker {
    params: TetherSafetyCheckParams,
    result: TetherSafetyCheckResult,
}

impl TetherSafetyChecker {
    pub fn new(params: TetherSafetyCheckParams) -> Self {
        Self {
            params,
            result: TetherSafetyCheckResult::new(),
        }
    }

    pub fn params(&self) -> &TetherSafetyCheckParams {
        &self.params
    }

    /// Swap in a new parameter set. The current result is kept until the
    /// next evaluation.
    pub fn set_params(&mut self, params: TetherSafetyCheckParams) {
        self.params = params;
    }

    /// Result of the last successful evaluation.
    pub fn result(&self) -> &TetherSafetyCheckResult {
        &self.result
    }

    /// Evaluate a fresh snapshot of tethers.
    pub fn evaluate(
        &mut self,
        tethers: &[Tether],
    ) -> Result<&TetherSafetyCheckResult, TetherError> {
        evaluate_into(&mut self.result, tethers, &self.params)?;
        Ok(&self.result)
    }

    pub fn clear(&mut self) {
        self.result.clear();
    }

    /// Whether the last evaluation found anything out of bounds.
    pub fn has_violations(&self) -> bool {
        self.result.has_violations(&self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Endpoint;

    fn scenario() -> Vec<Tether> {
        vec![
            Tether::new([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]),
            Tether::new([1.0, 0.0, 0.0], [1.0, 0.0, 8.0]),
        ]
    }

    fn scenario_params() -> TetherSafetyCheckParams {
        TetherSafetyCheckParams::new(45.0, 9.0, 0.5).unwrap()
    }

    #[test]
    fn test_two_vertical_tethers() {
        let result = evaluate(&scenario(), &scenario_params()).unwrap();

        assert_eq!(result.max_angle(), Some(0.0));
        assert!(result.tethers_over_max_angle().is_empty());

        assert_eq!(result.max_length(), Some(10.0));
        assert_eq!(
            result.tethers_over_max_length(),
            &[Coordinate3D::new(0.0, 0.0, 10.0)]
        );

        let distance = result.min_distance().unwrap();
        assert!((distance - 1.0).abs() < 1e-9);
        let (p1, p2) = result.closest_points().unwrap();
        assert_eq!(p1.x, 0.0);
        assert_eq!(p2.x, 1.0);
        assert!((p1.z - p2.z).abs() < 1e-9);
        assert!(p1.z >= 0.0 && p1.z <= 8.0);
        assert_eq!(result.closest_tethers(), Some((0, 1)));

        assert!(!result.is_clearance_violated(&scenario_params()));
        assert!(result.has_violations(&scenario_params()));
    }

    #[test]
    fn test_clear_resets_every_field() {
        let mut result = evaluate(&scenario(), &scenario_params()).unwrap();
        assert!(!result.is_empty());

        result.clear();
        assert!(result.is_empty());
        assert_eq!(result.max_angle(), None);
        assert!(result.tethers_over_max_angle().is_empty());
        assert_eq!(result.max_length(), None);
        assert!(result.tethers_over_max_length().is_empty());
        assert_eq!(result.min_distance(), None);
        assert_eq!(result.closest_points(), None);
    }

    #[test]
    fn test_no_tethers_gives_empty_result() {
        let result = evaluate(&[], &TetherSafetyCheckParams::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_invalid_input_leaves_buffer_untouched() {
        let mut result = evaluate(&scenario(), &scenario_params()).unwrap();
        let before = result.clone();

        let mut tethers = scenario();
        tethers.push(Tether::new([0.0, 0.0, 0.0], [0.0, f64::NAN, 3.0]));

        let err = evaluate_into(&mut result, &tethers, &scenario_params()).unwrap_err();
        assert_eq!(
            err,
            TetherError::NonFiniteCoordinate {
                index: 2,
                endpoint: Endpoint::Tip,
            }
        );
        assert_eq!(result, before);
    }

    #[test]
    fn test_huge_finite_coordinates_give_finite_metrics() {
        let tethers = [
            Tether::new([0.0, 0.0, 0.0], [0.0, 0.0, 1e200]),
            Tether::new([1.0, 0.0, 0.0], [1.0, 0.0, 1e200]),
        ];
        let result = evaluate(&tethers, &TetherSafetyCheckParams::default()).unwrap();

        assert_eq!(result.max_angle(), Some(0.0));
        assert!(result.tethers_over_max_angle().is_empty());
        assert_eq!(result.max_length(), Some(1e200));
        assert_eq!(result.tethers_over_max_length().len(), 2);

        let distance = result.min_distance().unwrap();
        assert!((distance - 1.0).abs() < 1e-9, "got {}", distance);
        let (p1, p2) = result.closest_points().unwrap();
        assert!(p1.is_finite() && p2.is_finite());
        assert!(result.is_clearance_violated(&TetherSafetyCheckParams::default()));
    }

    #[test]
    fn test_unrepresentable_extent_is_rejected() {
        let tethers = [
            Tether::new([-1e308, 0.0, 0.0], [-1e308, 0.0, 1.0]),
            Tether::new([1e308, 0.0, 0.0], [1e308, 0.0, 1.0]),
        ];
        let mut result = evaluate(&scenario(), &scenario_params()).unwrap();
        let before = result.clone();

        let err = evaluate_into(&mut result, &tethers, &scenario_params()).unwrap_err();
        assert_eq!(err, TetherError::ExtentOverflow { index: 1 });
        assert_eq!(result, before);

        let single = [Tether::new([0.0, 0.0, -1e308], [0.0, 0.0, 1e308])];
        assert_eq!(
            validate_tethers(&single),
            Err(TetherError::ExtentOverflow { index: 0 })
        );
    }

    #[test]
    fn test_evaluation_replaces_previous_findings() {
        let mut checker = TetherSafetyChecker::new(scenario_params());
        checker.evaluate(&scenario()).unwrap();
        assert!(checker.has_violations());

        let short = [Tether::new([0.0, 0.0, 0.0], [0.0, 0.0, 2.0])];
        let result = checker.evaluate(&short).unwrap();
        assert_eq!(result.max_length(), Some(2.0));
        assert!(result.tethers_over_max_length().is_empty());
        assert_eq!(result.min_distance(), None);
        assert_eq!(result.closest_points(), None);
        assert!(!checker.has_violations());
    }

    #[test]
    fn test_clearance_violation_uses_threshold() {
        let mut checker = TetherSafetyChecker::new(scenario_params());
        checker.evaluate(&scenario()).unwrap();
        assert!(!checker.result().is_clearance_violated(checker.params()));

        checker.set_params(TetherSafetyCheckParams::new(45.0, 20.0, 2.0).unwrap());
        assert!(checker.result().is_clearance_violated(checker.params()));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = evaluate(&scenario(), &scenario_params()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["maxLength"], serde_json::json!(10.0));
        assert_eq!(json["tethersOverMaxLength"], serde_json::json!([[0.0, 0.0, 10.0]]));
        assert_eq!(json["closestTethers"], serde_json::json!([0, 1]));
        assert!(json["tethersOverMaxAngle"].as_array().unwrap().is_empty());
    }
}
