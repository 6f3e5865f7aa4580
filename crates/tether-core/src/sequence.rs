//! Safety checks over a sequence of frames.
//!
//! Each frame is an independent snapshot; the summary records where each
//! metric was at its worst and which frames were out of bounds.

use serde::{Deserialize, Serialize};

use crate::error::TetherError;
use crate::models::Tether;
use crate::rules::TetherSafetyCheckParams;
use crate::safety::{evaluate, validate_tethers, TetherSafetyCheckResult};

/// Tether snapshot at one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub frame: i64,
    pub tethers: Vec<Tether>,
}

impl Frame {
    pub fn new(frame: i64, tethers: Vec<Tether>) -> Self {
        Self { frame, tethers }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: i64,
    pub result: TetherSafetyCheckResult,
}

/// A metric value and the frame where it was first observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameValue {
    pub value: f64,
    pub frame: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub max_angle: Option<FrameValue>,
    pub max_length: Option<FrameValue>,
    pub min_distance: Option<FrameValue>,
    /// Frames with at least one tether over the angle threshold
    pub angle_violation_frames: Vec<i64>,
    /// Frames with at least one tether over the length threshold
    pub length_violation_frames: Vec<i64>,
    /// Frames whose clearance is below the minimum distance
    pub clearance_violation_frames: Vec<i64>,
}

impl SequenceSummary {
    pub fn has_violations(&self) -> bool {
        !self.angle_violation_frames.is_empty()
            || !self.length_violation_frames.is_empty()
            || !self.clearance_violation_frames.is_empty()
    }

    fn record(
        &mut self,
        frame: i64,
        result: &TetherSafetyCheckResult,
        params: &TetherSafetyCheckParams,
    ) {
        if let Some(angle) = result.max_angle() {
            keep_if(&mut self.max_angle, angle, frame, |new, old| new > old);
        }
        if let Some(length) = result.max_length() {
            keep_if(&mut self.max_length, length, frame, |new, old| new > old);
        }
        if let Some(distance) = result.min_distance() {
            keep_if(&mut self.min_distance, distance, frame, |new, old| new < old);
        }

        if !result.tethers_over_max_angle().is_empty() {
            self.angle_violation_frames.push(frame);
        }
        if !result.tethers_over_max_length().is_empty() {
            self.length_violation_frames.push(frame);
        }
        if result.is_clearance_violated(params) {
            self.clearance_violation_frames.push(frame);
        }
    }
}

/// Replace `slot` only when `better(value, current)`, so ties keep the
/// earlier frame.
fn keep_if(
    slot: &mut Option<FrameValue>,
    value: f64,
    frame: i64,
    better: impl Fn(f64, f64) -> bool,
) {
    let replace = slot
        .as_ref()
        .map(|current| better(value, current.value))
        .unwrap_or(true);
    if replace {
        *slot = Some(FrameValue { value, frame });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SequenceReport {
    pub frames: Vec<FrameReport>,
    pub summary: SequenceSummary,
}

/// Check every frame in order.
///
/// All frames are validated up front; if any frame is rejected nothing is
/// evaluated and the error names that frame.
pub fn check_frames(
    frames: &[Frame],
    params: &TetherSafetyCheckParams,
) -> Result<SequenceReport, TetherError> {
    for frame in frames {
        validate_tethers(&frame.tethers).map_err(|source| TetherError::InvalidFrame {
            frame: frame.frame,
            source: Box::new(source),
        })?;
    }

    let mut report = SequenceReport::default();
    for frame in frames {
        let result = evaluate(&frame.tethers, params)?;
        report.summary.record(frame.frame, &result, params);
        report.frames.push(FrameReport {
            frame: frame.frame,
            result,
        });
    }

    tracing::debug!(
        "Checked {} frame(s), {} with violations",
        report.frames.len(),
        report
            .frames
            .iter()
            .filter(|f| f.result.has_violations(params))
            .count()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Endpoint;

    fn vertical(x: f64, height: f64) -> Tether {
        Tether::new([x, 0.0, 0.0], [x, 0.0, height])
    }

    #[test]
    fn test_summary_tracks_worst_frames() {
        let params = TetherSafetyCheckParams::new(30.0, 10.0, 2.0).unwrap();
        let frames = vec![
            Frame::new(1, vec![vertical(0.0, 5.0), vertical(4.0, 5.0)]),
            Frame::new(2, vec![vertical(0.0, 12.0), vertical(1.0, 5.0)]),
            Frame::new(
                3,
                vec![Tether::new([0.0, 0.0, 0.0], [5.0, 0.0, 5.0]), vertical(1.0, 5.0)],
            ),
        ];

        let report = check_frames(&frames, &params).unwrap();
        assert_eq!(report.frames.len(), 3);

        let summary = &report.summary;
        assert_eq!(summary.max_length.unwrap().frame, 2);
        assert_eq!(summary.max_length.unwrap().value, 12.0);
        assert_eq!(summary.max_angle.unwrap().frame, 3);
        assert!((summary.max_angle.unwrap().value - 45.0).abs() < 1e-9);
        assert_eq!(summary.angle_violation_frames, vec![3]);
        assert_eq!(summary.length_violation_frames, vec![2]);
        assert_eq!(summary.clearance_violation_frames, vec![2, 3]);
        assert!(summary.has_violations());
    }

    #[test]
    fn test_ties_keep_earliest_frame() {
        let params = TetherSafetyCheckParams::default();
        let frames = vec![
            Frame::new(10, vec![vertical(0.0, 5.0), vertical(3.0, 5.0)]),
            Frame::new(11, vec![vertical(0.0, 5.0), vertical(3.0, 5.0)]),
        ];
        let summary = check_frames(&frames, &params).unwrap().summary;
        assert_eq!(summary.min_distance.unwrap().frame, 10);
        assert_eq!(summary.max_length.unwrap().frame, 10);
        assert_eq!(summary.max_angle.unwrap().frame, 10);
    }

    #[test]
    fn test_invalid_frame_aborts_whole_sequence() {
        let params = TetherSafetyCheckParams::default();
        let frames = vec![
            Frame::new(1, vec![vertical(0.0, 5.0)]),
            Frame::new(
                2,
                vec![
                    vertical(0.0, 5.0),
                    Tether::new([f64::INFINITY, 0.0, 0.0], [0.0, 0.0, 1.0]),
                ],
            ),
        ];

        let err = check_frames(&frames, &params).unwrap_err();
        assert_eq!(
            err,
            TetherError::InvalidFrame {
                frame: 2,
                source: Box::new(TetherError::NonFiniteCoordinate {
                    index: 1,
                    endpoint: Endpoint::Anchor,
                }),
            }
        );
    }

    #[test]
    fn test_frames_deserialize_from_json() {
        let json = r#"[{"frame": 0, "tethers": [{"anchor": [0, 0, 0], "tip": [0, 0, 10]}]}]"#;
        let frames: Vec<Frame> = serde_json::from_str(json).unwrap();
        assert_eq!(frames, vec![Frame::new(0, vec![vertical(0.0, 10.0)])]);
    }

    #[test]
    fn test_empty_sequence() {
        let report = check_frames(&[], &TetherSafetyCheckParams::default()).unwrap();
        assert!(report.frames.is_empty());
        assert_eq!(report.summary, SequenceSummary::default());
    }
}
