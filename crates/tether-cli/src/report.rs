//! Human-readable and JSON rendering of safety check reports.

use serde::Serialize;
use std::fmt::Write;

use tether_core::{
    round_to, Coordinate3D, FrameReport, FrameValue, SequenceReport, SequenceSummary,
    TetherSafetyCheckParams, TetherSafetyCheckParamsView,
};

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub params: TetherSafetyCheckParamsView,
    pub frames: &'a [FrameReport],
    pub summary: &'a SequenceSummary,
}

pub fn render_json(
    report: &SequenceReport,
    params: &TetherSafetyCheckParams,
    ndigits: u32,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        params: params.to_view(ndigits),
        frames: &report.frames,
        summary: &report.summary,
    })
}

pub fn render_text(
    report: &SequenceReport,
    params: &TetherSafetyCheckParams,
    ndigits: u32,
) -> String {
    let view = params.to_view(ndigits);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Thresholds: max angle {} deg, max length {} m, min distance {} m",
        view.max_angle, view.max_length, view.min_distance
    );

    for frame in &report.frames {
        let result = &frame.result;
        let _ = writeln!(out, "Frame {}:", frame.frame);
        let _ = writeln!(
            out,
            "  max angle:    {}{}",
            optional(result.max_angle(), ndigits, "deg"),
            violations(result.tethers_over_max_angle(), ndigits)
        );
        let _ = writeln!(
            out,
            "  max length:   {}{}",
            optional(result.max_length(), ndigits, "m"),
            violations(result.tethers_over_max_length(), ndigits)
        );
        let _ = write!(
            out,
            "  min distance: {}",
            optional(result.min_distance(), ndigits, "m")
        );
        if let (Some((p1, p2)), Some((i, j))) = (result.closest_points(), result.closest_tethers())
        {
            let _ = write!(
                out,
                " between tether {} at {} and tether {} at {}",
                i,
                point(p1, ndigits),
                j,
                point(p2, ndigits)
            );
        }
        if result.is_clearance_violated(params) {
            out.push_str(" [TOO CLOSE]");
        }
        out.push('\n');
    }

    let summary = &report.summary;
    if report.frames.len() > 1 {
        let _ = writeln!(out, "Summary over {} frames:", report.frames.len());
        let _ = writeln!(out, "  max angle:    {}", extreme(summary.max_angle, ndigits, "deg"));
        let _ = writeln!(out, "  max length:   {}", extreme(summary.max_length, ndigits, "m"));
        let _ = writeln!(out, "  min distance: {}", extreme(summary.min_distance, ndigits, "m"));
    }
    if summary.has_violations() {
        let _ = writeln!(
            out,
            "Violations: angle in frames {:?}, length in frames {:?}, clearance in frames {:?}",
            summary.angle_violation_frames,
            summary.length_violation_frames,
            summary.clearance_violation_frames
        );
    } else {
        out.push_str("No violations\n");
    }

    out
}

fn optional(value: Option<f64>, ndigits: u32, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {}", round_to(v, ndigits), unit),
        None => "N/A".to_string(),
    }
}

fn extreme(value: Option<FrameValue>, ndigits: u32, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {} (frame {})", round_to(v.value, ndigits), unit, v.frame),
        None => "N/A".to_string(),
    }
}

fn point(p: Coordinate3D, ndigits: u32) -> String {
    format!(
        "({}, {}, {})",
        round_to(p.x, ndigits),
        round_to(p.y, ndigits),
        round_to(p.z, ndigits)
    )
}

fn violations(tips: &[Coordinate3D], ndigits: u32) -> String {
    if tips.is_empty() {
        return String::new();
    }
    let listed: Vec<String> = tips.iter().map(|p| point(*p, ndigits)).collect();
    format!(" [{} over: {}]", tips.len(), listed.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{check_frames, Frame, Tether};

    fn scenario() -> (SequenceReport, TetherSafetyCheckParams) {
        let params = TetherSafetyCheckParams::new(45.0, 9.0, 0.5).unwrap();
        let frames = vec![Frame::new(
            0,
            vec![
                Tether::new([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]),
                Tether::new([1.0, 0.0, 0.0], [1.0, 0.0, 8.0]),
            ],
        )];
        (check_frames(&frames, &params).unwrap(), params)
    }

    #[test]
    fn test_text_report_lists_violations() {
        let (report, params) = scenario();
        let text = render_text(&report, &params, 3);

        assert!(text.contains("Thresholds: max angle 45 deg, max length 9 m, min distance 0.5 m"));
        assert!(text.contains("max length:   10 m [1 over: (0, 0, 10)]"));
        assert!(text.contains("min distance: 1 m between tether 0"));
        assert!(!text.contains("TOO CLOSE"));
        assert!(text.contains("Violations: angle in frames [], length in frames [0]"));
    }

    #[test]
    fn test_json_report_uses_rounded_params() {
        let (report, _) = scenario();
        let params = TetherSafetyCheckParams::new(45.00001, 9.0, 0.5).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report, &params, 3).unwrap()).unwrap();

        assert_eq!(
            json["params"],
            serde_json::json!({"maxAngle": 45.0, "maxLength": 9.0, "minDistance": 0.5})
        );
        assert_eq!(json["frames"][0]["frame"], 0);
        assert_eq!(json["summary"]["lengthViolationFrames"], serde_json::json!([0]));
    }

    #[test]
    fn test_empty_metrics_render_as_not_available() {
        let params = TetherSafetyCheckParams::default();
        let report = check_frames(&[Frame::new(3, Vec::new())], &params).unwrap();
        let text = render_text(&report, &params, 3);
        assert!(text.contains("max angle:    N/A"));
        assert!(text.contains("min distance: N/A"));
        assert!(text.ends_with("No violations\n"));
    }
}
