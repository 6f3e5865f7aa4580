//! Vector math and segment distance for tether checks.
//!
//! Everything here is a pure function over [`Coordinate3D`] and [`Tether`]
//! values and is safe to call from any thread.

use crate::models::{Coordinate3D, Tether};

/// World "up" unit vector.
pub const UP: Coordinate3D = Coordinate3D::new(0.0, 0.0, 1.0);

/// Squared length (m^2) below which a segment is treated as a single point.
const POINT_EPS_SQ: f64 = 1e-18;

/// Relative tolerance on `sin^2` of the angle between two segments below
/// which they are treated as parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// Vector from `a` to `b`.
pub fn vector_between(a: Coordinate3D, b: Coordinate3D) -> Coordinate3D {
    b - a
}

pub fn dot(a: Coordinate3D, b: Coordinate3D) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Euclidean length; `0` for the zero vector.
///
/// Components are rescaled by a power of two before squaring, so the
/// intermediate squares of large finite vectors cannot overflow.
pub fn norm(v: Coordinate3D) -> f64 {
    let scale = pow2_scale(max_abs(&[v]));
    let u = v * (1.0 / scale);
    dot(u, u).sqrt() * scale
}

/// Distance between two points, without forming a difference that could
/// overflow.
pub fn distance_between(a: Coordinate3D, b: Coordinate3D) -> f64 {
    let scale = pow2_scale(max_abs(&[a, b]));
    let inv = 1.0 / scale;
    norm(b * inv - a * inv) * scale
}

/// Largest absolute component across `points`.
fn max_abs(points: &[Coordinate3D]) -> f64 {
    points.iter().fold(0.0, |m: f64, p| {
        m.max(p.x.abs()).max(p.y.abs()).max(p.z.abs())
    })
}

/// Power of two near `magnitude`, used as an exact rescaling factor.
fn pow2_scale(magnitude: f64) -> f64 {
    if magnitude == 0.0 || !magnitude.is_finite() {
        return 1.0;
    }
    let exp = (magnitude.log2().floor() as i32).clamp(-1000, 1000);
    2f64.powi(exp)
}

/// `segment` multiplied by `inv` (a power of two, so exact).
fn rescaled(segment: &Tether, inv: f64) -> Tether {
    Tether {
        anchor: segment.anchor * inv,
        tip: segment.tip * inv,
    }
}

/// Angle between the tether direction and [`UP`], in degrees.
///
/// Returns `None` for a zero-length tether, whose direction is undefined.
/// The cosine is clamped to `[-1, 1]` before `acos` so rounding error can
/// never produce NaN.
pub fn angle_from_vertical(tether: &Tether) -> Option<f64> {
    let inv = 1.0 / pow2_scale(max_abs(&[tether.anchor, tether.tip]));
    let direction = rescaled(tether, inv).direction();
    let length = norm(direction);
    if length == 0.0 {
        return None;
    }
    let cos = (dot(direction, UP) / length).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Parameter in `[0, 1]` of the point on `segment` closest to `point`.
fn parameter_on(point: Coordinate3D, segment: &Tether, point_eps_sq: f64) -> f64 {
    let d = segment.direction();
    let len_sq = dot(d, d);
    if len_sq <= point_eps_sq {
        return 0.0;
    }
    (dot(point - segment.anchor, d) / len_sq).clamp(0.0, 1.0)
}

/// Closest point on `segment` to `point`, with its parameter in `[0, 1]`.
pub fn closest_point_on_segment(point: Coordinate3D, segment: &Tether) -> (Coordinate3D, f64) {
    let scale = pow2_scale(max_abs(&[point, segment.anchor, segment.tip]));
    let inv = 1.0 / scale;
    let local = rescaled(segment, inv);
    let t = parameter_on(point * inv, &local, POINT_EPS_SQ * inv * inv);
    (local.point_at(t) * scale, t)
}

/// Closest approach between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDistance {
    pub distance: f64,
    /// Witness point on the first segment
    pub point_on_first: Coordinate3D,
    /// Witness point on the second segment
    pub point_on_second: Coordinate3D,
}

impl SegmentDistance {
    /// Same result seen from the other segment.
    pub fn swapped(self) -> Self {
        Self {
            distance: self.distance,
            point_on_first: self.point_on_second,
            point_on_second: self.point_on_first,
        }
    }
}

/// Exact closest-point distance between two finite 3D segments.
///
/// Minimizes `|p(s) - q(t)|^2` with `p(s) = a1 + s (b1 - a1)` and
/// `q(t) = a2 + t (b2 - a2)` over `s, t in [0, 1]`. When the unconstrained
/// optimum falls outside the unit square, the parameter is clamped and the
/// other one re-solved on the clamped edge. Point-like segments reduce to a
/// point-to-segment query.
///
/// Parallel segments whose projections overlap are equally close along the
/// whole overlap; the witnesses are taken at its midpoint, which is the same
/// pair of points whichever segment comes first. Without overlap the nearest
/// endpoints are unique.
///
/// The work is done on copies rescaled by a power of two so that extreme but
/// finite coordinates do not overflow intermediate products.
pub fn segment_distance(first: &Tether, second: &Tether) -> SegmentDistance {
    let scale = pow2_scale(max_abs(&[first.anchor, first.tip, second.anchor, second.tip]));
    let inv = 1.0 / scale;
    let p = rescaled(first, inv);
    let q = rescaled(second, inv);

    let (s, t) = closest_parameters(&p, &q, POINT_EPS_SQ * inv * inv);
    let on_first = p.point_at(s);
    let on_second = q.point_at(t);

    SegmentDistance {
        distance: norm(on_first - on_second) * scale,
        point_on_first: on_first * scale,
        point_on_second: on_second * scale,
    }
}

/// Parameters `(s, t)` of the closest pair on `first` and `second`.
fn closest_parameters(first: &Tether, second: &Tether, point_eps_sq: f64) -> (f64, f64) {
    let d1 = first.direction();
    let d2 = second.direction();
    let r = first.anchor - second.anchor;
    let a = dot(d1, d1);
    let e = dot(d2, d2);

    if a <= point_eps_sq && e <= point_eps_sq {
        return (0.0, 0.0);
    }
    if a <= point_eps_sq {
        return (0.0, parameter_on(first.anchor, second, point_eps_sq));
    }
    if e <= point_eps_sq {
        return (parameter_on(second.anchor, first, point_eps_sq), 0.0);
    }

    let b = dot(d1, d2);
    let c = dot(d1, r);
    let f = dot(d2, r);
    let denom = a * e - b * b;

    let mut s = if denom > PARALLEL_EPS * a * e {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        // Second segment's endpoints projected onto the first
        let from = -c / a;
        let to = (b - c) / a;
        let lo = from.min(to).max(0.0);
        let hi = from.max(to).min(1.0);
        if lo <= hi {
            let s = 0.5 * (lo + hi);
            return (s, ((b * s + f) / e).clamp(0.0, 1.0));
        }
        0.0
    };

    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }

    (s, t)
}
