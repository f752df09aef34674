//! Segment geometry for crack paths
//!
//! Pure functions, no state. A crack path is a polyline; every pair of
//! consecutive points is treated as a closed segment `a..b`.

use glam::Vec2;

/// Length below which a segment is treated as a single point
const DEGENERATE_LEN_SQ: f32 = 1e-12;

/// Closest point to `p` on segment `ab` (projection clamped to the endpoints)
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < DEGENERATE_LEN_SQ {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to segment `ab`
///
/// A degenerate segment (`a == b`) reduces to point-to-point distance.
#[inline]
pub fn point_to_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    p.distance(closest_point_on_segment(p, a, b))
}

/// Intersection point of segments `p1p2` and `q1q2`, if they cross
///
/// Parallel and collinear segments report no intersection.
pub fn segment_intersection(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> Option<Vec2> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.perp_dot(s);
    if denom.abs() < 1e-9 {
        return None;
    }

    let qp = q1 - p1;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p1 + r * t)
    } else {
        None
    }
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Unit vector in the direction of `v`, or `None` for a zero-length vector
#[inline]
pub fn try_normalize(v: Vec2) -> Option<Vec2> {
    v.try_normalize()
}

/// Whether `p` lies on the closed rectangle `[0, size.x] x [0, size.y]`
#[inline]
pub fn in_bounds(p: Vec2, size: Vec2) -> bool {
    p.x >= 0.0 && p.x <= size.x && p.y >= 0.0 && p.y <= size.y
}

/// Last point of `from -> to` still inside the surface
///
/// `from` must be inside. Returns `to` unchanged when it is inside too.
pub fn clip_to_bounds(from: Vec2, to: Vec2, size: Vec2) -> Vec2 {
    let d = to - from;
    let mut t = 1.0f32;

    for (start, delta, max) in [(from.x, d.x, size.x), (from.y, d.y, size.y)] {
        if delta < 0.0 && start + delta < 0.0 {
            t = t.min(-start / delta);
        } else if delta > 0.0 && start + delta > max {
            t = t.min((max - start) / delta);
        }
    }

    let clipped = from + d * t.clamp(0.0, 1.0);
    clipped.clamp(Vec2::ZERO, size)
}

/// Total arc length of a polyline
pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
