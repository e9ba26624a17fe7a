//! Closed-form contact geometry
//!
//! Every time-of-impact query answers the same question: how far along a
//! trajectory (as a fraction `u` in (0, 1]) does a moving point first reach a
//! given distance from another point or a line segment. Anything else
//! (parallel motion, separating pairs, contact outside the tick, NaN) is
//! `None`.
//!
//! A pair that already sits at or inside the contact distance and is still
//! closing reports `u = 0`: the contact is happening now. Closing means the
//! approach speed along the line of contact is at least `CLOSING_TOLERANCE`
//! of the relative speed; anything slower is a graze and reports `None`.

use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};

/// A straight line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// Point at parameter `t` (0 = `a`, 1 = `b`)
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.a + self.direction() * t
    }

    /// Nearest point of the segment to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq <= f32::EPSILON * f32::EPSILON {
            return self.a;
        }
        let t = ((p - self.a).dot(dir) / len_sq).clamp(0.0, 1.0);
        self.point_at(t)
    }
}

/// Linear path of a point over the remainder of a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub start: Vec2,
    pub end: Vec2,
}

impl Trajectory {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// A point that does not move
    pub const fn stationary(at: Vec2) -> Self {
        Self { start: at, end: at }
    }

    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.end - self.start
    }

    /// Position after fraction `u` of the path
    #[inline]
    pub fn at(&self, u: f32) -> Vec2 {
        self.start + self.displacement() * u
    }

    #[inline]
    pub fn as_segment(&self) -> Segment {
        Segment::new(self.start, self.end)
    }
}

/// Approach speed along the contact line, as a share of the relative speed,
/// below which a pair already in contact counts as grazing
pub const CLOSING_TOLERANCE: f64 = 1e-4;

/// Smaller root of `a·u² + b·u + c = 0`, if it falls in [0, 1]
///
/// The smaller root is the moment the separation first shrinks to the target
/// distance; the larger one is when it grows back past it. `c <= 0` means the
/// pair starts inside the distance, which is an immediate contact while
/// closing and no contact otherwise. `separation_sq` is `|Δp₀|²`, so with
/// `b = 2·Δp₀·Δv` the pair closes when `b < -2·k·|Δp₀|·|Δv|`.
fn entry_root(a: f64, b: f64, c: f64, separation_sq: f64) -> Option<f32> {
    if a.is_nan() || a <= f64::EPSILON * f64::EPSILON {
        return None;
    }
    if c <= 0.0 {
        let closing = b < -2.0 * CLOSING_TOLERANCE * (a * separation_sq).sqrt();
        return closing.then_some(0.0);
    }
    let disc = b * b - 4.0 * a * c;
    if disc.is_nan() || disc <= 0.0 {
        return None;
    }
    let u = (-b - disc.sqrt()) / (2.0 * a);
    (u > 0.0 && u <= 1.0).then_some(u as f32)
}

/// Fraction at which two moving points are exactly `distance` apart
///
/// Solves `|Δp₀ + u·Δv| = distance` where `Δp₀` is the initial separation and
/// `Δv` the relative displacement over the trajectories.
pub fn toi_point_point(a: Trajectory, b: Trajectory, distance: f32) -> Option<f32> {
    let dp: DVec2 = (b.start - a.start).as_dvec2();
    let dv: DVec2 = (b.displacement() - a.displacement()).as_dvec2();
    let d = distance as f64;

    let qa = dv.length_squared();
    let qb = 2.0 * dp.dot(dv);
    let separation_sq = dp.length_squared();
    let qc = separation_sq - d * d;
    entry_root(qa, qb, qc, separation_sq)
}

/// Fraction at which a moving point is exactly `distance` from a fixed point
#[inline]
pub fn toi_point_static(path: Trajectory, point: Vec2, distance: f32) -> Option<f32> {
    toi_point_point(path, Trajectory::stationary(point), distance)
}

/// Contact with the infinite line through a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    /// Trajectory fraction of the contact
    pub fraction: f32,
    /// Segment parameter of the contact point's projection (0 = `a`, 1 = `b`)
    pub along: f32,
}

/// Fraction at which a moving point comes within `offset` of the line
/// through `segment`
///
/// The line is shifted by `offset` along its normal toward the side the path
/// starts on, and the path is intersected with the shifted line. Paths moving
/// parallel to or away from the line never hit; paths already within
/// `offset` and closing faster than the graze tolerance hit at fraction 0.
pub fn toi_point_line(path: Trajectory, segment: Segment, offset: f32) -> Option<LineHit> {
    let dir = segment.direction();
    let len_sq = dir.length_squared();
    if len_sq <= f32::EPSILON * f32::EPSILON {
        return None;
    }
    let mut normal = dir.perp() / len_sq.sqrt();
    let mut side = (path.start - segment.a).dot(normal);
    if side < 0.0 {
        normal = -normal;
        side = -side;
    }

    let displacement = path.displacement();
    let approach = displacement.dot(normal);
    if approach.is_nan() || approach >= 0.0 {
        return None;
    }
    let fraction = if side <= offset {
        // Grazing along the band is not a contact
        if approach > -(CLOSING_TOLERANCE as f32) * displacement.length() {
            return None;
        }
        0.0
    } else {
        (offset - side) / approach
    };
    if fraction.is_nan() || fraction > 1.0 {
        return None;
    }

    let contact = path.at(fraction);
    let along = (contact - segment.a).dot(dir) / len_sq;
    Some(LineHit { fraction, along })
}

/// Fraction at which a moving point comes within `offset` of a segment
///
/// Contacts whose projection lands past either end are re-solved as a
/// point contact against the segment's endpoints, keeping the earlier one.
pub fn toi_point_segment(path: Trajectory, segment: Segment, offset: f32) -> Option<f32> {
    if let Some(hit) = toi_point_line(path, segment, offset) {
        if (0.0..=1.0).contains(&hit.along) {
            return Some(hit.fraction);
        }
    }
    earliest(
        toi_point_static(path, segment.a, offset),
        toi_point_static(path, segment.b, offset),
    )
}

/// Earlier of two optional fractions
#[inline]
pub fn earliest(a: Option<f32>, b: Option<f32>) -> Option<f32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Shortest vector from a segment to a point
#[inline]
pub fn closest_vector_segment_point(segment: Segment, point: Vec2) -> Vec2 {
    point - segment.closest_point(point)
}

/// Shortest distance between a segment and a point
#[inline]
pub fn shortest_distance_segment_point(segment: Segment, point: Vec2) -> f32 {
    closest_vector_segment_point(segment, point).length()
}

/// Shortest distance between two segments (zero when they cross)
pub fn shortest_distance_segment_segment(s1: Segment, s2: Segment) -> f32 {
    if segments_cross(s1, s2) {
        return 0.0;
    }
    shortest_distance_segment_point(s1, s2.a)
        .min(shortest_distance_segment_point(s1, s2.b))
        .min(shortest_distance_segment_point(s2, s1.a))
        .min(shortest_distance_segment_point(s2, s1.b))
}

/// Proper crossing test: each segment's endpoints lie strictly on opposite
/// sides of the other
fn segments_cross(s1: Segment, s2: Segment) -> bool {
    let d1 = s1.direction();
    let d2 = s2.direction();
    let o1 = d1.perp_dot(s2.a - s1.a);
    let o2 = d1.perp_dot(s2.b - s1.a);
    let o3 = d2.perp_dot(s1.a - s2.a);
    let o4 = d2.perp_dot(s1.b - s2.a);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// Velocities of two discs after an elastic collision
///
/// `x1`/`x2` are the centers at the moment of contact; the exchange happens
/// along the line of centers. Coincident centers leave both unchanged.
pub fn elastic_collision_velocities(
    m1: f32,
    v1: Vec2,
    x1: Vec2,
    m2: f32,
    v2: Vec2,
    x2: Vec2,
) -> (Vec2, Vec2) {
    let dx = x1 - x2;
    let dist_sq = dx.length_squared();
    let total = m1 + m2;
    if dist_sq <= 0.0 || total <= 0.0 {
        return (v1, v2);
    }

    let k = (v1 - v2).dot(dx) / dist_sq;
    let v1f = v1 - (2.0 * m2 / total) * k * dx;
    let v2f = v2 + (2.0 * m1 / total) * k * dx;
    (v1f, v2f)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn traj(sx: f32, sy: f32, ex: f32, ey: f32) -> Trajectory {
        Trajectory::new(Vec2::new(sx, sy), Vec2::new(ex, ey))
    }

    #[test]
    fn test_toi_point_point_contact_at_end() {
        // Closing speed 2 over a gap of 3, contact at distance 1 exactly at u = 1
        let a = traj(0.0, 0.0, 1.0, 0.0);
        let b = traj(3.0, 0.0, 2.0, 0.0);
        let u = toi_point_point(a, b, 1.0).unwrap();
        assert!(u <= 1.0);
        assert!((u - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_toi_point_point_midway() {
        let a = traj(0.0, 0.0, 4.0, 0.0);
        let b = traj(5.0, 0.0, 5.0, 0.0);
        // Gap 5 closing by 4 over the path, distance 3 reached halfway
        let u = toi_point_point(a, b, 3.0).unwrap();
        assert!((u - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_toi_point_point_diverging() {
        let a = traj(0.0, 0.0, -1.0, 0.0);
        let b = traj(3.0, 0.0, 4.0, 0.0);
        assert_eq!(toi_point_point(a, b, 1.0), None);
    }

    #[test]
    fn test_toi_point_point_no_relative_motion() {
        let a = traj(0.0, 0.0, 1.0, 0.0);
        let b = traj(3.0, 0.0, 4.0, 0.0);
        assert_eq!(toi_point_point(a, b, 1.0), None);
    }

    #[test]
    fn test_toi_point_point_miss_sideways() {
        // Passes 2 units above the other point, never within 1
        let a = traj(-5.0, 2.0, 5.0, 2.0);
        let b = Trajectory::stationary(Vec2::ZERO);
        assert_eq!(toi_point_point(a, b, 1.0), None);
    }

    #[test]
    fn test_toi_point_point_beyond_tick() {
        let a = traj(0.0, 0.0, 1.0, 0.0);
        let b = Trajectory::stationary(Vec2::new(10.0, 0.0));
        assert_eq!(toi_point_point(a, b, 1.0), None);
    }

    #[test]
    fn test_toi_point_point_overlap_closing_is_immediate() {
        let a = traj(0.0, 0.0, 1.0, 0.0);
        let b = Trajectory::stationary(Vec2::new(0.5, 0.0));
        assert_eq!(toi_point_point(a, b, 1.0), Some(0.0));
    }

    #[test]
    fn test_toi_point_point_overlap_separating() {
        let a = traj(0.0, 0.0, -1.0, 0.0);
        let b = Trajectory::stationary(Vec2::new(0.5, 0.0));
        assert_eq!(toi_point_point(a, b, 1.0), None);
    }

    #[test]
    fn test_toi_point_point_touching() {
        // Exactly at contact distance and closing
        let a = traj(0.0, 0.0, 1.0, 0.0);
        let b = Trajectory::stationary(Vec2::new(2.0, 0.0));
        assert_eq!(toi_point_point(a, b, 2.0), Some(0.0));
    }

    #[test]
    fn test_toi_point_point_touching_graze_is_not_contact() {
        // Sliding past a touching ball with float-noise inward drift
        let r2 = 2.0 * 0.028575;
        let a = traj(0.0, 0.0, 1e-8, 0.01);
        let b = Trajectory::stationary(Vec2::new(r2, 0.0));
        assert_eq!(toi_point_point(a, b, r2), None);

        // A real push into the touching ball still counts
        let a = traj(0.0, 0.0, 0.01, 0.01);
        assert_eq!(toi_point_point(a, b, r2), Some(0.0));
    }

    #[test]
    fn test_toi_point_static_pocket() {
        let path = traj(0.0, 0.0, 0.0, 10.0);
        let u = toi_point_static(path, Vec2::new(0.0, 8.0), 2.0).unwrap();
        assert!((u - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_toi_point_line_hits_from_either_side() {
        let wall = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));

        let from_above = toi_point_line(traj(0.0, 4.0, 0.0, -4.0), wall, 1.0).unwrap();
        assert!((from_above.fraction - 3.0 / 8.0).abs() < 1e-6);
        assert!((from_above.along - 0.5).abs() < 1e-6);

        let from_below = toi_point_line(traj(1.0, -4.0, 1.0, 4.0), wall, 1.0).unwrap();
        assert!((from_below.fraction - 3.0 / 8.0).abs() < 1e-6);
        assert!((from_below.along - 0.6).abs() < 1e-6);

        // Direction of the segment does not matter
        let reversed = Segment::new(wall.b, wall.a);
        let hit = toi_point_line(traj(0.0, 4.0, 0.0, -4.0), reversed, 1.0).unwrap();
        assert!((hit.fraction - from_above.fraction).abs() < 1e-6);
    }

    #[test]
    fn test_toi_point_line_inside_band_closing() {
        let wall = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));
        let hit = toi_point_line(traj(0.0, 0.5, 0.0, -1.0), wall, 1.0).unwrap();
        assert_eq!(hit.fraction, 0.0);
        assert!((hit.along - 0.5).abs() < 1e-6);
        assert_eq!(toi_point_line(traj(0.0, 0.5, 0.0, 2.0), wall, 1.0), None);
        // Sliding along the band with a tiny inward drift
        assert_eq!(toi_point_line(traj(0.0, 0.5, 4.0, 0.5 - 1e-7), wall, 1.0), None);
    }

    #[test]
    fn test_toi_point_line_parallel_and_receding() {
        let wall = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));
        assert_eq!(toi_point_line(traj(-5.0, 2.0, 5.0, 2.0), wall, 1.0), None);
        assert_eq!(toi_point_line(traj(0.0, 2.0, 0.0, 5.0), wall, 1.0), None);
    }

    #[test]
    fn test_toi_point_segment_endpoint_fallback() {
        // Line contact projects past `b`, the rounded end is hit instead
        let wall = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(0.0, 0.0));
        let path = traj(0.5, 4.0, 0.5, -4.0);
        let line = toi_point_line(path, wall, 1.0).unwrap();
        assert!(line.along > 1.0);

        let u = toi_point_segment(path, wall, 1.0).unwrap();
        // Contact where |(0.5, y)| = 1, y = sqrt(0.75)
        let expected = (4.0 - 0.75_f32.sqrt()) / 8.0;
        assert!((u - expected).abs() < 1e-5);
        assert!(u > line.fraction);
    }

    #[test]
    fn test_toi_point_segment_clean_miss() {
        let wall = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(0.0, 0.0));
        assert_eq!(toi_point_segment(traj(3.0, 4.0, 3.0, -4.0), wall, 1.0), None);
    }

    #[test]
    fn test_toi_point_segment_inside_offset_band_reaches_end() {
        // Already within the offset of the extended line, beyond the end
        let wall = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(0.0, 0.0));
        let path = traj(4.0, 0.5, 0.0, 0.5);
        assert_eq!(toi_point_line(path, wall, 1.0), None);
        let u = toi_point_segment(path, wall, 1.0).unwrap();
        let expected = (4.0 - 0.75_f32.sqrt()) / 4.0;
        assert!((u - expected).abs() < 1e-5);
    }

    #[test]
    fn test_shortest_distances() {
        let s = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0));
        assert!((shortest_distance_segment_point(s, Vec2::new(2.0, 3.0)) - 3.0).abs() < 1e-6);
        assert!((shortest_distance_segment_point(s, Vec2::new(7.0, 4.0)) - 5.0).abs() < 1e-6);

        let parallel = Segment::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 2.0));
        assert!((shortest_distance_segment_segment(s, parallel) - 2.0).abs() < 1e-6);

        let crossing = Segment::new(Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0));
        assert_eq!(shortest_distance_segment_segment(s, crossing), 0.0);

        let point = Segment::new(Vec2::new(5.0, 1.0), Vec2::new(5.0, 1.0));
        let expected = 2.0_f32.sqrt();
        assert!((shortest_distance_segment_segment(s, point) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_equal_mass_head_on_swaps() {
        let (v1, v2) = elastic_collision_velocities(
            0.16,
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 0.0),
            0.16,
            Vec2::new(-0.5, 0.0),
            Vec2::new(0.05715, 0.0),
        );
        assert!((v1 - Vec2::new(-0.5, 0.0)).length() < 1e-5);
        assert!((v2 - Vec2::new(2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_glancing_collision_is_perpendicular() {
        // Equal masses, one at rest: outgoing paths are at right angles
        let (v1, v2) = elastic_collision_velocities(
            1.0,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
            1.0,
            Vec2::ZERO,
            Vec2::new(1.0, 1.0).normalize(),
        );
        assert!(v1.dot(v2).abs() < 1e-5);
        assert!(v2.y > 0.0);
    }

    #[test]
    fn test_coincident_centers_unchanged() {
        let v1 = Vec2::new(1.0, 2.0);
        let v2 = Vec2::new(-3.0, 0.5);
        let (a, b) = elastic_collision_velocities(1.0, v1, Vec2::ONE, 2.0, v2, Vec2::ONE);
        assert_eq!((a, b), (v1, v2));
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    proptest! {
        #[test]
        fn prop_elastic_conserves_momentum_and_energy(
            m1 in 0.05f32..2.0,
            m2 in 0.05f32..2.0,
            v1x in -10.0f32..10.0, v1y in -10.0f32..10.0,
            v2x in -10.0f32..10.0, v2y in -10.0f32..10.0,
            angle in 0.0f32..std::f32::consts::TAU,
            gap in 0.01f32..1.0,
        ) {
            let v1 = Vec2::new(v1x, v1y);
            let v2 = Vec2::new(v2x, v2y);
            let x1 = Vec2::new(0.3, -0.2);
            let x2 = x1 + Vec2::from_angle(angle) * gap;
            let (v1f, v2f) = elastic_collision_velocities(m1, v1, x1, m2, v2, x2);

            let p_before = v1 * m1 + v2 * m2;
            let p_after = v1f * m1 + v2f * m2;
            let p_scale = 1.0 + m1 * v1.length() + m2 * v2.length();
            prop_assert!((p_before - p_after).length() <= 1e-4 * p_scale);

            let ke_before = 0.5 * m1 * v1.length_squared() + 0.5 * m2 * v2.length_squared();
            let ke_after = 0.5 * m1 * v1f.length_squared() + 0.5 * m2 * v2f.length_squared();
            prop_assert!((ke_before - ke_after).abs() <= 1e-4 * (1.0 + ke_before));
        }

        #[test]
        fn prop_toi_never_outside_unit_interval(
            sx in -2.0f32..2.0, sy in -2.0f32..2.0,
            ex in -2.0f32..2.0, ey in -2.0f32..2.0,
            px in -2.0f32..2.0, py in -2.0f32..2.0,
            d in 0.01f32..1.0,
        ) {
            let path = Trajectory::new(Vec2::new(sx, sy), Vec2::new(ex, ey));
            if let Some(u) = toi_point_static(path, Vec2::new(px, py), d) {
                prop_assert!(u.is_finite() && u >= 0.0 && u <= 1.0);
            }
            let seg = Segment::new(Vec2::new(px, py), Vec2::new(py, px));
            if let Some(u) = toi_point_segment(path, seg, d) {
                prop_assert!(u.is_finite() && u >= 0.0 && u <= 1.0);
            }
        }
    }
}
