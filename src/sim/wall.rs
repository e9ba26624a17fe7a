//! Cushions
//!
//! Each of the six cushions is a three-segment polyline: a short bank
//! diagonal, the long main cushion, and another bank diagonal. The diagonals
//! run from the cushion nose back to the rail at the pocket mouths.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::collider::{Collidable, Contact, Impact, net_fraction};
use super::geometry::{
    Segment, closest_vector_segment_point, reflect_velocity, shortest_distance_segment_segment,
    toi_point_segment,
};
use crate::consts::*;

/// Which cushion of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Short rail at y = height
    Top,
    /// Long rail at x = 0, between the top corner and the side pocket
    UpperLeft,
    /// Long rail at x = width, between the top corner and the side pocket
    UpperRight,
    /// Long rail at x = 0, between the side pocket and the bottom corner
    LowerLeft,
    /// Long rail at x = width, between the side pocket and the bottom corner
    LowerRight,
    /// Short rail at y = 0
    Bottom,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::UpperLeft,
        Side::UpperRight,
        Side::LowerLeft,
        Side::LowerRight,
        Side::Bottom,
    ];
}

/// Index of the main cushion within a wall's segments
pub const MAIN_SEGMENT: usize = 1;

/// Search order over a wall's segments; earlier entries win ties
const SEGMENT_ORDER: [usize; 3] = [MAIN_SEGMENT, 0, 2];

/// A cushion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub side: Side,
    /// Bank diagonal, main cushion, bank diagonal; consecutive segments share
    /// an endpoint
    pub segments: [Segment; 3],
}

impl Wall {
    /// Build the cushion for `side` on a `width` x `height` playing area
    pub fn new(side: Side, width: f32, height: f32) -> Self {
        let (w, h) = (width, height);
        let (c, b, g) = (CORNER_CUT, BANK_WIDTH, SIDE_POCKET_HALF_GAP);
        let mid = h / 2.0;

        let points = match side {
            Side::Top => [
                Vec2::new(w - c, h),
                Vec2::new(w - c - b, h - b),
                Vec2::new(c + b, h - b),
                Vec2::new(c, h),
            ],
            Side::UpperLeft => [
                Vec2::new(0.0, h - c),
                Vec2::new(b, h - c - b),
                Vec2::new(b, mid + g + b),
                Vec2::new(0.0, mid + g),
            ],
            Side::UpperRight => [
                Vec2::new(w, mid + g),
                Vec2::new(w - b, mid + g + b),
                Vec2::new(w - b, h - c - b),
                Vec2::new(w, h - c),
            ],
            Side::LowerLeft => [
                Vec2::new(0.0, mid - g),
                Vec2::new(b, mid - g - b),
                Vec2::new(b, c + b),
                Vec2::new(0.0, c),
            ],
            Side::LowerRight => [
                Vec2::new(w, c),
                Vec2::new(w - b, c + b),
                Vec2::new(w - b, mid - g - b),
                Vec2::new(w, mid - g),
            ],
            Side::Bottom => [
                Vec2::new(c, 0.0),
                Vec2::new(c + b, b),
                Vec2::new(w - c - b, b),
                Vec2::new(w - c, 0.0),
            ],
        };

        Self {
            side,
            segments: [
                Segment::new(points[0], points[1]),
                Segment::new(points[1], points[2]),
                Segment::new(points[2], points[3]),
            ],
        }
    }

    /// All six cushions
    pub fn all(width: f32, height: f32) -> Vec<Wall> {
        Side::ALL
            .iter()
            .map(|&side| Wall::new(side, width, height))
            .collect()
    }

    #[inline]
    pub fn main(&self) -> Segment {
        self.segments[MAIN_SEGMENT]
    }
}

impl Collidable for Wall {
    fn collision_distance(&self, ball: &Ball, tick_duration: f32) -> Option<Impact> {
        let path = ball.trajectory(tick_duration);
        let swept = path.as_segment();

        let mut best: Option<(f32, usize)> = None;
        for index in SEGMENT_ORDER {
            let segment = self.segments[index];
            // Cheap reject before solving
            if shortest_distance_segment_segment(segment, swept) > ball.radius {
                continue;
            }
            if let Some(u) = toi_point_segment(path, segment, ball.radius) {
                if best.is_none_or(|(b, _)| u < b) {
                    best = Some((u, index));
                }
            }
        }

        best.map(|(u, segment)| {
            Impact::new(net_fraction(ball.progress, u), Contact::Cushion { segment })
        })
    }

    /// Reflect the ball about the direction from the hit segment to its
    /// center
    fn resolve(&mut self, impact: &Impact, ball: &mut Ball) {
        let Contact::Cushion { segment } = impact.contact else {
            return;
        };
        let Some(segment) = self.segments.get(segment) else {
            return;
        };

        let normal = closest_vector_segment_point(*segment, ball.pos).normalize_or_zero();
        // Only a ball moving into the cushion bounces
        if ball.vel.dot(normal) < 0.0 {
            let reflected = reflect_velocity(ball.vel, normal);
            ball.apply_impulse(reflected - ball.vel);
        }
    }
}
