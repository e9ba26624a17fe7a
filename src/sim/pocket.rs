//! Pockets: static capture circles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::collider::{Collidable, Contact, Impact, net_fraction};
use super::geometry::toi_point_static;
use crate::consts::*;

/// Which pocket of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PocketPosition {
    TopLeft,
    TopRight,
    /// Side pocket on the x = 0 rail
    Left,
    /// Side pocket on the x = width rail
    Right,
    BottomLeft,
    BottomRight,
}

impl PocketPosition {
    pub const ALL: [PocketPosition; 6] = [
        PocketPosition::TopLeft,
        PocketPosition::TopRight,
        PocketPosition::Left,
        PocketPosition::Right,
        PocketPosition::BottomLeft,
        PocketPosition::BottomRight,
    ];
}

/// A pocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pocket {
    pub position: PocketPosition,
    pub center: Vec2,
    pub radius: f32,
}

impl Pocket {
    pub fn new(position: PocketPosition, width: f32, height: f32) -> Self {
        let (w, h) = (width, height);
        let inset = CORNER_POCKET_INSET;
        let center = match position {
            PocketPosition::TopLeft => Vec2::new(inset, h - inset),
            PocketPosition::TopRight => Vec2::new(w - inset, h - inset),
            PocketPosition::Left => Vec2::new(-SIDE_POCKET_OVERHANG, h / 2.0),
            PocketPosition::Right => Vec2::new(w + SIDE_POCKET_OVERHANG, h / 2.0),
            PocketPosition::BottomLeft => Vec2::new(inset, inset),
            PocketPosition::BottomRight => Vec2::new(w - inset, inset),
        };
        Self {
            position,
            center,
            radius: POCKET_RADIUS,
        }
    }

    /// All six pockets
    pub fn all(width: f32, height: f32) -> Vec<Pocket> {
        PocketPosition::ALL
            .iter()
            .map(|&position| Pocket::new(position, width, height))
            .collect()
    }

    /// Distance between pocket and ball centers at which the ball drops
    #[inline]
    pub fn capture_radius(&self, ball_radius: f32) -> f32 {
        self.radius + ball_radius
    }
}

impl Collidable for Pocket {
    fn collision_distance(&self, ball: &Ball, tick_duration: f32) -> Option<Impact> {
        if !ball.on_table() {
            return None;
        }
        let path = ball.trajectory(tick_duration);
        let u = toi_point_static(path, self.center, self.capture_radius(ball.radius))?;
        Some(Impact::new(net_fraction(ball.progress, u), Contact::Pocket))
    }

    /// Take the ball out of play. The table decides whether that is a scratch.
    fn resolve(&mut self, _impact: &Impact, ball: &mut Ball) {
        ball.capture();
    }
}
