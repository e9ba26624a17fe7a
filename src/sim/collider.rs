//! Shared collision capability of balls, cushions and pockets

use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId};

/// What was touched, with enough detail to resolve the contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Contact {
    /// Another ball (the collider itself)
    Ball,
    /// One segment of a cushion, by index into the wall's polyline
    Cushion { segment: usize },
    /// A pocket's capture circle
    Pocket,
}

/// A detected contact of a moving ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    /// Net tick fraction at which the contact happens
    pub fraction: f32,
    pub contact: Contact,
}

impl Impact {
    pub fn new(fraction: f32, contact: Contact) -> Self {
        Self { fraction, contact }
    }
}

/// Address of a collider on the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderId {
    Ball(BallId),
    Wall(usize),
    Pocket(usize),
}

/// Anything a moving ball can run into
pub trait Collidable {
    /// Earliest contact of `ball`'s remaining tick trajectory with this
    /// collider, as a net tick fraction
    fn collision_distance(&self, ball: &Ball, tick_duration: f32) -> Option<Impact>;

    /// Commit a contact previously reported for `ball`
    fn resolve(&mut self, impact: &Impact, ball: &mut Ball);
}

/// Convert a fraction of the remaining path into a fraction of the whole
/// tick, given how much of the tick the ball had already completed
#[inline]
pub fn net_fraction(progress: f32, u: f32) -> f32 {
    progress + u * (1.0 - progress)
}
