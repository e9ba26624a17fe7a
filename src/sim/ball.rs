//! Ball entity and its per-tick motion

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::{Collidable, Contact, Impact, net_fraction};
use super::geometry::{
    Trajectory, elastic_collision_velocities, toi_point_point, toi_point_static,
};
use crate::config::SimConfig;
use crate::consts::*;

/// Stable ball identifier (index into the table's ball arena)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BallId(pub u32);

impl BallId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ball category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    Cue,
    /// Numbered object ball, 1..=15
    Number(u8),
}

impl BallKind {
    /// Mass in kilograms
    pub fn mass(self) -> f32 {
        match self {
            BallKind::Cue => CUE_BALL_MASS,
            BallKind::Number(_) => NUMBER_BALL_MASS,
        }
    }
}

/// Whether a ball is still in play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    OnTable,
    /// Captured by a pocket; number balls stay here, the cue ball waits to be
    /// placed again
    Pocketed,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub kind: BallKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub mass: f32,
    pub radius: f32,
    /// Fraction of the current tick's trajectory already applied
    pub progress: f32,
    pub state: BallState,
}

impl Ball {
    pub fn new(id: BallId, kind: BallKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            mass: kind.mass(),
            radius: BALL_RADIUS,
            progress: 0.0,
            state: BallState::OnTable,
        }
    }

    #[inline]
    pub fn is_cue(&self) -> bool {
        self.kind == BallKind::Cue
    }

    #[inline]
    pub fn on_table(&self) -> bool {
        self.state == BallState::OnTable
    }

    /// On the table with non-zero velocity
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.on_table() && self.vel != Vec2::ZERO
    }

    /// Remaining path for the current tick
    pub fn trajectory(&self, tick_duration: f32) -> Trajectory {
        let end = self.pos + self.vel * (1.0 - self.progress) * tick_duration;
        Trajectory::new(self.pos, end)
    }

    /// Move from the current progress to `target` (both tick fractions),
    /// slowing down by rolling friction over the elapsed time
    ///
    /// Reaching 1 closes the tick and resets progress to 0. Any other target
    /// stops `CONTACT_BIAS` short so the contact that ended this sub-step is
    /// not found again.
    pub fn advance(&mut self, target: f32, config: &SimConfig) {
        let end_of_tick = target >= 1.0;
        let new_progress = if end_of_tick {
            1.0
        } else {
            (target - CONTACT_BIAS).max(self.progress)
        };
        let step = new_progress - self.progress;

        if self.vel != Vec2::ZERO && step > 0.0 {
            let elapsed = step * config.tick_duration;
            self.pos += self.vel * elapsed;
            self.vel = apply_friction(self.vel, config.deceleration() * elapsed);
        }

        self.progress = if end_of_tick { 0.0 } else { new_progress };
    }

    /// Add an instantaneous velocity change
    #[inline]
    pub fn apply_impulse(&mut self, delta_v: Vec2) {
        self.vel += delta_v;
    }

    /// Put the ball on the table at rest
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.progress = 0.0;
        self.state = BallState::OnTable;
    }

    /// Take the ball out of play
    pub fn capture(&mut self) {
        self.vel = Vec2::ZERO;
        self.progress = 0.0;
        self.state = BallState::Pocketed;
    }

    /// Exchange velocities with `other` as an elastic collision at the
    /// current positions
    pub fn collide(&mut self, other: &mut Ball) {
        let (v1, v2) = elastic_collision_velocities(
            self.mass, self.vel, self.pos, other.mass, other.vel, other.pos,
        );
        self.vel = v1;
        other.vel = v2;
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.vel.length_squared()
    }
}

/// Shrink speed by `delta_v` without changing direction, stopping dead once
/// friction would take more than the remaining speed
pub fn apply_friction(vel: Vec2, delta_v: f32) -> Vec2 {
    let speed = vel.length();
    if delta_v >= speed {
        Vec2::ZERO
    } else {
        vel - vel / speed * delta_v
    }
}

/// A ball seen as the struck party of a ball-ball contact
impl Collidable for Ball {
    fn collision_distance(&self, mover: &Ball, tick_duration: f32) -> Option<Impact> {
        if self.id == mover.id || !self.on_table() {
            return None;
        }
        let path = mover.trajectory(tick_duration);
        let distance = self.radius + mover.radius;
        let u = if self.vel == Vec2::ZERO {
            toi_point_static(path, self.pos, distance)
        } else {
            toi_point_point(path, self.trajectory(tick_duration), distance)
        }?;
        Some(Impact::new(net_fraction(mover.progress, u), Contact::Ball))
    }

    fn resolve(&mut self, _impact: &Impact, mover: &mut Ball) {
        mover.collide(self);
    }
}
