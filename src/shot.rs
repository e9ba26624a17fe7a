//! Cue strike adapter
//!
//! Turns a pointer position on the table into a velocity impulse on the cue
//! ball. The striker sits at the pointer, at most `MAX_AIM_DISTANCE` from the
//! ball; the further out it sits the harder the shot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::sim::Table;

/// Furthest the striker can be from the cue ball, meters
pub const MAX_AIM_DISTANCE: f32 = 0.5;
/// Cue ball speed at full power, m/s
pub const MAX_SHOT_SPEED: f32 = 5.0;

/// Cue striker state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Striker position relative to the cue ball, clamped to
    /// `MAX_AIM_DISTANCE`
    offset: Vec2,
}

impl Cue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the striker to `pointer`, both in table coordinates
    pub fn aim(&mut self, pointer: Vec2, cue_ball: Vec2) {
        self.aim_offset(pointer - cue_ball);
    }

    /// Move the striker to `offset` from the cue ball
    pub fn aim_offset(&mut self, offset: Vec2) {
        self.offset = if offset.is_finite() {
            offset.clamp_length_max(MAX_AIM_DISTANCE)
        } else {
            Vec2::ZERO
        };
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Strength of a shot taken now, 0..=1
    pub fn power(&self) -> f32 {
        self.offset.length() / MAX_AIM_DISTANCE
    }

    /// Velocity change a shot taken now would give the cue ball
    pub fn impulse(&self) -> Vec2 {
        self.offset * (MAX_SHOT_SPEED / MAX_AIM_DISTANCE)
    }

    /// Strike the cue ball, returning the impulse applied
    ///
    /// Returns `Ok(None)` when the striker sits on the ball. Shots are only
    /// allowed once the table has settled and the cue ball is on it.
    pub fn shoot(&self, table: &mut Table) -> SimResult<Option<Vec2>> {
        if !table.is_settled() {
            return Err(SimError::BallsMoving);
        }
        if table.is_scratched() {
            return Err(SimError::NoCueBall);
        }
        let cue = table.cue_id().ok_or(SimError::NoCueBall)?;

        let impulse = self.impulse();
        if impulse == Vec2::ZERO {
            return Ok(None);
        }
        table.apply_impulse(cue, impulse)?;
        log::debug!("Shot at power {:.2}: {impulse}", self.power());
        Ok(Some(impulse))
    }
}
