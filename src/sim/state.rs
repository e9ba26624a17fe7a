//! Table state: the simulation context owned by the scheduler
//!
//! All state needed to reproduce a run lives here. Balls are stored in an
//! arena indexed by `BallId` so contacts can borrow two balls at once without
//! the balls referencing each other.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId, BallKind, BallState};
use super::collider::{Collidable, ColliderId};
use super::pocket::Pocket;
use super::tick::{TickReport, advance_tick};
use super::wall::Wall;
use crate::config::SimConfig;
use crate::consts::*;
use crate::error::{SimError, SimResult};

/// What the renderer needs to draw one ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub id: BallId,
    pub kind: BallKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Still on the table
    pub active: bool,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    config: SimConfig,
    /// Ball arena, index == id
    balls: Vec<Ball>,
    walls: Vec<Wall>,
    pockets: Vec<Pocket>,
    /// Cue ball is down and waiting to be placed
    scratched: bool,
    /// Numbered balls pocketed so far
    pocketed: u32,
    /// Ticks in which at least one ball moved
    pub time_ticks: u64,
}

impl Table {
    /// Build an empty table (cushions and pockets, no balls) for `config`
    pub fn configure(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let walls = Wall::all(config.table_width, config.table_height);
        let pockets = Pocket::all(config.table_width, config.table_height);
        Ok(Self {
            config,
            balls: Vec::new(),
            walls,
            pockets,
            scratched: false,
            pocketed: 0,
            time_ticks: 0,
        })
    }

    /// Replace all balls with a fresh rack: cue ball at the head spot and the
    /// fifteen numbered balls in a triangle around the 8 ball at the foot
    pub fn rack(&mut self) {
        self.rack_with_gap(RACK_GAP);
    }

    /// Same as `rack`, with `gap` between the surfaces of neighbouring balls
    /// (0 for a frozen, touching rack)
    pub fn rack_with_gap(&mut self, gap: f32) {
        let (w, h) = (self.config.table_width, self.config.table_height);
        self.balls.clear();
        self.scratched = false;
        self.pocketed = 0;

        self.balls
            .push(Ball::new(BallId(0), BallKind::Cue, Vec2::new(w / 2.0, h / 4.0)));
        let apex = Vec2::new(w / 2.0, 3.0 * h / 4.0);
        for number in 1..=NUMBER_BALL_COUNT {
            let id = BallId(self.balls.len() as u32);
            let pos = apex + rack_offset(number, gap);
            self.balls.push(Ball::new(id, BallKind::Number(number), pos));
        }
        log::info!("Racked {} balls", self.balls.len());
    }

    /// Add a resting ball, returning its id
    pub fn add_ball(&mut self, kind: BallKind, pos: Vec2) -> SimResult<BallId> {
        if !pos.is_finite() {
            return Err(SimError::InvalidPlacement {
                position: pos,
                reason: "position is not finite",
            });
        }
        let id = BallId(self.balls.len() as u32);
        self.balls.push(Ball::new(id, kind, pos));
        Ok(id)
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id.index())
    }

    /// Id of the cue ball, if one is on the table or waiting to be placed
    pub fn cue_id(&self) -> Option<BallId> {
        self.balls.iter().find(|b| b.is_cue()).map(|b| b.id)
    }

    /// Run one sub-stepped tick
    pub fn advance_tick(&mut self) -> TickReport {
        advance_tick(self)
    }

    /// Strike a ball with an instantaneous velocity change
    pub fn apply_impulse(&mut self, id: BallId, delta_v: Vec2) -> SimResult<()> {
        if !delta_v.is_finite() {
            return Err(SimError::NonFiniteImpulse(delta_v));
        }
        let ball = self
            .balls
            .get_mut(id.index())
            .ok_or(SimError::UnknownBall(id))?;
        if !ball.on_table() {
            return Err(SimError::BallPocketed(id));
        }
        ball.apply_impulse(delta_v);
        log::debug!("Impulse {delta_v} on ball {id}");
        Ok(())
    }

    /// Positions and velocities for rendering, in id order
    pub fn query_state(&self) -> Vec<BallSnapshot> {
        self.balls
            .iter()
            .map(|b| BallSnapshot {
                id: b.id,
                kind: b.kind,
                pos: b.pos,
                vel: b.vel,
                active: b.on_table(),
            })
            .collect()
    }

    /// No ball on the table is moving
    pub fn is_settled(&self) -> bool {
        !self.balls.iter().any(Ball::is_moving)
    }

    /// The cue ball went down and has not been placed yet
    #[inline]
    pub fn is_scratched(&self) -> bool {
        self.scratched
    }

    /// Numbered balls pocketed since the last rack
    #[inline]
    pub fn pocketed_count(&self) -> u32 {
        self.pocketed
    }

    /// Put the cue ball back on the table after a scratch
    ///
    /// The center must keep a ball's radius clear of the cushion noses and
    /// must not overlap any ball still on the table.
    pub fn place_cue_ball(&mut self, pos: Vec2) -> SimResult<()> {
        if !self.scratched {
            return Err(SimError::NotScratched);
        }
        let cue = self.cue_id().ok_or(SimError::NotScratched)?;

        let margin = BALL_RADIUS + BANK_WIDTH;
        let (w, h) = (self.config.table_width, self.config.table_height);
        let inside = pos.is_finite()
            && pos.x >= margin
            && pos.x < w - margin
            && pos.y >= margin
            && pos.y < h - margin;
        if !inside {
            log::warn!("Rejected cue ball placement at {pos}");
            return Err(SimError::InvalidPlacement {
                position: pos,
                reason: "outside the playing area",
            });
        }
        let blocked = self
            .balls
            .iter()
            .filter(|b| b.on_table() && b.id != cue)
            .any(|b| b.pos.distance(pos) < b.radius + BALL_RADIUS);
        if blocked {
            log::warn!("Rejected cue ball placement at {pos}");
            return Err(SimError::InvalidPlacement {
                position: pos,
                reason: "overlaps another ball",
            });
        }

        self.balls[cue.index()].place(pos);
        self.scratched = false;
        log::info!("Cue ball placed at {pos}");
        Ok(())
    }

    /// Number of colliders a moving ball is tested against
    pub fn collider_count(&self) -> usize {
        self.balls.len() + self.walls.len() + self.pockets.len()
    }

    /// Every collider in search order: balls by id, then walls, then pockets
    pub(crate) fn collider_ids(&self) -> impl Iterator<Item = ColliderId> + '_ {
        let balls = self
            .balls
            .iter()
            .filter(|b| b.on_table())
            .map(|b| ColliderId::Ball(b.id));
        let walls = (0..self.walls.len()).map(ColliderId::Wall);
        let pockets = (0..self.pockets.len()).map(ColliderId::Pocket);
        balls.chain(walls).chain(pockets)
    }

    pub(crate) fn collider(&self, id: ColliderId) -> Option<&dyn Collidable> {
        match id {
            ColliderId::Ball(ball) => self.balls.get(ball.index()).map(|b| b as &dyn Collidable),
            ColliderId::Wall(i) => self.walls.get(i).map(|w| w as &dyn Collidable),
            ColliderId::Pocket(i) => self.pockets.get(i).map(|p| p as &dyn Collidable),
        }
    }

    pub(crate) fn balls_mut(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    /// Split borrows for resolving a contact: the moving ball and whatever it
    /// touched
    pub(crate) fn contact_pair_mut(
        &mut self,
        mover: BallId,
        target: ColliderId,
    ) -> Option<(&mut Ball, &mut dyn Collidable)> {
        match target {
            ColliderId::Ball(other) => {
                let (i, j) = (mover.index(), other.index());
                if i == j || i >= self.balls.len() || j >= self.balls.len() {
                    return None;
                }
                let (a, b) = if i < j {
                    let (lo, hi) = self.balls.split_at_mut(j);
                    (&mut lo[i], &mut hi[0])
                } else {
                    let (lo, hi) = self.balls.split_at_mut(i);
                    (&mut hi[0], &mut lo[j])
                };
                Some((a, b as &mut dyn Collidable))
            }
            ColliderId::Wall(w) => {
                let ball = self.balls.get_mut(mover.index())?;
                let wall = self.walls.get_mut(w)?;
                Some((ball, wall as &mut dyn Collidable))
            }
            ColliderId::Pocket(p) => {
                let ball = self.balls.get_mut(mover.index())?;
                let pocket = self.pockets.get_mut(p)?;
                Some((ball, pocket as &mut dyn Collidable))
            }
        }
    }

    /// Book-keeping after a pocket took `id`; returns true for a scratch
    pub(crate) fn record_capture(&mut self, id: BallId) -> bool {
        let Some(ball) = self.balls.get(id.index()) else {
            return false;
        };
        debug_assert_eq!(ball.state, BallState::Pocketed);
        if ball.is_cue() {
            self.scratched = true;
            true
        } else {
            self.pocketed += 1;
            false
        }
    }
}

/// Offset of a numbered ball from the 8 ball in the rack triangle
fn rack_offset(number: u8, gap: f32) -> Vec2 {
    let s = 2.0 * BALL_RADIUS + gap;
    let (cos60, sin60) = (0.5_f32, 3.0_f32.sqrt() / 2.0);
    let (x, y) = match number {
        1 => (0.0, -2.0 * s * sin60),
        2 => (s * cos60, -s * sin60),
        3 => (-s, 0.0),
        4 => (-s - s * cos60, s * sin60),
        5 => (0.0, 2.0 * s * sin60),
        6 => (2.0 * s, 2.0 * s * sin60),
        7 => (s * cos60, s * sin60),
        9 => (-s, 2.0 * s * sin60),
        10 => (-s * cos60, s * sin60),
        11 => (s, 2.0 * s * sin60),
        12 => (s, 0.0),
        13 => (-2.0 * s, 2.0 * s * sin60),
        14 => (-s * cos60, -s * sin60),
        15 => (s + s * cos60, s * sin60),
        _ => (0.0, 0.0),
    };
    Vec2::new(x, y)
}
