//! Pool Sim - continuous-collision billiards core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, entities, sub-stepped tick)
//! - `shot`: Cue strike adapter (pointer offset to velocity impulse)
//! - `config`: Table/physics configuration
//! - `error`: Boundary errors
//!
//! Coordinates are table-relative SI units: the bottom-left corner of the
//! playing area is (0, 0), +x runs along the short side and +y along the long
//! side, so the opposite corner is (width, height).

pub mod config;
pub mod error;
pub mod shot;
pub mod sim;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use shot::Cue;
pub use sim::{BallId, BallSnapshot, CollisionEvent, Table, TickReport};

/// Physical constants of the reference table and ball set
pub mod consts {
    /// Reference playing area (4' x 8'), meters
    pub const TABLE_WIDTH: f32 = 1.2192;
    pub const TABLE_HEIGHT: f32 = 2.4384;

    /// Rolling friction coefficient between ball and cloth
    pub const COEFF_FRICTION: f32 = 0.2;
    /// Gravitational acceleration, m/s²
    pub const GRAVITY: f32 = 9.81;
    /// Default tick (scheduler timer interval of 10 ms)
    pub const TICK_DURATION: f32 = 0.01;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.028575;
    pub const CUE_BALL_MASS: f32 = 0.17;
    pub const NUMBER_BALL_MASS: f32 = 0.16;
    /// Numbered balls in a full rack
    pub const NUMBER_BALL_COUNT: u8 = 15;
    /// Gap between neighbouring balls in the rack
    pub const RACK_GAP: f32 = 0.001;

    /// Cushion depth from rail to cushion nose
    pub const BANK_WIDTH: f32 = 0.05;
    /// Rail length cut away by each corner pocket
    pub const CORNER_CUT: f32 = 0.083;
    /// Half-width of the side pocket mouth, measured from the mid line
    pub const SIDE_POCKET_HALF_GAP: f32 = 0.04;

    /// Pocket defaults
    pub const POCKET_RADIUS: f32 = 0.057;
    /// Corner pocket center inset along both axes
    pub const CORNER_POCKET_INSET: f32 = 0.043;
    /// Side pocket center sits this far outside the long rail
    pub const SIDE_POCKET_OVERHANG: f32 = 0.02;

    /// Progress bias left behind after a contact so the same contact is not
    /// found again later in the tick
    pub const CONTACT_BIAS: f32 = 0.0001;
}
