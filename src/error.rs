//! Errors raised at the simulation boundary.
//!
//! Geometry never fails: degenerate or out-of-range contacts are reported as
//! "no collision". Only caller mistakes surface here.

use glam::Vec2;
use thiserror::Error;

use crate::sim::BallId;

/// Result type alias for simulation boundary calls.
pub type SimResult<T> = Result<T, SimError>;

/// Errors that can occur when configuring or driving a table.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No ball carries this id.
    #[error("unknown ball {0}")]
    UnknownBall(BallId),

    /// The ball is in a pocket and cannot be struck.
    #[error("ball {0} is not on the table")]
    BallPocketed(BallId),

    /// Impulse with NaN or infinite components.
    #[error("non-finite impulse {0}")]
    NonFiniteImpulse(Vec2),

    /// Cue ball placement rejected.
    #[error("cannot place cue ball at {position}: {reason}")]
    InvalidPlacement { position: Vec2, reason: &'static str },

    /// Cue ball placement requested without a scratch.
    #[error("cue ball is still on the table")]
    NotScratched,

    /// A shot was requested while balls are still rolling.
    #[error("balls are still moving")]
    BallsMoving,

    /// The table has no cue ball on it.
    #[error("no cue ball on the table")]
    NoCueBall,

    /// Reading a config file failed.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    /// A config file is not valid JSON for `SimConfig`.
    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SimError {
    /// Create an invalid config error.
    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}
