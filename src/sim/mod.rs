//! Deterministic simulation module
//!
//! All table physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by ball id, then walls, then pockets)
//! - No rendering or platform dependencies

pub mod ball;
pub mod collider;
pub mod geometry;
pub mod pocket;
pub mod state;
pub mod tick;
pub mod wall;

pub use ball::{Ball, BallId, BallKind, BallState};
pub use collider::{Collidable, ColliderId, Contact, Impact};
pub use pocket::{Pocket, PocketPosition};
pub use state::{BallSnapshot, Table};
pub use tick::{CollisionEvent, TickReport, advance_tick, max_substeps};
pub use wall::{Side, Wall};
