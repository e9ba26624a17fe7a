//! Fixed timestep sub-stepped tick
//!
//! Each tick moves every ball along its straight-line trajectory. Whenever a
//! ball would touch something part way through, all balls are advanced to
//! that moment, the contact is resolved and the search restarts from there
//! until the whole tick has been applied.

use serde::{Deserialize, Serialize};

use super::ball::BallId;
use super::collider::{ColliderId, Impact};
use super::pocket::PocketPosition;
use super::state::Table;
use super::wall::Side;
use crate::consts::CONTACT_BIAS;

/// A contact resolved during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionEvent {
    BallBall {
        fraction: f32,
        striker: BallId,
        struck: BallId,
    },
    Cushion {
        fraction: f32,
        ball: BallId,
        side: Side,
    },
    Pocketed {
        fraction: f32,
        ball: BallId,
        pocket: PocketPosition,
    },
    /// The cue ball went down
    Scratch {
        fraction: f32,
        ball: BallId,
        pocket: PocketPosition,
    },
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Resolved contacts in the order they happened
    pub events: Vec<CollisionEvent>,
    /// Sub-steps taken; 0 when nothing was moving
    pub substeps: u32,
}

/// Upper bound on sub-steps per tick for a table with `collider_count`
/// colliders
#[inline]
pub fn max_substeps(collider_count: usize) -> u32 {
    u32::try_from(collider_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(16)
        .saturating_add(32)
}

/// Earliest contact found in one scan
#[derive(Debug, Clone, Copy)]
struct Hit {
    mover: BallId,
    target: ColliderId,
    impact: Impact,
}

/// Pairs already resolved at the current lower bound
///
/// A pair stays excluded until the lower bound moves on or one of its balls
/// takes part in another contact.
#[derive(Debug, Default)]
struct Resolved {
    pairs: Vec<(BallId, ColliderId)>,
}

impl Resolved {
    /// Same pair of colliders, in either role
    fn contains(&self, mover: BallId, target: ColliderId) -> bool {
        self.pairs.iter().any(|&(m, t)| {
            (m, t) == (mover, target)
                || (ColliderId::Ball(m), t) == (target, ColliderId::Ball(mover))
        })
    }

    fn record(&mut self, mover: BallId, target: ColliderId) {
        let struck = match target {
            ColliderId::Ball(id) => Some(id),
            _ => None,
        };
        let touches = |id: BallId| id == mover || Some(id) == struck;
        self.pairs.retain(|&(m, t)| {
            let other = match t {
                ColliderId::Ball(id) => touches(id),
                _ => false,
            };
            !touches(m) && !other
        });
        self.pairs.push((mover, target));
    }

    fn clear(&mut self) {
        self.pairs.clear();
    }
}

/// Advance the table by one tick
pub fn advance_tick(table: &mut Table) -> TickReport {
    let mut report = TickReport::default();
    if table.is_settled() {
        return report;
    }
    table.time_ticks += 1;

    let cap = max_substeps(table.collider_count());
    let mut floor = 0.0_f32;
    let mut resolved = Resolved::default();

    loop {
        report.substeps += 1;
        if report.substeps >= cap {
            log::warn!(
                "Sub-step cap {cap} hit on tick {}, finishing without resolving",
                table.time_ticks
            );
            advance_all(table, 1.0);
            break;
        }

        let Some(hit) = find_earliest(table, floor, &resolved) else {
            advance_all(table, 1.0);
            break;
        };

        let fraction = hit.impact.fraction;
        advance_all(table, fraction);
        if let Some(event) = resolve(table, &hit) {
            report.events.push(event);
        }
        if fraction >= 1.0 {
            break;
        }

        let next_floor = (fraction - CONTACT_BIAS).max(floor);
        if next_floor > floor {
            resolved.clear();
            floor = next_floor;
        }
        resolved.record(hit.mover, hit.target);
    }

    report
}

/// Scan every moving ball against every collider for the earliest contact at
/// or after `floor`, skipping pairs already resolved there
fn find_earliest(table: &Table, floor: f32, resolved: &Resolved) -> Option<Hit> {
    let tick_duration = table.config().tick_duration;
    let mut best: Option<Hit> = None;

    for mover in table.balls().iter().filter(|b| b.is_moving()) {
        for target in table.collider_ids() {
            if resolved.contains(mover.id, target) {
                continue;
            }
            let Some(collider) = table.collider(target) else {
                continue;
            };
            let Some(impact) = collider.collision_distance(mover, tick_duration) else {
                continue;
            };
            let fraction = impact.fraction;
            if fraction.is_nan() || fraction < floor || fraction > 1.0 {
                continue;
            }
            if best.is_none_or(|b| fraction < b.impact.fraction) {
                best = Some(Hit {
                    mover: mover.id,
                    target,
                    impact,
                });
            }
        }
    }

    best
}

fn advance_all(table: &mut Table, target: f32) {
    let config = *table.config();
    for ball in table.balls_mut().iter_mut().filter(|b| b.on_table()) {
        ball.advance(target, &config);
    }
}

fn resolve(table: &mut Table, hit: &Hit) -> Option<CollisionEvent> {
    let fraction = hit.impact.fraction;
    {
        let (ball, collider) = table.contact_pair_mut(hit.mover, hit.target)?;
        collider.resolve(&hit.impact, ball);
    }

    let event = match hit.target {
        ColliderId::Ball(struck) => {
            log::debug!("Ball {} hit ball {struck} at {fraction:.4}", hit.mover);
            CollisionEvent::BallBall {
                fraction,
                striker: hit.mover,
                struck,
            }
        }
        ColliderId::Wall(index) => {
            let side = table.walls().get(index)?.side;
            log::debug!("Ball {} hit {side:?} cushion at {fraction:.4}", hit.mover);
            CollisionEvent::Cushion {
                fraction,
                ball: hit.mover,
                side,
            }
        }
        ColliderId::Pocket(index) => {
            let pocket = table.pockets().get(index)?.position;
            if table.record_capture(hit.mover) {
                log::info!("Scratch: cue ball {} down in {pocket:?}", hit.mover);
                CollisionEvent::Scratch {
                    fraction,
                    ball: hit.mover,
                    pocket,
                }
            } else {
                log::info!("Ball {} pocketed in {pocket:?}", hit.mover);
                CollisionEvent::Pocketed {
                    fraction,
                    ball: hit.mover,
                    pocket,
                }
            }
        }
    };
    Some(event)
}
