//! Pool Sim headless runner
//!
//! Racks a table, plays a run of seeded pseudo-random shots and prints the
//! final ball state as JSON.
//!
//! Usage: `pool-sim [CONFIG.json] [SEED]`

use std::error::Error;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pool_sim::consts::{BALL_RADIUS, BANK_WIDTH};
use pool_sim::sim::CollisionEvent;
use pool_sim::{Cue, SimConfig, SimError, Table};

/// Shots played per run
const SHOT_COUNT: u32 = 12;
/// Ticks allowed for one shot to settle (two minutes of table time)
const MAX_TICKS_PER_SHOT: u32 = 12_000;
/// Random spots tried when the head spot is blocked after a scratch
const PLACEMENT_ATTEMPTS: u32 = 64;
const DEFAULT_SEED: u64 = 0x5eed;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut config_path = None;
    let mut seed = DEFAULT_SEED;
    for arg in std::env::args().skip(1) {
        match arg.parse::<u64>() {
            Ok(value) => seed = value,
            Err(_) => config_path = Some(arg),
        }
    }

    let config = match &config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    log::info!("Pool Sim starting (seed {seed})");

    let mut table = Table::configure(config)?;
    table.rack();
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut cue = Cue::new();

    for shot in 1..=SHOT_COUNT {
        if table.is_scratched() {
            replace_cue_ball(&mut table, &mut rng)?;
        }

        let angle = rng.random_range(0.0..TAU);
        let reach = rng.random_range(0.1..=1.0) * pool_sim::shot::MAX_AIM_DISTANCE;
        cue.aim_offset(Vec2::from_angle(angle) * reach);
        let Some(impulse) = cue.shoot(&mut table)? else {
            continue;
        };
        log::info!("Shot {shot}: impulse {impulse} (power {:.2})", cue.power());

        let mut ticks = 0;
        while !table.is_settled() {
            if ticks >= MAX_TICKS_PER_SHOT {
                log::warn!("Shot {shot} did not settle after {ticks} ticks");
                break;
            }
            let report = table.advance_tick();
            for event in &report.events {
                log_event(event);
            }
            ticks += 1;
        }
        log::info!(
            "Shot {shot} settled after {ticks} ticks, {} balls pocketed",
            table.pocketed_count()
        );

        if table.pocketed_count() == u32::from(pool_sim::consts::NUMBER_BALL_COUNT) {
            log::info!("Table cleared");
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&table.query_state())?);
    Ok(())
}

fn log_event(event: &CollisionEvent) {
    match event {
        CollisionEvent::BallBall { .. } | CollisionEvent::Cushion { .. } => {
            log::trace!("{event:?}")
        }
        CollisionEvent::Pocketed { ball, pocket, .. } => {
            log::debug!("Ball {ball} dropped in {pocket:?}")
        }
        CollisionEvent::Scratch { pocket, .. } => log::debug!("Scratch in {pocket:?}"),
    }
}

/// Put the cue ball on the head spot, or a free random spot if that is taken
fn replace_cue_ball(table: &mut Table, rng: &mut Pcg32) -> Result<(), SimError> {
    let (w, h) = (table.config().table_width, table.config().table_height);
    let head_spot = Vec2::new(w / 2.0, h / 4.0);
    let mut last_error = match table.place_cue_ball(head_spot) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    let margin = BALL_RADIUS + BANK_WIDTH;
    for _ in 0..PLACEMENT_ATTEMPTS {
        let spot = Vec2::new(
            rng.random_range(margin..w - margin),
            rng.random_range(margin..h - margin),
        );
        match table.place_cue_ball(spot) {
            Ok(()) => return Ok(()),
            Err(err) => last_error = err,
        }
    }
    Err(last_error)
}
