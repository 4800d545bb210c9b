//! Fixed-step simulation tick
//!
//! One call is one frame: threat tracking, motion, collision, progression.

use rand::Rng;

use super::collision::check_collisions;
use super::kinematics::advance;
use super::progression::{LifeLoss, advance_level, lose_life, reached_goal};
use super::state::WorldState;
use super::threat::update_threat_table;
use crate::settings::Settings;

/// What a tick did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened
    Idle,
    Continue,
    LifeLost { lives: u8 },
    LevelUp { level: u32 },
    GameOver { final_level: u32 },
}

/// Advance the world by one fixed step
///
/// Only runs while the phase is `Running`. A tick that costs a life never
/// also advances the level.
pub fn tick<R: Rng>(world: &mut WorldState, settings: &Settings, rng: &mut R) -> TickOutcome {
    if !world.is_running() {
        return TickOutcome::Idle;
    }

    // Bearings are sampled before motion, matching what was last drawn
    update_threat_table(
        &mut world.threats,
        &world.player,
        &world.obstacles,
        settings.threat.smoothing,
    );

    advance(world);

    let hit = check_collisions(&world.player, &world.obstacles).map(|o| o.key());
    if let Some(key) = hit {
        log::debug!("Collision with obstacle {}:{} at level {}", key.row, key.slot, world.level);
        return match lose_life(world, settings) {
            LifeLoss::Respawned { lives } => TickOutcome::LifeLost { lives },
            LifeLoss::GameOver { final_level } => TickOutcome::GameOver { final_level },
        };
    }

    if reached_goal(&world.player) {
        let level = advance_level(world, settings, rng);
        return TickOutcome::LevelUp { level };
    }

    TickOutcome::Continue
}
