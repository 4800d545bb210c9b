//! Progression and difficulty state machine
//!
//! ```text
//! Inactive --start--> Running <--pause/resume--> Paused
//! Running --lives exhausted--> GameOver
//! Running --goal reached--> Running (level + 1, harder field)
//! ```

use rand::Rng;

use super::state::{Difficulty, GamePhase, Player, WorldState};
use crate::settings::Settings;

/// Which difficulty axis a level advance raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaledAxis {
    Rows,
    ObstaclesPerRow,
}

/// Result of losing a life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeLoss {
    Respawned { lives: u8 },
    GameOver { final_level: u32 },
}

/// Raise exactly one difficulty axis for the level just reached
///
/// Even levels add a row; odd levels add one obstacle to both ends of the
/// per-row range.
pub fn scale_difficulty(difficulty: &mut Difficulty, new_level: u32) -> ScaledAxis {
    if new_level % 2 == 0 {
        difficulty.row_count += 1;
        ScaledAxis::Rows
    } else {
        difficulty.obstacles_per_row_min += 1;
        difficulty.obstacles_per_row_max += 1;
        ScaledAxis::ObstaclesPerRow
    }
}

/// The player has reached the goal band
#[inline]
pub fn reached_goal(player: &Player) -> bool {
    player.pos.y <= player.radius
}

/// Take a life; respawn or end the run
///
/// The obstacle field is left untouched on a respawn.
pub fn lose_life(world: &mut WorldState, settings: &Settings) -> LifeLoss {
    world.lives = world.lives.saturating_sub(1);

    if world.lives == 0 {
        let final_level = world.level;
        world.phase = GamePhase::GameOver { final_level };
        log::info!("Game over at level {}", final_level);
        return LifeLoss::GameOver { final_level };
    }

    world.respawn_player(settings);
    log::info!("Life lost, {} remaining", world.lives);
    LifeLoss::Respawned { lives: world.lives }
}

/// Advance to the next level: scale difficulty, regenerate the field, respawn
pub fn advance_level<R: Rng>(world: &mut WorldState, settings: &Settings, rng: &mut R) -> u32 {
    world.level += 1;
    let axis = scale_difficulty(&mut world.difficulty, world.level);
    match axis {
        ScaledAxis::Rows => log::info!("Level {}: rows -> {}", world.level, world.difficulty.row_count),
        ScaledAxis::ObstaclesPerRow => log::info!(
            "Level {}: obstacles per row -> {}..={}",
            world.level,
            world.difficulty.obstacles_per_row_min,
            world.difficulty.obstacles_per_row_max
        ),
    }

    world.regenerate_field(settings, rng);
    world.respawn_player(settings);
    world.level
}

/// Inactive -> Running
pub fn start(world: &mut WorldState) -> bool {
    if world.phase != GamePhase::Inactive {
        return false;
    }
    world.phase = GamePhase::Running;
    true
}

/// Running -> Paused; a no-op in any other phase
///
/// Held inputs are dropped, since their releases would be ignored while paused.
pub fn pause(world: &mut WorldState) -> bool {
    if world.phase != GamePhase::Running {
        return false;
    }
    world.phase = GamePhase::Paused;
    world.player.clear_intents();
    true
}

/// Paused -> Running
pub fn resume(world: &mut WorldState) -> bool {
    if world.phase != GamePhase::Paused {
        return false;
    }
    world.phase = GamePhase::Running;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DeviceProfile;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world(rng: &mut Pcg32) -> WorldState {
        WorldState::new(&Settings::default(), 800.0, 600.0, DeviceProfile::Desktop, rng)
    }

    #[test]
    fn test_scaling_alternates() {
        let mut d = Difficulty::default();
        let base = d;

        assert_eq!(scale_difficulty(&mut d, 2), ScaledAxis::Rows);
        assert_eq!(d.row_count, base.row_count + 1);
        assert_eq!(d.obstacles_per_row_min, base.obstacles_per_row_min);
        assert_eq!(d.obstacles_per_row_max, base.obstacles_per_row_max);

        assert_eq!(scale_difficulty(&mut d, 3), ScaledAxis::ObstaclesPerRow);
        assert_eq!(d.row_count, base.row_count + 1);
        assert_eq!(d.obstacles_per_row_min, base.obstacles_per_row_min + 1);
        assert_eq!(d.obstacles_per_row_max, base.obstacles_per_row_max + 1);
    }

    #[test]
    fn test_difficulty_never_relaxes() {
        let mut d = Difficulty::default();
        for level in 2..40 {
            let before = d;
            scale_difficulty(&mut d, level);
            assert!(d.row_count >= before.row_count);
            assert!(d.obstacles_per_row_min >= before.obstacles_per_row_min);
            assert!(d.obstacles_per_row_max >= before.obstacles_per_row_max);
        }
    }

    #[test]
    fn test_lose_life_respawns() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = world(&mut rng);
        let settings = Settings::default();
        start(&mut w);
        let field: Vec<_> = w.obstacles.iter().map(|o| (o.key(), o.pos)).collect();
        w.player.pos.y = 100.0;
        w.player.pos.x = 12.0;

        assert_eq!(lose_life(&mut w, &settings), LifeLoss::Respawned { lives: 2 });
        assert_eq!(w.player.pos.x, 400.0);
        assert_eq!(w.player.pos.y, 600.0 - w.player.size());
        assert_eq!(w.phase, GamePhase::Running);
        let after: Vec<_> = w.obstacles.iter().map(|o| (o.key(), o.pos)).collect();
        assert_eq!(field, after);
    }

    #[test]
    fn test_lose_last_life() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = world(&mut rng);
        start(&mut w);
        w.lives = 1;
        w.level = 4;
        assert_eq!(
            lose_life(&mut w, &Settings::default()),
            LifeLoss::GameOver { final_level: 4 }
        );
        assert_eq!(w.lives, 0);
        assert_eq!(w.game_over(), Some(4));
    }

    #[test]
    fn test_advance_level() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut w = world(&mut rng);
        let settings = Settings::default();
        w.threats.observe(w.obstacles[0].key(), 0.3, 0.8);
        w.player.pos.y = 5.0;
        assert!(reached_goal(&w.player));

        assert_eq!(advance_level(&mut w, &settings, &mut rng), 2);
        assert_eq!(w.difficulty.row_count, settings.difficulty.row_count + 1);
        assert!(w.threats.is_empty());
        let rows = w.obstacles.iter().map(|o| o.row).max().unwrap() + 1;
        assert_eq!(rows, w.difficulty.row_count);
        assert!(!reached_goal(&w.player));
    }

    #[test]
    fn test_phase_guards() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut w = world(&mut rng);

        assert!(!pause(&mut w));
        assert!(!resume(&mut w));
        assert!(start(&mut w));
        assert!(!start(&mut w));

        w.player.braking = true;
        assert!(pause(&mut w));
        assert!(!w.player.braking);
        assert!(!pause(&mut w));
        assert!(resume(&mut w));

        w.phase = GamePhase::GameOver { final_level: 1 };
        assert!(!pause(&mut w));
        assert!(!resume(&mut w));
        assert!(!start(&mut w));
    }
}
