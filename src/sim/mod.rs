//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep (one tick per frame callback)
//! - Randomness only through the caller's RNG
//! - Stable iteration order (row, then slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod field;
pub mod kinematics;
pub mod progression;
pub mod state;
pub mod threat;
pub mod tick;

pub use collision::{check_collisions, circles_overlap};
pub use field::{PALETTE_LEN, generate_field};
pub use kinematics::{advance, advance_obstacles, advance_player};
pub use progression::{LifeLoss, ScaledAxis, advance_level, lose_life, reached_goal, scale_difficulty};
pub use state::{Difficulty, GamePhase, LateralIntent, Obstacle, ObstacleKey, Player, WorldState};
pub use threat::{BearingTrack, DangerLevel, ThreatTable, danger_level, is_ahead, is_approaching, update_threat_table};
pub use tick::{TickOutcome, tick};
