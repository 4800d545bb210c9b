//! World state and core simulation types
//!
//! `WorldState` is the single owned aggregate every component works on.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::field::generate_field;
use super::threat::ThreatTable;
use crate::consts::*;
use crate::settings::{DeviceProfile, PlayerSpeeds, Settings, derive_speeds};

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Field laid out, waiting for start
    Inactive,
    /// Ticking
    Running,
    /// Ticks withheld until resumed
    Paused,
    /// Lives exhausted; `final_level` is the score
    GameOver { final_level: u32 },
}

/// Difficulty parameters; only ever raised while a run lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    pub row_count: u32,
    pub obstacles_per_row_min: u32,
    pub obstacles_per_row_max: u32,
    pub obstacle_speed_min: f32,
    pub obstacle_speed_max: f32,
    pub obstacle_radius: f32,
    pub player_radius: f32,
    pub player_base_speed: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            row_count: ROW_COUNT,
            obstacles_per_row_min: OBSTACLES_PER_ROW_MIN,
            obstacles_per_row_max: OBSTACLES_PER_ROW_MAX,
            obstacle_speed_min: OBSTACLE_SPEED_MIN,
            obstacle_speed_max: OBSTACLE_SPEED_MAX,
            obstacle_radius: OBSTACLE_RADIUS,
            player_radius: PLAYER_RADIUS,
            player_base_speed: PLAYER_SPEED,
        }
    }
}

/// Lateral intent set by input, consumed by the next tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateralIntent {
    pub left: bool,
    pub right: bool,
}

/// The player token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub base_speed: f32,
    /// Forward speed applied on the last tick (`min_speed..=base_speed`)
    pub current_speed: f32,
    /// Forward speed while braking
    pub min_speed: f32,
    pub lateral_speed: f32,
    pub braking: bool,
    pub moving: LateralIntent,
    /// Pending drag displacement (pixels), applied and cleared on the next tick
    #[serde(default)]
    pub nudge: f32,
}

impl Player {
    /// A fresh player at the start row, centred horizontally
    pub fn spawn(width: f32, height: f32, radius: f32, speeds: PlayerSpeeds) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            radius,
            base_speed: speeds.base,
            current_speed: speeds.base,
            min_speed: speeds.min,
            lateral_speed: speeds.lateral,
            braking: false,
            moving: LateralIntent::default(),
            nudge: 0.0,
        };
        player.respawn(width, height);
        player
    }

    /// Diameter; lateral clamping keeps the whole token inside `[0, width]`
    #[inline]
    pub fn size(&self) -> f32 {
        self.radius * 2.0
    }

    /// Move back to the start row (intent flags survive)
    pub fn respawn(&mut self, width: f32, height: f32) {
        self.pos = Vec2::new(width / 2.0, height - self.size());
        self.nudge = 0.0;
    }

    pub fn apply_speeds(&mut self, speeds: PlayerSpeeds) {
        self.base_speed = speeds.base;
        self.min_speed = speeds.min;
        self.lateral_speed = speeds.lateral;
        self.current_speed = if self.braking { speeds.min } else { speeds.base };
    }

    /// Drop every input intent (used on pause and respawn-free resets)
    pub fn clear_intents(&mut self) {
        self.braking = false;
        self.moving = LateralIntent::default();
        self.nudge = 0.0;
    }
}

/// Identity of an obstacle within one field generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleKey {
    pub row: u32,
    pub slot: u32,
}

/// A horizontally sweeping obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
    /// Signed horizontal velocity (pixels per tick)
    pub velocity: f32,
    /// Palette index (cosmetic)
    pub color: u8,
    pub row: u32,
    /// Index within the row
    pub slot: u32,
}

impl Obstacle {
    #[inline]
    pub fn key(&self) -> ObstacleKey {
        ObstacleKey {
            row: self.row,
            slot: self.slot,
        }
    }
}

/// Complete world state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub width: f32,
    pub height: f32,
    pub profile: DeviceProfile,
    /// Current level (1-based)
    pub level: u32,
    pub lives: u8,
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub player: Player,
    /// Obstacle field, ordered by row then slot
    pub obstacles: Vec<Obstacle>,
    /// Bearing tracking, keyed by obstacle identity
    #[serde(skip)]
    pub threats: ThreatTable,
}

impl WorldState {
    /// A level-1 world, inactive, with a fresh field
    pub fn new<R: Rng>(
        settings: &Settings,
        width: f32,
        height: f32,
        profile: DeviceProfile,
        rng: &mut R,
    ) -> Self {
        let difficulty = settings.difficulty;
        let speeds = derive_speeds(settings, &difficulty, profile);
        let mut world = Self {
            width,
            height,
            profile,
            level: 1,
            lives: settings.starting_lives,
            phase: GamePhase::Inactive,
            difficulty,
            player: Player::spawn(width, height, difficulty.player_radius, speeds),
            obstacles: Vec::new(),
            threats: ThreatTable::default(),
        };
        world.regenerate_field(settings, rng);
        world
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, GamePhase::Running | GamePhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Final level reached, once the run is over
    pub fn game_over(&self) -> Option<u32> {
        match self.phase {
            GamePhase::GameOver { final_level } => Some(final_level),
            _ => None,
        }
    }

    /// Speeds for the current difficulty on the current device
    pub fn player_speeds(&self, settings: &Settings) -> PlayerSpeeds {
        derive_speeds(settings, &self.difficulty, self.profile)
    }

    /// Put the player back at the start row with freshly derived speeds
    pub fn respawn_player(&mut self, settings: &Settings) {
        let speeds = self.player_speeds(settings);
        self.player.radius = self.difficulty.player_radius;
        self.player.apply_speeds(speeds);
        self.player.respawn(self.width, self.height);
    }

    /// Replace the whole obstacle field; identities restart so tracking does too
    pub fn regenerate_field<R: Rng>(&mut self, settings: &Settings, rng: &mut R) {
        self.obstacles = generate_field(
            &self.difficulty,
            settings,
            self.profile,
            self.width,
            self.height,
            rng,
        );
        self.threats.clear();
    }
}
