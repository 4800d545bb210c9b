//! Neo Dodge - a single-screen arcade avoidance game
//!
//! Core modules:
//! - `sim`: Per-tick simulation (obstacle field, kinematics, threat cues, collisions, progression)
//! - `game`: Frame scheduling and the lifecycle surface exposed to hosts
//! - `renderer`: Render collaborator seam (draw primitives + cue line styling)
//! - `input`: Translation of raw key/touch input into intent flags
//! - `settings`: Data-driven tuning and device profiles

pub mod error;
pub mod game;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use game::{FrameHandle, FrameHost, Game};
pub use settings::{DeviceProfile, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Lives at the start of a run
    pub const STARTING_LIVES: u8 = 3;

    /// Obstacle rows at level 1
    pub const ROW_COUNT: u32 = 5;
    /// Obstacles per row at level 1 (inclusive range)
    pub const OBSTACLES_PER_ROW_MIN: u32 = 2;
    pub const OBSTACLES_PER_ROW_MAX: u32 = 4;
    /// Horizontal obstacle speed range (pixels per tick)
    pub const OBSTACLE_SPEED_MIN: f32 = 1.0;
    pub const OBSTACLE_SPEED_MAX: f32 = 3.0;
    pub const OBSTACLE_RADIUS: f32 = 15.0;

    pub const PLAYER_RADIUS: f32 = 10.0;
    /// Forward speed in pixels per tick (before device scaling)
    pub const PLAYER_SPEED: f32 = 1.0;
    /// Forward speed while braking, as a fraction of base speed
    pub const BRAKE_FACTOR: f32 = 0.3;

    /// Viewports narrower than this are treated as mobile
    pub const MOBILE_BREAKPOINT: f32 = 768.0;
    pub const MOBILE_SPEED_MULTIPLIER: f32 = 1.5;
    /// Lateral speed on mobile, as a fraction of base speed
    pub const MOBILE_LATERAL_FACTOR: f32 = 0.6;

    /// Smoothed bearing change below this is a likely collision course
    pub const CRITICAL_RATE: f32 = 0.0002;
    pub const CAUTION_RATE: f32 = 0.0004;
    /// Weight of the previous rate in exponential smoothing
    pub const RATE_SMOOTHING: f32 = 0.8;
    /// Danger colouring is a beginner aid, withdrawn after this level
    pub const CUE_MAX_LEVEL: u32 = 5;

    pub const DASH_PATTERN: [f32; 2] = [5.0, 5.0];
}

/// Normalize an angle difference to (-π, π]
///
/// Bearings jump by 2π when crossing the ±π seam; folding the delta keeps the
/// change rate continuous.
#[inline]
pub fn normalize_angle_delta(mut delta: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while delta > PI {
        delta -= TAU;
    }
    while delta <= -PI {
        delta += TAU;
    }
    delta
}

/// Bearing from `from` to `to` in radians (screen space, y down)
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}
