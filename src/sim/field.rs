//! Obstacle field generation
//!
//! The playfield is split into `row_count + 2` equal bands; the first and last
//! are safe zones (goal and start). Each row gets one random speed shared by
//! all of its obstacles, and alternates direction with its neighbours.

use glam::Vec2;
use rand::Rng;

use super::state::{Difficulty, Obstacle};
use crate::settings::{DeviceProfile, Settings};

/// Number of colours obstacles are drawn from
pub const PALETTE_LEN: u8 = 16;

/// Lay out a complete obstacle field for a difficulty
///
/// Obstacles are returned ordered by row, then slot.
pub fn generate_field<R: Rng>(
    difficulty: &Difficulty,
    settings: &Settings,
    profile: DeviceProfile,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<Obstacle> {
    let bands = difficulty.row_count + 2;
    let band_height = height / bands as f32;
    let offset = settings.row_offset(profile, band_height, height);

    log::info!(
        "Generating {} rows: band={:.1} offset={:.1} profile={}",
        difficulty.row_count,
        band_height,
        offset,
        profile.as_str()
    );

    let mut obstacles = Vec::new();
    for row in 0..difficulty.row_count {
        let y = band_height * (row + 1) as f32 - offset;
        let direction = if row % 2 == 0 { 1.0 } else { -1.0 };
        let speed = rng.random_range(difficulty.obstacle_speed_min..=difficulty.obstacle_speed_max);
        let count = rng
            .random_range(difficulty.obstacles_per_row_min..=difficulty.obstacles_per_row_max)
            .max(1);
        let spacing = width / count as f32;
        // Neighbours must start at least one diameter apart
        let jitter = (spacing - 2.0 * difficulty.obstacle_radius).clamp(0.0, spacing / 2.0);

        for slot in 0..count {
            let x = slot as f32 * spacing + rng.random::<f32>() * jitter;
            obstacles.push(Obstacle {
                pos: Vec2::new(x, y),
                radius: difficulty.obstacle_radius,
                velocity: speed * direction,
                color: rng.random_range(0..PALETTE_LEN),
                row,
                slot,
            });
        }
    }

    obstacles
}
