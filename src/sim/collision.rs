//! Collision detection
//!
//! Player and obstacles are both circles; they collide when their centres
//! are closer than the sum of their radii.

use glam::Vec2;

use super::state::{Obstacle, Player};
use crate::distance;

/// Strict circle-circle overlap (touching is not a hit)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    distance(a, b) < a_radius + b_radius
}

/// First obstacle (in field order) overlapping the player
///
/// Stops at the first hit, so at most one life is lost per tick however many
/// obstacles overlap.
pub fn check_collisions<'a>(player: &Player, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .find(|o| circles_overlap(player.pos, player.radius, o.pos, o.radius))
}
