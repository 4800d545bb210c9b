//! Threat classification for danger cues
//!
//! Uses the constant-bearing rule: if the bearing from the player to an
//! obstacle barely changes while both move, they are on a collision course.
//! The per-obstacle bearing change rate is exponentially smoothed; a LOWER
//! rate means HIGHER danger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::{Obstacle, ObstacleKey, Player};
use crate::settings::ThreatThresholds;
use crate::{bearing, normalize_angle_delta};

/// Discrete danger classification driving cue line styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DangerLevel {
    #[default]
    None,
    Caution,
    Critical,
}

/// Bearing history for one obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BearingTrack {
    pub previous_angle: f32,
    /// Smoothed |Δbearing| per tick; `None` until a second observation
    pub rate: Option<f32>,
}

/// Bearing tracking keyed by obstacle identity
///
/// Identities are only stable within one field generation, so the table is
/// cleared wholesale whenever the field is regenerated.
#[derive(Debug, Clone, Default)]
pub struct ThreatTable {
    tracks: HashMap<ObstacleKey, BearingTrack>,
}

impl ThreatTable {
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Smoothed change rate, if the obstacle has been observed twice
    pub fn rate(&self, key: ObstacleKey) -> Option<f32> {
        self.tracks.get(&key).and_then(|t| t.rate)
    }

    /// Record a bearing observation for one obstacle
    ///
    /// An unknown key is a first observation: only the bearing is stored.
    pub fn observe(&mut self, key: ObstacleKey, angle: f32, smoothing: f32) {
        match self.tracks.get_mut(&key) {
            Some(track) => {
                let delta = normalize_angle_delta(angle - track.previous_angle).abs();
                track.rate = Some(match track.rate {
                    Some(rate) => smoothing * rate + (1.0 - smoothing) * delta,
                    None => delta,
                });
                track.previous_angle = angle;
            }
            None => {
                self.tracks.insert(
                    key,
                    BearingTrack {
                        previous_angle: angle,
                        rate: None,
                    },
                );
            }
        }
    }
}

/// Obstacles strictly ahead of the player (smaller y) are tracked and cued
#[inline]
pub fn is_ahead(obstacle: &Obstacle, player: &Player) -> bool {
    obstacle.pos.y < player.pos.y
}

/// Whether an obstacle is sweeping toward the player's column
pub fn is_approaching(obstacle: &Obstacle, player: &Player) -> bool {
    if obstacle.velocity > 0.0 {
        obstacle.pos.x < player.pos.x
    } else {
        obstacle.pos.x > player.pos.x
    }
}

/// Observe the bearing to every obstacle ahead of the player
pub fn update_threat_table(table: &mut ThreatTable, player: &Player, obstacles: &[Obstacle], smoothing: f32) {
    for obstacle in obstacles.iter().filter(|o| is_ahead(o, player)) {
        table.observe(obstacle.key(), bearing(player.pos, obstacle.pos), smoothing);
    }
}

/// Classify an obstacle from its smoothed bearing change rate
pub fn danger_level(obstacle: &Obstacle, table: &ThreatTable, thresholds: &ThreatThresholds) -> DangerLevel {
    match table.rate(obstacle.key()) {
        Some(rate) if rate < thresholds.critical => DangerLevel::Critical,
        Some(rate) if rate < thresholds.caution => DangerLevel::Caution,
        _ => DangerLevel::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlayerSpeeds;
    use crate::sim::kinematics::{advance_obstacles, advance_player};
    use glam::Vec2;
    use std::f32::consts::PI;

    fn obstacle(x: f32, y: f32, velocity: f32, slot: u32) -> Obstacle {
        Obstacle {
            pos: Vec2::new(x, y),
            radius: 15.0,
            velocity,
            color: 0,
            row: 0,
            slot,
        }
    }

    fn player_at(x: f32, y: f32) -> Player {
        let mut p = Player::spawn(
            800.0,
            600.0,
            10.0,
            PlayerSpeeds {
                base: 1.0,
                min: 0.3,
                lateral: 1.0,
            },
        );
        p.pos = Vec2::new(x, y);
        p
    }

    #[test]
    fn test_approach_classification() {
        let player = player_at(400.0, 500.0);
        assert!(is_approaching(&obstacle(390.0, 100.0, 2.0, 0), &player));
        assert!(!is_approaching(&obstacle(410.0, 100.0, 2.0, 0), &player));
        assert!(is_approaching(&obstacle(410.0, 100.0, -2.0, 0), &player));
        assert!(!is_approaching(&obstacle(390.0, 100.0, -2.0, 0), &player));
    }

    #[test]
    fn test_first_observation_has_no_rate() {
        let mut table = ThreatTable::default();
        let player = player_at(400.0, 500.0);
        let obstacles = [obstacle(100.0, 100.0, 2.0, 0), obstacle(100.0, 550.0, 2.0, 1)];
        update_threat_table(&mut table, &player, &obstacles, 0.8);

        // Only the obstacle ahead is tracked
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate(obstacles[0].key()), None);
        assert_eq!(
            danger_level(&obstacles[0], &table, &ThreatThresholds::default()),
            DangerLevel::None
        );
    }

    #[test]
    fn test_rate_smoothing() {
        let mut table = ThreatTable::default();
        let key = ObstacleKey { row: 2, slot: 3 };
        table.observe(key, 0.0, 0.8);
        table.observe(key, 0.1, 0.8);
        assert!((table.rate(key).unwrap() - 0.1).abs() < 1e-6);
        table.observe(key, 0.1, 0.8);
        assert!((table.rate(key).unwrap() - 0.08).abs() < 1e-6);
        table.observe(key, 0.3, 0.8);
        assert!((table.rate(key).unwrap() - (0.8 * 0.08 + 0.2 * 0.2)).abs() < 1e-6);
    }

    #[test]
    fn test_rate_across_seam() {
        let mut table = ThreatTable::default();
        let key = ObstacleKey { row: 0, slot: 0 };
        table.observe(key, PI - 0.01, 0.8);
        table.observe(key, -PI + 0.01, 0.8);
        assert!((table.rate(key).unwrap() - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_collision_course_is_critical() {
        // Player climbs 1px/tick, obstacle sweeps right 1px/tick from the
        // up-left diagonal: constant bearing, closing range.
        let mut player = player_at(400.0, 500.0);
        let mut obstacles = vec![obstacle(300.0, 400.0, 1.0, 0), obstacle(100.0, 100.0, -3.0, 1)];
        let mut table = ThreatTable::default();
        let thresholds = ThreatThresholds::default();

        for _ in 0..30 {
            update_threat_table(&mut table, &player, &obstacles, thresholds.smoothing);
            advance_obstacles(&mut obstacles, 800.0);
            advance_player(&mut player, 800.0, 600.0);
        }

        assert_eq!(danger_level(&obstacles[0], &table, &thresholds), DangerLevel::Critical);
        assert!(is_approaching(&obstacles[0], &player));
        assert_eq!(danger_level(&obstacles[1], &table, &thresholds), DangerLevel::None);
    }

    #[test]
    fn test_caution_band() {
        let mut table = ThreatTable::default();
        let o = obstacle(0.0, 0.0, 1.0, 0);
        table.observe(o.key(), 1.0, 0.8);
        table.observe(o.key(), 1.0003, 0.8);
        assert_eq!(danger_level(&o, &table, &ThreatThresholds::default()), DangerLevel::Caution);
    }

    #[test]
    fn test_clear() {
        let mut table = ThreatTable::default();
        table.observe(ObstacleKey { row: 0, slot: 0 }, 0.5, 0.8);
        table.clear();
        assert!(table.is_empty());
    }
}
