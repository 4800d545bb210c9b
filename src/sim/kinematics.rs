//! Per-tick motion
//!
//! One call advances everything by exactly one fixed step. Obstacles move
//! before the player.

use super::state::{Obstacle, Player, WorldState};

/// Advance obstacles, then the player, by one tick
pub fn advance(world: &mut WorldState) {
    advance_obstacles(&mut world.obstacles, world.width);
    advance_player(&mut world.player, world.width, world.height);
}

/// Sweep obstacles horizontally, wrapping at the edges
///
/// An obstacle fully past one edge re-enters just outside the opposite edge,
/// so `x` always stays within `[-radius, width + radius]`.
pub fn advance_obstacles(obstacles: &mut [Obstacle], width: f32) {
    for obstacle in obstacles {
        obstacle.pos.x += obstacle.velocity;

        if obstacle.velocity > 0.0 && obstacle.pos.x > width + obstacle.radius {
            obstacle.pos.x = -obstacle.radius;
        } else if obstacle.velocity < 0.0 && obstacle.pos.x < -obstacle.radius {
            obstacle.pos.x = width + obstacle.radius;
        }
    }
}

/// Move the player forward (toward y = 0) and sideways per its intents
///
/// Left is applied before right, each with its own clamp, so holding both
/// cancels out except against a wall. A pending drag nudge is applied last and
/// consumed.
pub fn advance_player(player: &mut Player, width: f32, height: f32) {
    player.current_speed = if player.braking {
        player.min_speed
    } else {
        player.base_speed
    };
    player.pos.y = (player.pos.y - player.current_speed).clamp(0.0, height);

    let max_x = (width - player.size()).max(0.0);
    if player.moving.left {
        player.pos.x = (player.pos.x - player.lateral_speed).max(0.0);
    }
    if player.moving.right {
        player.pos.x = (player.pos.x + player.lateral_speed).min(max_x);
    }
    if player.nudge != 0.0 {
        player.pos.x += player.nudge;
        player.nudge = 0.0;
    }
    player.pos.x = player.pos.x.clamp(0.0, max_x);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlayerSpeeds;
    use glam::Vec2;
    use proptest::prelude::*;

    fn obstacle(x: f32, velocity: f32) -> Obstacle {
        Obstacle {
            pos: Vec2::new(x, 100.0),
            radius: 15.0,
            velocity,
            color: 0,
            row: 0,
            slot: 0,
        }
    }

    fn player() -> Player {
        Player::spawn(
            400.0,
            600.0,
            10.0,
            PlayerSpeeds {
                base: 2.0,
                min: 0.6,
                lateral: 3.0,
            },
        )
    }

    #[test]
    fn test_wrap_positive() {
        let mut obstacles = vec![obstacle(412.0, 2.0)];
        advance_obstacles(&mut obstacles, 400.0);
        assert_eq!(obstacles[0].pos.x, 414.0);
        advance_obstacles(&mut obstacles, 400.0);
        assert_eq!(obstacles[0].pos.x, -15.0);
    }

    #[test]
    fn test_wrap_negative() {
        let mut obstacles = vec![obstacle(-14.0, -2.0)];
        advance_obstacles(&mut obstacles, 400.0);
        assert_eq!(obstacles[0].pos.x, 415.0);
    }

    #[test]
    fn test_forward_and_brake() {
        let mut p = player();
        let start_y = p.pos.y;
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.y, start_y - 2.0);
        assert_eq!(p.current_speed, 2.0);

        p.braking = true;
        advance_player(&mut p, 400.0, 600.0);
        assert!((p.pos.y - (start_y - 2.6)).abs() < 1e-4);
        assert_eq!(p.current_speed, 0.6);
    }

    #[test]
    fn test_goal_clamp() {
        let mut p = player();
        p.pos.y = 1.0;
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.y, 0.0);
    }

    #[test]
    fn test_lateral_clamps() {
        let mut p = player();
        p.pos.x = 1.0;
        p.moving.left = true;
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.x, 0.0);

        p.moving.left = false;
        p.moving.right = true;
        p.pos.x = 379.0;
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.x, 400.0 - p.size());
    }

    #[test]
    fn test_opposing_intents_cancel() {
        let mut p = player();
        let x = p.pos.x;
        p.moving.left = true;
        p.moving.right = true;
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.x, x);
    }

    #[test]
    fn test_nudge_consumed() {
        let mut p = player();
        let x = p.pos.x;
        p.nudge = 2.0;
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.x, x + 2.0);
        assert_eq!(p.nudge, 0.0);
        advance_player(&mut p, 400.0, 600.0);
        assert_eq!(p.pos.x, x + 2.0);
    }

    proptest! {
        #[test]
        fn prop_obstacles_stay_within_wrap_band(
            start in 0.0f32..800.0,
            speed in 0.1f32..8.0,
            negative in any::<bool>(),
            ticks in 1usize..2000,
        ) {
            let velocity = if negative { -speed } else { speed };
            let mut obstacles = vec![obstacle(start, velocity)];
            for _ in 0..ticks {
                advance_obstacles(&mut obstacles, 800.0);
                let o = &obstacles[0];
                prop_assert!(o.pos.x >= -o.radius && o.pos.x <= 800.0 + o.radius);
                prop_assert_eq!(o.pos.y, 100.0);
            }
        }

        #[test]
        fn prop_player_stays_in_bounds(
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), -2.0f32..2.0), 1..600),
        ) {
            let mut p = player();
            for (brake, left, right, nudge) in inputs {
                p.braking = brake;
                p.moving.left = left;
                p.moving.right = right;
                p.nudge = nudge;
                advance_player(&mut p, 400.0, 600.0);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y <= 600.0);
                prop_assert!(p.pos.x >= 0.0 && p.pos.x <= 400.0 - p.size());
                prop_assert!(p.current_speed >= 0.0 && p.current_speed <= p.base_speed);
            }
        }
    }
}
