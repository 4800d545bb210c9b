//! Per-tick frame description and drawing
//!
//! `FrameView` is everything the render collaborator is handed once per
//! tick; `draw_frame` turns it into canvas calls.

use glam::Vec2;

use super::canvas::{Canvas, Color, colors};
use crate::settings::Settings;
use crate::sim::{DangerLevel, WorldState, danger_level, is_ahead, is_approaching};

/// Ring drawn around a braking player, relative to its radius
const BRAKE_RING_SCALE: f32 = 1.3;

/// Line styling for a danger level (the dash pattern never changes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueStyle {
    pub color: Color,
    pub line_width: f32,
}

impl CueStyle {
    pub fn for_danger(danger: DangerLevel) -> Self {
        match danger {
            DangerLevel::None => Self {
                color: colors::CUE_NEUTRAL,
                line_width: 1.0,
            },
            DangerLevel::Caution => Self {
                color: colors::CUE_CAUTION,
                line_width: 2.0,
            },
            DangerLevel::Critical => Self {
                color: colors::CUE_CRITICAL,
                line_width: 3.0,
            },
        }
    }
}

/// Player centre to obstacle centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueLine {
    pub from: Vec2,
    pub to: Vec2,
    pub danger: DangerLevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
    pub braking: bool,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<ObstacleView>,
    pub player: PlayerView,
    pub cues: Vec<CueLine>,
    pub dash: [f32; 2],
}

impl FrameView {
    pub fn capture(world: &WorldState, settings: &Settings) -> Self {
        Self {
            width: world.width,
            height: world.height,
            obstacles: world
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    pos: o.pos,
                    radius: o.radius,
                    color: colors::obstacle(o.color),
                })
                .collect(),
            player: PlayerView {
                pos: world.player.pos,
                radius: world.player.radius,
                color: colors::PLAYER,
                braking: world.player.braking,
            },
            cues: cue_lines(world, settings),
            dash: settings.dash_pattern,
        }
    }
}

/// Cue lines to every obstacle that is ahead of the player and sweeping toward it
///
/// Danger styling is only applied up to `cue_max_level`; later levels get
/// neutral lines.
pub fn cue_lines(world: &WorldState, settings: &Settings) -> Vec<CueLine> {
    let player = &world.player;
    let show_danger = world.level <= settings.cue_max_level;

    world
        .obstacles
        .iter()
        .filter(|o| is_ahead(o, player) && is_approaching(o, player))
        .map(|o| CueLine {
            from: player.pos,
            to: o.pos,
            danger: if show_danger {
                danger_level(o, &world.threats, &settings.threat)
            } else {
                DangerLevel::None
            },
        })
        .collect()
}

/// Draw a frame: obstacles, cue lines, then the player on top
pub fn draw_frame(canvas: &mut impl Canvas, frame: &FrameView) {
    canvas.clear(frame.width, frame.height);

    for obstacle in &frame.obstacles {
        canvas.fill_circle(obstacle.pos, obstacle.radius, obstacle.color);
    }

    for cue in &frame.cues {
        let style = CueStyle::for_danger(cue.danger);
        canvas.dashed_line(cue.from, cue.to, frame.dash, style.color, style.line_width);
    }

    let player = &frame.player;
    canvas.fill_circle(player.pos, player.radius, player.color);
    if player.braking {
        canvas.stroke_circle(player.pos, player.radius * BRAKE_RING_SCALE, colors::BRAKE_RING, 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::canvas::{CommandCanvas, DrawCommand};
    use crate::settings::DeviceProfile;
    use crate::sim::{Obstacle, ObstacleKey};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world_with(obstacles: Vec<Obstacle>) -> WorldState {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut world = WorldState::new(&Settings::default(), 800.0, 600.0, DeviceProfile::Desktop, &mut rng);
        world.obstacles = obstacles;
        world
    }

    fn obstacle(x: f32, y: f32, velocity: f32, slot: u32) -> Obstacle {
        Obstacle {
            pos: Vec2::new(x, y),
            radius: 15.0,
            velocity,
            color: slot as u8,
            row: 0,
            slot,
        }
    }

    /// Force a smoothed rate for an obstacle
    fn set_rate(world: &mut WorldState, key: ObstacleKey, delta: f32) {
        world.threats.observe(key, 0.0, 0.8);
        world.threats.observe(key, delta, 0.8);
    }

    #[test]
    fn test_cues_only_for_ahead_and_approaching() {
        // Player spawns at (400, 580)
        let world = world_with(vec![
            obstacle(100.0, 100.0, 2.0, 0),  // ahead, approaching from the left
            obstacle(700.0, 100.0, 2.0, 1),  // ahead, moving away
            obstacle(700.0, 100.0, -2.0, 2), // ahead, approaching from the right
            obstacle(100.0, 590.0, 2.0, 3),  // behind
        ]);
        let cues = cue_lines(&world, &Settings::default());
        let targets: Vec<_> = cues.iter().map(|c| c.to).collect();
        assert_eq!(targets, vec![Vec2::new(100.0, 100.0), Vec2::new(700.0, 100.0)]);
        assert!(cues.iter().all(|c| c.from == world.player.pos));
    }

    #[test]
    fn test_danger_styling_withdrawn_after_level_five() {
        let mut world = world_with(vec![obstacle(100.0, 100.0, 2.0, 0)]);
        let key = world.obstacles[0].key();
        set_rate(&mut world, key, 0.0001);
        let settings = Settings::default();

        world.level = 5;
        assert_eq!(cue_lines(&world, &settings)[0].danger, DangerLevel::Critical);

        world.level = 6;
        assert_eq!(cue_lines(&world, &settings)[0].danger, DangerLevel::None);
    }

    #[test]
    fn test_cue_styles() {
        assert_eq!(CueStyle::for_danger(DangerLevel::None).line_width, 1.0);
        assert_eq!(CueStyle::for_danger(DangerLevel::Caution).color, colors::CUE_CAUTION);
        assert_eq!(CueStyle::for_danger(DangerLevel::Critical).line_width, 3.0);
    }

    #[test]
    fn test_draw_order_and_brake_ring() {
        let mut world = world_with(vec![obstacle(100.0, 100.0, 2.0, 0), obstacle(600.0, 300.0, 2.0, 1)]);
        world.player.braking = true;
        let settings = Settings::default();

        let mut canvas = CommandCanvas::new();
        draw_frame(&mut canvas, &FrameView::capture(&world, &settings));
        let cmds = canvas.last_frame();

        assert!(matches!(cmds[0], DrawCommand::Clear { width, height } if width == 800.0 && height == 600.0));
        for cmd in &cmds[1..3] {
            assert!(matches!(cmd, DrawCommand::FillCircle { radius, .. } if *radius == 15.0));
        }
        match &cmds[3] {
            DrawCommand::DashedLine { dash, line_width, .. } => {
                assert_eq!(*dash, settings.dash_pattern);
                assert_eq!(*line_width, 1.0);
            }
            other => panic!("expected cue line, got {other:?}"),
        }
        assert!(matches!(cmds[4], DrawCommand::FillCircle { color, .. } if color == colors::PLAYER));
        match &cmds[5] {
            DrawCommand::StrokeCircle { radius, .. } => {
                assert!((radius - world.player.radius * BRAKE_RING_SCALE).abs() < 1e-5)
            }
            other => panic!("expected brake ring, got {other:?}"),
        }
        assert_eq!(cmds.len(), 6);
    }
}
