//! Input translation
//!
//! Hosts turn raw key and touch events into `InputEvent`s. Applying an event
//! only sets intent on the player; positions change solely inside a tick.

use crate::settings::Settings;
use crate::sim::Player;

/// A discrete input intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Brake(bool),
    Left(bool),
    Right(bool),
    /// Extra lateral displacement from a long drag (pixels, signed)
    Nudge(f32),
    PauseToggle,
}

impl InputEvent {
    /// Map a keyboard key (DOM `KeyboardEvent.key` naming)
    ///
    /// Auto-repeated presses of the pause keys are dropped so holding one
    /// does not flip between paused and running.
    pub fn from_key(key: &str, pressed: bool, repeat: bool) -> Option<Self> {
        match key {
            "ArrowDown" | "s" | " " => Some(InputEvent::Brake(pressed)),
            "ArrowLeft" | "a" => Some(InputEvent::Left(pressed)),
            "ArrowRight" | "d" => Some(InputEvent::Right(pressed)),
            "p" | "P" | "Escape" if pressed && !repeat => Some(InputEvent::PauseToggle),
            _ => None,
        }
    }
}

/// Set the player's intent flags for an event
///
/// `PauseToggle` is a lifecycle command and is ignored here.
pub fn apply_input(player: &mut Player, event: InputEvent, settings: &Settings) {
    match event {
        InputEvent::Brake(on) => player.braking = on,
        InputEvent::Left(on) => player.moving.left = on,
        InputEvent::Right(on) => player.moving.right = on,
        InputEvent::Nudge(dx) => {
            let cap = settings.drag_boost_cap;
            player.nudge = (player.nudge + dx).clamp(-cap, cap);
        }
        InputEvent::PauseToggle => {}
    }
}

/// Tracks one horizontal touch drag
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    start_x: f32,
    active: bool,
}

impl DragTracker {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Touching the screen brakes
    pub fn touch_start(&mut self, x: f32) -> Vec<InputEvent> {
        self.start_x = x;
        self.active = true;
        vec![InputEvent::Brake(true)]
    }

    /// Steer toward the drag once it leaves the dead zone; long drags also nudge
    pub fn touch_move(&mut self, x: f32, settings: &Settings) -> Vec<InputEvent> {
        if !self.active {
            return Vec::new();
        }

        let swipe = x - self.start_x;
        if swipe > settings.drag_dead_zone {
            let mut events = vec![InputEvent::Right(true), InputEvent::Left(false)];
            if swipe > settings.drag_boost_threshold {
                let boost = (swipe / settings.drag_boost_divisor).min(settings.drag_boost_cap);
                events.push(InputEvent::Nudge(boost));
            }
            events
        } else if swipe < -settings.drag_dead_zone {
            let mut events = vec![InputEvent::Left(true), InputEvent::Right(false)];
            if swipe < -settings.drag_boost_threshold {
                let boost = (swipe / settings.drag_boost_divisor).max(-settings.drag_boost_cap);
                events.push(InputEvent::Nudge(boost));
            }
            events
        } else {
            vec![InputEvent::Left(false), InputEvent::Right(false)]
        }
    }

    /// Lifting the finger releases everything
    pub fn touch_end(&mut self) -> Vec<InputEvent> {
        self.active = false;
        vec![
            InputEvent::Left(false),
            InputEvent::Right(false),
            InputEvent::Brake(false),
        ]
    }
}
