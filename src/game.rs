//! Frame scheduling and lifecycle
//!
//! `Game` is the sole owner of the world. Hosts drive it through the
//! lifecycle calls and hand each frame callback back via `on_frame`. At most
//! one frame is ever pending; every exit from `Running` cancels it so a
//! callback that was already queued can never tick stale state.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::input::{DragTracker, InputEvent, apply_input};
use crate::renderer::{Canvas, FrameView, draw_frame};
use crate::settings::{DeviceProfile, Settings};
use crate::sim::progression;
use crate::sim::{GamePhase, TickOutcome, WorldState, tick};

/// Player rows in the bottom part of the old playfield snap to the start row on resize
const RESIZE_SNAP_FRACTION: f32 = 0.7;

/// Id of a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's frame timing mechanism (e.g. `requestAnimationFrame`)
pub trait FrameHost {
    /// Schedule one call to `Game::on_frame` with the returned handle
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a scheduled call; it must not be delivered afterwards
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A FIFO of frame requests, for headless hosts and tests
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    queued: VecDeque<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next frame due, if any
    pub fn pop(&mut self) -> Option<FrameHandle> {
        self.queued.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

impl FrameHost for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.queued.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.queued.retain(|h| *h != handle);
    }
}

/// Game instance holding all state
pub struct Game {
    settings: Settings,
    world: WorldState,
    rng: Pcg32,
    /// The only frame allowed to tick
    pending: Option<FrameHandle>,
    drag: DragTracker,
    ticks: u64,
}

impl Game {
    /// Lay out a level-1 world (inactive) with a non-reproducible seed
    pub fn new(settings: Settings, width: f32, height: f32, profile: DeviceProfile) -> Self {
        Self::with_seed(settings, width, height, profile, rand::random())
    }

    pub fn with_seed(settings: Settings, width: f32, height: f32, profile: DeviceProfile, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = WorldState::new(&settings, width, height, profile, &mut rng);
        log::info!("Game initialized ({}x{}, {})", width, height, profile.as_str());
        settings.log_params(profile);
        Self {
            settings,
            world,
            rng,
            pending: None,
            drag: DragTracker::default(),
            ticks: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn level(&self) -> u32 {
        self.world.level
    }

    pub fn lives(&self) -> u8 {
        self.world.lives
    }

    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    /// Final level reached, once lives are exhausted
    pub fn game_over(&self) -> Option<u32> {
        self.world.game_over()
    }

    /// Control hints are only shown on the first level
    pub fn show_controls_hint(&self) -> bool {
        self.world.level <= 1
    }

    /// Ticks simulated since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Inactive -> Running, scheduling the first frame
    pub fn start(&mut self, host: &mut impl FrameHost) -> bool {
        if !progression::start(&mut self.world) {
            return false;
        }
        log::info!("Game started");
        self.schedule(host);
        true
    }

    pub fn pause(&mut self, host: &mut impl FrameHost) -> bool {
        if !progression::pause(&mut self.world) {
            return false;
        }
        self.cancel_pending(host);
        log::info!("Game paused");
        true
    }

    pub fn resume(&mut self, host: &mut impl FrameHost) -> bool {
        if !progression::resume(&mut self.world) {
            return false;
        }
        log::info!("Game resumed");
        self.schedule(host);
        true
    }

    pub fn toggle_pause(&mut self, host: &mut impl FrameHost) -> bool {
        match self.world.phase {
            GamePhase::Running => self.pause(host),
            GamePhase::Paused => self.resume(host),
            _ => false,
        }
    }

    /// Back to a fresh, inactive level-1 world with the configured difficulty
    pub fn reset(&mut self, host: &mut impl FrameHost) {
        self.cancel_pending(host);
        self.drag = DragTracker::default();
        self.world = WorldState::new(
            &self.settings,
            self.world.width,
            self.world.height,
            self.world.profile,
            &mut self.rng,
        );
        log::info!("Game reset");
        self.settings.log_params(self.world.profile);
    }

    /// Adapt to a new playfield size
    ///
    /// The player keeps its relative position (or snaps to the start row if it
    /// was near the bottom) and gets speeds for the new device profile. The
    /// obstacle field is regenerated at the new size.
    pub fn on_resize(&mut self, width: f32, height: f32, profile: DeviceProfile) {
        let (old_width, old_height) = (self.world.width, self.world.height);
        self.world.width = width;
        self.world.height = height;
        self.world.profile = profile;

        let speeds = self.world.player_speeds(&self.settings);
        let player = &mut self.world.player;
        player.apply_speeds(speeds);

        if old_width > 0.0 {
            player.pos.x = player.pos.x / old_width * width;
        }
        if player.pos.y > old_height * RESIZE_SNAP_FRACTION {
            player.pos.y = height - player.size();
        } else if old_height > 0.0 {
            player.pos.y = player.pos.y / old_height * height;
        }
        player.pos.x = player.pos.x.clamp(0.0, (width - player.size()).max(0.0));
        player.pos.y = player.pos.y.clamp(0.0, height);

        self.world.regenerate_field(&self.settings, &mut self.rng);
        log::info!("Resized to {}x{} ({})", width, height, profile.as_str());
    }

    /// Feed one input event; movement intents are ignored unless running
    pub fn handle_input(&mut self, event: InputEvent, host: &mut impl FrameHost) {
        match event {
            InputEvent::PauseToggle => {
                self.toggle_pause(host);
            }
            _ if self.world.is_running() => apply_input(&mut self.world.player, event, &self.settings),
            _ => {}
        }
    }

    pub fn key(&mut self, key: &str, pressed: bool, repeat: bool, host: &mut impl FrameHost) {
        if let Some(event) = InputEvent::from_key(key, pressed, repeat) {
            self.handle_input(event, host);
        }
    }

    pub fn touch_start(&mut self, x: f32, host: &mut impl FrameHost) {
        if !self.world.is_running() {
            return;
        }
        for event in self.drag.touch_start(x) {
            self.handle_input(event, host);
        }
    }

    pub fn touch_move(&mut self, x: f32, host: &mut impl FrameHost) {
        if !self.world.is_running() {
            return;
        }
        for event in self.drag.touch_move(x, &self.settings) {
            self.handle_input(event, host);
        }
    }

    pub fn touch_end(&mut self, host: &mut impl FrameHost) {
        for event in self.drag.touch_end() {
            self.handle_input(event, host);
        }
    }

    /// Frame callback: one tick and one render, then schedule the next frame
    ///
    /// Any handle other than the pending one is stale and ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, host: &mut impl FrameHost, canvas: &mut impl Canvas) -> TickOutcome {
        if self.pending != Some(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return TickOutcome::Idle;
        }
        self.pending = None;

        if !self.world.is_running() {
            return TickOutcome::Idle;
        }

        let outcome = tick(&mut self.world, &self.settings, &mut self.rng);
        self.ticks += 1;
        self.render(canvas);

        if self.world.is_running() {
            self.schedule(host);
        }
        outcome
    }

    /// Draw the current state (also used for the static pre-start screen)
    pub fn render(&self, canvas: &mut impl Canvas) {
        draw_frame(canvas, &self.frame_view());
    }

    pub fn frame_view(&self) -> FrameView {
        FrameView::capture(&self.world, &self.settings)
    }

    fn schedule(&mut self, host: &mut impl FrameHost) {
        self.cancel_pending(host);
        self.pending = Some(host.request_frame());
    }

    fn cancel_pending(&mut self, host: &mut impl FrameHost) {
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
    }
}
