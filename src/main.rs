//! Neo Dodge entry point
//!
//! The browser build drives the game from `requestAnimationFrame` and draws
//! onto a 2D canvas. The native build runs a headless autopilot game and logs
//! how far it got.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, TouchEvent, Window,
    };

    use neo_dodge::renderer::{Canvas, Color, css_color};
    use neo_dodge::sim::TickOutcome;
    use neo_dodge::{FrameHandle, FrameHost, Game, Settings};

    /// `Canvas` over a `CanvasRenderingContext2d`
    struct Canvas2d {
        ctx: CanvasRenderingContext2d,
    }

    impl Canvas2d {
        fn circle_path(&self, center: Vec2, radius: f32) {
            self.ctx.begin_path();
            if let Err(e) = self.ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU) {
                log::warn!("arc failed: {:?}", e);
            }
        }
    }

    impl Canvas for Canvas2d {
        fn clear(&mut self, width: f32, height: f32) {
            self.ctx.set_fill_style_str("#000");
            self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.circle_path(center, radius);
            self.ctx.set_fill_style_str(&css_color(color));
            self.ctx.fill();
        }

        fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32) {
            self.circle_path(center, radius);
            self.ctx.set_stroke_style_str(&css_color(color));
            self.ctx.set_line_width(line_width as f64);
            self.ctx.stroke();
        }

        fn dashed_line(&mut self, from: Vec2, to: Vec2, dash: [f32; 2], color: Color, line_width: f32) {
            let pattern = js_sys::Array::of2(&JsValue::from_f64(dash[0] as f64), &JsValue::from_f64(dash[1] as f64));
            let _ = self.ctx.set_line_dash(&pattern);
            self.ctx.begin_path();
            self.ctx.move_to(from.x as f64, from.y as f64);
            self.ctx.line_to(to.x as f64, to.y as f64);
            self.ctx.set_stroke_style_str(&css_color(color));
            self.ctx.set_line_width(line_width as f64);
            self.ctx.stroke();
            let _ = self.ctx.set_line_dash(&js_sys::Array::new());
        }
    }

    /// `FrameHost` over `requestAnimationFrame`
    struct RafHost {
        window: Window,
        app: Weak<RefCell<App>>,
        next_id: u64,
        /// Frames handed to the browser and not yet delivered
        scheduled: Vec<(FrameHandle, i32)>,
    }

    impl RafHost {
        fn delivered(&mut self, handle: FrameHandle) {
            self.scheduled.retain(|(h, _)| *h != handle);
        }
    }

    impl FrameHost for RafHost {
        fn request_frame(&mut self) -> FrameHandle {
            self.next_id += 1;
            let handle = FrameHandle(self.next_id);
            let app = self.app.clone();
            let callback = Closure::once_into_js(move |_time: f64| {
                if let Some(app) = app.upgrade() {
                    run_frame(&app, handle);
                }
            });
            match self.window.request_animation_frame(callback.unchecked_ref()) {
                Ok(id) => self.scheduled.push((handle, id)),
                Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
            }
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(index) = self.scheduled.iter().position(|(h, _)| *h == handle) {
                let (_, id) = self.scheduled.swap_remove(index);
                let _ = self.window.cancel_animation_frame(id);
            }
        }
    }

    struct App {
        game: Game,
        host: RafHost,
        canvas: Canvas2d,
        element: HtmlCanvasElement,
        document: Document,
    }

    impl App {
        /// Redraw and refresh the HUD outside the frame loop
        fn refresh(&mut self) {
            self.game.render(&mut self.canvas);
            update_hud(&self.document, &self.game);
        }

        fn resize(&mut self) {
            let (width, height, viewport) = fit_canvas(&self.host.window, &self.element);
            let profile = self.game.settings().profile_for_viewport(viewport);
            self.game.on_resize(width, height, profile);
            self.refresh();
        }
    }

    fn run_frame(app: &Rc<RefCell<App>>, handle: FrameHandle) {
        let mut guard = app.borrow_mut();
        let app = &mut *guard;
        app.host.delivered(handle);
        let outcome = app.game.on_frame(handle, &mut app.host, &mut app.canvas);
        match outcome {
            TickOutcome::Idle | TickOutcome::Continue => {}
            _ => update_hud(&app.document, &app.game),
        }
    }

    /// Match the backing store to the displayed size; returns (width, height, viewport width)
    fn fit_canvas(window: &Window, element: &HtmlCanvasElement) -> (f32, f32, f32) {
        let width = element.client_width().max(1) as u32;
        let height = element.client_height().max(1) as u32;
        element.set_width(width);
        element.set_height(height);
        let viewport = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(width as f64);
        (width as f32, height as f32, viewport as f32)
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            let _ = el.style().set_property("display", if visible { "block" } else { "none" });
        }
    }

    fn update_hud(document: &Document, game: &Game) {
        set_text(document, "level", &game.level().to_string());
        set_text(document, "lives", &game.lives().to_string());
        set_visible(document, "controls-hint", game.show_controls_hint());
        set_visible(document, "pause-menu", game.world().is_paused());
        match game.game_over() {
            Some(level) => {
                set_text(document, "final-level", &level.to_string());
                set_visible(document, "game-over", true);
            }
            None => set_visible(document, "game-over", false),
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Neo Dodge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let element: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "not a canvas")?;
        let ctx: CanvasRenderingContext2d = element
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()
            .map_err(|_| "not a 2d context")?;

        let settings = Settings::default();
        let (width, height, viewport) = fit_canvas(&window, &element);
        let profile = settings.profile_for_viewport(viewport);
        let game = Game::new(settings, width, height, profile);

        let app = Rc::new_cyclic(|weak| {
            RefCell::new(App {
                game,
                host: RafHost {
                    window: window.clone(),
                    app: weak.clone(),
                    next_id: 0,
                    scheduled: Vec::new(),
                },
                canvas: Canvas2d { ctx },
                element: element.clone(),
                document: document.clone(),
            })
        });

        // Static screen until the player starts
        app.borrow_mut().refresh();

        setup_keyboard(&window, app.clone());
        setup_touch(&element, app.clone());
        setup_buttons(&document, app.clone());
        setup_auto_pause(&window, &document, app.clone());

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().resize();
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        log::info!("Neo Dodge ready");
        Ok(())
    }

    fn setup_keyboard(window: &Window, app: Rc<RefCell<App>>) {
        for (kind, pressed) in [("keydown", true), ("keyup", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if matches!(key.as_str(), "ArrowDown" | "ArrowLeft" | "ArrowRight" | " ") {
                    event.prevent_default();
                }
                let mut guard = app.borrow_mut();
                let app = &mut *guard;
                let was_paused = app.game.world().is_paused();
                app.game.key(&key, pressed, event.repeat(), &mut app.host);
                if app.game.world().is_paused() != was_paused {
                    app.refresh();
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch(element: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        fn touch_x(event: &TouchEvent, element: &HtmlCanvasElement) -> Option<f32> {
            let touch = event.changed_touches().get(0)?;
            let rect = element.get_bounding_client_rect();
            Some(touch.client_x() as f32 - rect.left() as f32)
        }

        {
            let app = app.clone();
            let target = element.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(x) = touch_x(&event, &target) {
                    let mut guard = app.borrow_mut();
                    let app = &mut *guard;
                    app.game.touch_start(x, &mut app.host);
                }
            });
            let _ = element.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let target = element.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(x) = touch_x(&event, &target) {
                    let mut guard = app.borrow_mut();
                    let app = &mut *guard;
                    app.game.touch_move(x, &mut app.host);
                }
            });
            let _ = element.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for kind in ["touchend", "touchcancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut guard = app.borrow_mut();
                let app = &mut *guard;
                app.game.touch_end(&mut app.host);
            });
            let _ = element.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        let actions: [(&str, fn(&mut App)); 3] = [
            ("start-btn", |app| {
                app.game.start(&mut app.host);
            }),
            ("pause-btn", |app| {
                app.game.toggle_pause(&mut app.host);
            }),
            ("reset-btn", |app| app.game.reset(&mut app.host)),
        ];

        for (id, action) in actions {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing button #{}", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut guard = app.borrow_mut();
                action(&mut *guard);
                guard.refresh();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &Window, document: &Document, app: Rc<RefCell<App>>) {
        // Tab switch or minimize
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut guard = app.borrow_mut();
                    let app = &mut *guard;
                    if app.game.pause(&mut app.host) {
                        log::info!("Auto-paused (tab hidden)");
                        app.refresh();
                    }
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut guard = app.borrow_mut();
                let app = &mut *guard;
                if app.game.pause(&mut app.host) {
                    log::info!("Auto-paused (window blur)");
                    app.refresh();
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use neo_dodge::game::FrameQueue;
    use neo_dodge::input::InputEvent;
    use neo_dodge::renderer::CommandCanvas;
    use neo_dodge::sim::{DangerLevel, TickOutcome};
    use neo_dodge::{DeviceProfile, FrameHost, Game, Settings};

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;
    /// Ten minutes at 60 fps
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    /// Brake and sidestep whenever a cue turns critical
    fn steer(game: &mut Game, host: &mut impl FrameHost) {
        let view = game.frame_view();
        let threat = view.cues.iter().find(|c| c.danger == DangerLevel::Critical);
        let (left, right) = match threat {
            Some(cue) if cue.to.x < cue.from.x => (false, true),
            Some(_) => (true, false),
            None => (false, false),
        };
        game.handle_input(InputEvent::Brake(threat.is_some()), host);
        game.handle_input(InputEvent::Left(left), host);
        game.handle_input(InputEvent::Right(right), host);
    }

    pub fn run(settings: Settings, seed: u64) {
        let mut game = Game::with_seed(settings, WIDTH, HEIGHT, DeviceProfile::Desktop, seed);
        let mut host = FrameQueue::new();
        let mut canvas = CommandCanvas::new();
        game.start(&mut host);

        while let Some(handle) = host.pop() {
            if game.ticks() >= MAX_FRAMES {
                log::info!("Frame limit reached");
                break;
            }
            steer(&mut game, &mut host);
            canvas.commands.clear();
            match game.on_frame(handle, &mut host, &mut canvas) {
                TickOutcome::LifeLost { lives } => {
                    log::info!("Life lost at level {} ({} left)", game.level(), lives)
                }
                TickOutcome::LevelUp { level } => log::info!("Reached level {}", level),
                TickOutcome::GameOver { final_level } => log::info!("Game over at level {}", final_level),
                TickOutcome::Idle | TickOutcome::Continue => {}
            }
        }

        println!(
            "seed {}: level {}, {} lives left after {} frames",
            seed,
            game.level(),
            game.lives(),
            game.ticks()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neo_dodge::Settings;

    env_logger::init();
    log::info!("Neo Dodge (native) starting headless autopilot...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_from_path(&path).unwrap_or_else(|e| {
            log::warn!("Failed to load settings from {}: {}; using defaults", path, e);
            Settings::default()
        }),
        None => Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    headless::run(settings, seed);
}
