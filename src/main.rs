//! Ball Game entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use ball_game::consts::SIM_DT;
    use ball_game::renderer::{RenderState, scene_vertices};
    use ball_game::runner::GameRunner;
    use ball_game::sim::{GameEvent, LevelTable, TickInput, Touch};
    use ball_game::Settings;
    use glam::Vec2;

    /// Game instance holding all state
    struct Game {
        runner: GameRunner,
        render_state: Option<RenderState>,
        last_time: f64,
        /// Touches gathered since the last frame
        input: TickInput,
        /// Canvas height in CSS pixels, for flipping y
        canvas_height: f32,
        /// Level the renderer is currently framed on
        framed_level: u32,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(runner: GameRunner) -> Self {
            Self {
                runner,
                render_state: None,
                last_time: 0.0,
                input: TickInput::default(),
                canvas_height: 0.0,
                framed_level: 0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Convert canvas pixel coordinates to y-up screen coordinates
        fn screen_pos(&self, x: f32, y: f32) -> Vec2 {
            Vec2::new(x, self.canvas_height - y)
        }

        fn push_touch(&mut self, touch: Touch) {
            self.input.touches.push(touch);
        }

        /// Run simulation for one animation frame
        fn update(&mut self, dt: f32, time: f64) {
            let input = std::mem::take(&mut self.input);
            for event in self.runner.frame(&input, dt) {
                match event {
                    GameEvent::PhaseChanged(phase) => log::info!("Phase: {:?}", phase),
                    GameEvent::SceneRequested(request) => {
                        log::info!("Loading {}", request.scene_name())
                    }
                    _ => {}
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let state = self.runner.state();
            if let Some(ref mut render_state) = self.render_state {
                if self.framed_level != state.level {
                    render_state.fit_to_walls(&state.walls);
                    self.framed_level = state.level;
                }
                match render_state.render(&scene_vertices(state)) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let session = &self.runner.state().session;

            if let Some(el) = document.get_element_by_id("shots-label") {
                el.set_text_content(Some(&session.shots_label()));
            }

            if let Some(el) = document.get_element_by_id("prompt-label") {
                match session.prompt_label() {
                    Some(text) => {
                        el.set_text_content(Some(text));
                        let _ = el.set_attribute("class", "");
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("level-label") {
                el.set_text_content(Some(&format!("Level {}", self.runner.state().level)));
            }

            if let Some(el) = document.get_element_by_id("fps") {
                if self.runner.settings().show_fps {
                    el.set_text_content(Some(&self.fps.to_string()));
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Ball Game starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let runner = GameRunner::new(LevelTable::builtin(), settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let game = Rc::new(RefCell::new(Game::new(runner)));
        game.borrow_mut().canvas_height = client_h as f32;

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Ball Game running!");
        Ok(())
    }

    /// Canvas-relative position of the first changed touch
    fn touch_pos(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
        let touch = event.changed_touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some((
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse input is treated as a single simulated touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.screen_pos(event.offset_x() as f32, event.offset_y() as f32);
                g.push_touch(Touch::began(pos));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                // Only while the primary button is held
                if event.buttons() & 1 == 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                let pos = g.screen_pos(event.offset_x() as f32, event.offset_y() as f32);
                g.push_touch(Touch::moved(pos));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.screen_pos(event.offset_x() as f32, event.offset_y() as f32);
                g.push_touch(Touch::ended(pos));
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch events
        let touch_handlers: [(&str, fn(Vec2) -> Touch); 3] = [
            ("touchstart", Touch::began),
            ("touchmove", Touch::moved),
            ("touchend", Touch::ended),
        ];
        for (name, make_touch) in touch_handlers {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_pos(&canvas_clone, &event) {
                    let mut g = game.borrow_mut();
                    let pos = g.screen_pos(x, y);
                    g.push_touch(make_touch(pos));
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use ball_game::Settings;
    use ball_game::pacing::{Clock, FramePacer, SystemClock};
    use ball_game::runner::GameRunner;
    use ball_game::sim::{GameEvent, GameState, LevelTable, TickInput, Touch, Wall};
    use glam::Vec2;

    /// Length of the headless demo
    const DEMO_SECONDS: f32 = 12.0;
    /// Frames to wait between demo shots
    const SHOT_INTERVAL_FRAMES: u32 = 90;

    /// Drag that aims the ball at the level's objective, lobbed upward
    fn demo_drag(state: &GameState) -> TickInput {
        let target = state
            .walls
            .iter()
            .find(|w| w.is_objective())
            .map(Wall::center)
            .unwrap_or(state.ball.pos + Vec2::Y);
        let aim = ((target - state.ball.pos).normalize_or_zero() + Vec2::Y).normalize_or_zero();

        let start = Vec2::new(500.0, 500.0);
        let end = start + aim * 1200.0;
        TickInput {
            touches: vec![Touch::began(start), Touch::moved(end), Touch::ended(end)],
        }
    }

    /// Play the built-in levels with a scripted player, paced to the target frame rate
    pub fn run(settings_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
        let settings = match settings_path {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::default(),
        };
        let mut runner = GameRunner::new(LevelTable::builtin(), settings)?;

        let mut clock = SystemClock::default();
        let mut pacer = FramePacer::new(runner.settings().target_frame_rate, clock.now_secs());
        let frame_dt = pacer.frame_period() as f32;
        let total_frames = (DEMO_SECONDS / frame_dt) as u32;

        let mut last_frame = clock.now_secs();
        let mut idle_frames = 0;
        for _ in 0..total_frames {
            let now = pacer.wait(&mut clock);
            let dt = (now - last_frame) as f32;
            last_frame = now;

            let state = runner.state();
            let input = if state.session.prompt_label().is_some() {
                TickInput {
                    touches: vec![Touch::began(Vec2::ZERO)],
                }
            } else if state.session.accepts_shots() && idle_frames >= SHOT_INTERVAL_FRAMES {
                idle_frames = 0;
                demo_drag(state)
            } else {
                idle_frames += 1;
                TickInput::default()
            };

            for event in runner.frame(&input, dt) {
                match event {
                    GameEvent::ShotFired { launch, contact } => log::info!(
                        "Shot: power {:.2} toward ({:.2}, {:.2}) from {:?}",
                        launch.power,
                        launch.direction.x,
                        launch.direction.y,
                        contact
                    ),
                    GameEvent::WallHit { wall_id, kind } => {
                        log::debug!("Hit wall {} ({:?})", wall_id, kind)
                    }
                    GameEvent::PhaseChanged(phase) => {
                        log::info!("{:?} | shots: {}", phase, runner.state().session.shots_label())
                    }
                    GameEvent::SceneRequested(request) => {
                        idle_frames = 0;
                        log::info!("Loading {}", request.scene_name())
                    }
                }
            }
        }

        log::info!("Demo finished on level {}", runner.state().level);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ball Game (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let settings_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    if let Err(e) = native::run(settings_path.as_deref()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
