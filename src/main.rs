//! Future Drive entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent};

    use future_drive::audio::{AudioManager, SoundEffect};
    use future_drive::consts::*;
    use future_drive::highscores::format_date;
    use future_drive::renderer::{
        DrawCommand, Projector, RenderState, TextOverlay, render_scene,
    };
    use future_drive::sim::{GameEvent, GamePhase, GameState, InputState, tick};
    use future_drive::{GameConfig, HighScores, HudSnapshot, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        overlay: Option<TextOverlay>,
        projector: Projector,
        commands: Vec<DrawCommand>,
        accumulator: f32,
        last_time: f64,
        input: InputState,
        audio: AudioManager,
        settings: Settings,
        high_scores: HighScores,
        /// Rank of the last finished run on the leaderboard
        last_rank: Option<usize>,
    }

    impl Game {
        fn new(state: GameState, projector: Projector, settings: Settings) -> Self {
            let audio = AudioManager::new(&settings);
            let mut game = Self {
                state,
                render_state: None,
                overlay: None,
                projector,
                commands: Vec::new(),
                accumulator: 0.0,
                last_time: 0.0,
                input: InputState::default(),
                audio,
                settings,
                high_scores: HighScores::load(),
                last_rank: None,
            };
            game.apply_preferences();
            game
        }

        fn apply_preferences(&mut self) {
            self.state.free_ride = self.settings.free_ride;
            self.state.music = self.settings.music_enabled;
            self.audio.set_radio(self.state.music);
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_ACCUMULATED_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input;
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Toggles are one-shot: release them after they were seen
                self.input.pause = false;
                self.input.radio = false;
                self.input.free_ride = false;
            }

            for event in self.state.drain_events() {
                self.handle_event(&event);
            }
            self.audio.update_radio(dt);
        }

        fn handle_event(&mut self, event: &GameEvent) {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
            match event {
                GameEvent::RadioToggled(on) => {
                    self.audio.set_radio(*on);
                    self.settings.music_enabled = *on;
                    self.settings.save();
                }
                GameEvent::FreeRideToggled(on) => {
                    self.settings.free_ride = *on;
                    self.settings.save();
                }
                GameEvent::RunFinished(run) => {
                    self.last_rank = self.high_scores.submit(run, js_sys::Date::now());
                    self.high_scores.save();
                    if let Some(rank) = self.last_rank {
                        log::info!("New high score, rank {}", rank);
                    }
                }
                _ => {}
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            self.commands.clear();
            render_scene(&self.state, &self.projector, &mut self.commands);
            match render_state.render_commands(&self.commands) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => render_state.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
            if let Some(overlay) = &self.overlay {
                overlay.draw(&self.commands);
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.projector.resize(width, height);
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height);
            }
            if let Some(overlay) = &self.overlay {
                overlay.resize(width, height);
            }
        }

        /// Push slider changes to the audio and persist them
        fn volume_changed(&mut self) {
            self.audio.apply_settings(&self.settings);
            self.settings.save();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, now: f64) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.state.hud();

            set_text(&document, "hud-speed", &hud.speed_text());
            set_text(&document, "hud-distance", &hud.distance_text());
            set_text(&document, "hud-stage", &hud.stage_text());
            set_text(&document, "hud-lives", &hud.lives_text());
            set_text(&document, "hud-time", &hud.time_text());
            set_text(&document, "hud-score", &hud.score_text());
            set_text(&document, "hud-radio", hud.music_text());

            if let Some(el) = document.get_element_by_id("hud-speed") {
                let scale = HudSnapshot::speed_scale((now / 1000.0) as f32);
                let _ = el.set_attribute("style", &format!("transform: scale({:.3})", scale));
            }

            match hud.countdown_text() {
                Some(text) => {
                    set_text(&document, "countdown", &text);
                    set_visible(&document, "countdown", true);
                    if let Some(el) = document.get_element_by_id("countdown") {
                        let style = format!("transform: scale({:.3})", hud.countdown_scale());
                        let _ = el.set_attribute("style", &style);
                    }
                }
                None => set_visible(&document, "countdown", false),
            }

            let phase = self.state.phase;
            set_visible(&document, "pause-menu", phase == GamePhase::Paused);
            set_visible(&document, "game-over", phase == GamePhase::GameOver);
            set_visible(&document, "victory", phase == GamePhase::Victory);

            if self.state.is_over() {
                self.show_results(&document, &hud);
            }
        }

        fn show_results(&self, document: &Document, hud: &HudSnapshot) {
            set_text(document, "final-distance", &hud.distance_text());
            set_text(document, "final-time", &hud.time_text());
            let rank = self
                .last_rank
                .map_or(String::new(), |rank| format!("New high score! #{}", rank));
            set_text(document, "final-rank", &rank);

            let list = self
                .high_scores
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "{}. {}m - {} - {}",
                        i + 1,
                        e.distance,
                        e.stage.name(),
                        format_date(e.timestamp)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            set_text(document, "highscore-list", &list);
        }

        /// Start over with a fresh run
        fn restart(&mut self) {
            self.state.reset_run();
            self.apply_preferences();
            self.accumulator = 0.0;
            self.input = InputState::default();
            self.last_rank = None;
            log::info!("Run restarted");
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Future Drive starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::warn!("No document - nothing to render into");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::warn!("No #canvas element found");
            return;
        };

        let (width, height) = canvas_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let overlay = document
            .get_element_by_id("text-layer")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .and_then(TextOverlay::new);
        match &overlay {
            Some(overlay) => overlay.resize(width, height),
            None => log::warn!("No #text-layer canvas - text will not be drawn"),
        }

        let config = GameConfig::default();
        let seed = js_sys::Date::now() as u64;
        let state = match GameState::new(seed, config.clone()) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Invalid game config: {}", e);
                return;
            }
        };
        let projector = match Projector::new(width, height, &config.camera) {
            Ok(projector) => projector,
            Err(e) => {
                log::error!("Invalid camera config: {}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(state, projector, Settings::load())));
        game.borrow_mut().overlay = overlay;

        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        }

        setup_input_handlers(&window, game.clone());
        setup_buttons(&document, game.clone());
        setup_volume_controls(&document, game.clone());
        setup_auto_pause(&window, &document, game.clone());
        setup_resize(&window, canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Future Drive running!");
    }

    /// Level flags for held keys, latched flags for toggles
    fn apply_key(input: &mut InputState, key: &str, down: bool) -> bool {
        match key {
            "ArrowLeft" | "a" | "A" => input.left = down,
            "ArrowRight" | "d" | "D" => input.right = down,
            "ArrowUp" | "w" | "W" => input.accelerate = down,
            "ArrowDown" | "s" | "S" | " " => input.brake = down,
            "Escape" | "p" | "P" => input.pause |= down,
            "r" | "R" => input.radio |= down,
            "f" | "F" => input.free_ride |= down,
            _ => return false,
        }
        true
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                if event.key() == "Enter" && g.state.is_over() {
                    g.restart();
                    return;
                }
                if apply_key(&mut g.input, &event.key(), true) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                // Releasing a toggle key never un-latches it
                let key = event.key();
                match key.as_str() {
                    "Escape" | "p" | "P" | "r" | "R" | "f" | "F" => {}
                    _ => {
                        apply_key(&mut g.input, &key, false);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud(time);
        }

        request_animation_frame(game);
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["restart-btn", "victory-restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    game.borrow_mut().restart();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.pause = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn music_volume(settings: &mut Settings) -> &mut f32 {
        &mut settings.music_volume
    }

    fn sfx_volume(settings: &mut Settings) -> &mut f32 {
        &mut settings.sfx_volume
    }

    /// Music and sfx sliders, 0 - 100
    fn setup_volume_controls(document: &Document, game: Rc<RefCell<Game>>) {
        let sliders: [(&str, fn(&mut Settings) -> &mut f32); 2] =
            [("music-volume", music_volume), ("sfx-volume", sfx_volume)];
        for (id, volume) in sliders {
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            {
                let mut g = game.borrow_mut();
                input.set_value(&Settings::volume_percent(*volume(&mut g.settings)).to_string());
            }

            let game = game.clone();
            let slider = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if Settings::set_volume_percent(volume(&mut g.settings), &slider.value()) {
                    g.volume_changed();
                }
            });
            let _ =
                input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &web_sys::Window, canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_size(&window, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless autopilot run: holds the throttle, steers away from traffic
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use future_drive::consts::SIM_DT;
    use future_drive::renderer::{DrawCommand, Projector, render_scene, tessellate};
    use future_drive::sim::{GameEvent, GameState, InputState, tick};
    use future_drive::{ConfigError, GameConfig, HighScores};

    /// Simulated seconds before the demo gives up
    const TIME_LIMIT: f32 = 600.0;
    /// How far ahead the autopilot looks for traffic
    const LOOKAHEAD: f32 = 1500.0;

    /// Steer toward the emptiest lane ahead
    fn drive(state: &GameState) -> InputState {
        let player = &state.player;
        let lanes = [-300.0f32, 0.0, 300.0];
        let blocked = |lane: f32| {
            state.ai_cars.iter().any(|car| {
                let ahead = car.z - player.z;
                ahead > 0.0 && ahead < LOOKAHEAD && (car.x - lane).abs() < car.width
            })
        };
        let target = lanes
            .into_iter()
            .filter(|lane| !blocked(*lane))
            .min_by(|a, b| (a - player.x).abs().total_cmp(&(b - player.x).abs()))
            .unwrap_or(0.0);

        let error = target - player.x;
        InputState {
            left: error < -40.0,
            right: error > 40.0,
            accelerate: true,
            ..Default::default()
        }
    }

    pub fn run(seed: u64) -> Result<(), ConfigError> {
        let config = GameConfig::default();
        let mut state = GameState::new(seed, config.clone())?;
        let projector = Projector::new(1280, 720, &config.camera)?;
        let mut high_scores = HighScores::new();

        log::info!("Autopilot run with seed {}", seed);

        while !state.is_over() && state.time < TIME_LIMIT {
            let input = drive(&state);
            tick(&mut state, &input, SIM_DT);

            for event in state.drain_events() {
                match event {
                    GameEvent::StageChanged(stage) => {
                        log::info!(
                            "Stage {} ({}) at {:.0}m",
                            stage.number(),
                            stage.name(),
                            state.distance
                        );
                    }
                    GameEvent::Collision { lives } => {
                        log::info!("Crash at {:.0}m, {} lives left", state.distance, lives);
                    }
                    GameEvent::RunFinished(run) => {
                        high_scores.submit(&run, 0.0);
                    }
                    _ => {}
                }
            }
        }

        let mut commands: Vec<DrawCommand> = Vec::new();
        render_scene(&state, &projector, &mut commands);
        log::debug!(
            "Final frame: {} draw commands, {} vertices",
            commands.len(),
            tessellate(&commands).len()
        );

        let hud = state.hud();
        log::info!(
            "Finished {} in {} - {} - {}",
            hud.distance_text(),
            hud.time_text(),
            hud.stage_text(),
            hud.score_text()
        );
        if let Some(best) = high_scores.best_distance() {
            log::info!("Best distance: {}m", best);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Future Drive (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2025);

    if let Err(e) = autopilot::run(seed) {
        log::error!("Autopilot failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
