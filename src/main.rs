//! Neon Turbo entry point
//!
//! In the browser this wires DOM events into a [`GameSession`] and drives it
//! from `requestAnimationFrame`. Natively it runs a headless autopilot demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement};

    use glam::Vec2;
    use neon_turbo::GameSession;
    use neon_turbo::platform::{entropy_seed, storage::default_store};
    use neon_turbo::renderer::{RenderState, build_frame};
    use neon_turbo::sim::{GameStatus, HudSnapshot};

    /// Browser-side shell around the session
    struct Game {
        session: GameSession,
        render_state: Option<RenderState>,
        /// Pending animation frame request
        raf_handle: Option<i32>,
        /// Last status pushed to the DOM, so menus only toggle on change
        shown_status: Option<GameStatus>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                session: GameSession::new(seed, default_store()),
                render_state: None,
                raf_handle: None,
                shown_status: None,
            }
        }

        fn render(&mut self) {
            let jitter = Vec2::new(js_sys::Math::random() as f32, js_sys::Math::random() as f32);
            let style = self.session.frame_style(jitter);
            let vertices = build_frame(&self.session.render_snapshot(), &style);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
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
        fn update_hud(&mut self) {
            let Some(document) = document() else {
                return;
            };
            let hud = self.session.hud_snapshot();

            set_text(&document, "#hud-score .hud-value", &hud.display_score.to_string());
            set_text(&document, "#hud-lives .hud-value", &hud.game.lives.to_string());
            set_text(&document, "#hud-level .hud-value", &hud.game.level.to_string());
            set_text(&document, "#hud-time .hud-value", &hud.seconds_left.to_string());
            show(&document, "near-miss-toast", hud.near_miss_toast);
            show(&document, "police-warning", hud.game.police_warning);
            show(&document, "shield-indicator", hud.game.is_invincible);

            if self.shown_status != Some(hud.game.status) {
                self.shown_status = Some(hud.game.status);
                update_menus(&document, &hud);
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Menu overlays follow the status
    fn update_menus(document: &Document, hud: &HudSnapshot) {
        let status = hud.game.status;
        show(document, "start-menu", status == GameStatus::Start);
        show(document, "level-clear", status == GameStatus::LevelClear);
        show(document, "game-over", status == GameStatus::GameOver);
        show(document, "win", status == GameStatus::Win);
        show(document, "hud", !matches!(status, GameStatus::Start));

        let score = hud.display_score.to_string();
        match status {
            GameStatus::LevelClear => {
                set_text(document, "#level-clear .level", &hud.game.level.to_string());
                set_text(document, "#level-clear .score", &score);
            }
            GameStatus::GameOver => set_text(document, "#game-over .score", &score),
            GameStatus::Win => set_text(document, "#win .score", &score),
            _ => {}
        }

        if let Some(list) = document.get_element_by_id("high-scores") {
            list.set_inner_html("");
            for entry in &hud.game.high_scores.entries {
                if let Ok(row) = document.create_element("li") {
                    row.set_text_content(Some(&format!(
                        "{}  {}  L{}",
                        entry.name, entry.score, entry.level
                    )));
                    let _ = list.append_child(&row);
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Neon Turbo starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        show(&document, "loading", false);

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = entropy_seed();
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU; without it the game still runs with a DOM-only HUD
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to create device: {e}"),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {e}"),
                }
            }
            Err(e) => log::error!("Failed to create surface: {e}"),
        }

        setup_input_handlers(game.clone());
        setup_menu_buttons(game.clone());
        setup_settings_controls(game.clone());
        setup_focus_handlers(game.clone());

        game.borrow_mut().update_hud();
        request_animation_frame(game);

        log::info!("Neon Turbo running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().session.input.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().session.input.key_up(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // On-screen direction pads send the same key names as the keyboard
        for (id, key) in [
            ("touch-left", "ArrowLeft"),
            ("touch-right", "ArrowRight"),
            ("touch-up", "ArrowUp"),
            ("touch-down", "ArrowDown"),
        ] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for (kind, held) in [("pointerdown", true), ("pointerup", false), ("pointerleave", false)] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    if held {
                        g.session.input.key_down(key);
                    } else {
                        g.session.input.key_up(key);
                    }
                });
                let _ = btn.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        {
            let game = game.clone();
            on_click(&document, "start-btn", move || {
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a user gesture
                g.session.on_focus();
                g.session.new_run();
            });
        }
        {
            let game = game.clone();
            on_click(&document, "continue-btn", move || {
                game.borrow_mut().session.continue_run();
            });
        }
        for id in ["restart-btn", "win-restart-btn", "quit-btn"] {
            let game = game.clone();
            on_click(&document, id, move || {
                game.borrow_mut().session.restart();
            });
        }
    }

    fn setup_settings_controls(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        {
            let game = game.clone();
            on_click(&document, "mute-btn", move || {
                let mut g = game.borrow_mut();
                g.session.update_settings(|s| s.muted = !s.muted);
                log::info!("Muted: {}", g.session.settings().muted);
            });
        }
        {
            let game = game.clone();
            on_click(&document, "shake-btn", move || {
                game.borrow_mut()
                    .session
                    .update_settings(|s| s.screen_shake = !s.screen_shake);
            });
        }

        if let Some(input) = document
            .get_element_by_id("player-name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&game.borrow().session.settings().player_name);
            let field = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.session.update_settings(|s| s.set_player_name(&field.value()));
                field.set_value(&g.session.settings().player_name);
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Tab switch or minimize
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.session.on_blur();
                    log::info!("Input released (tab hidden)");
                } else {
                    g.session.on_focus();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Click outside
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.on_blur();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page going away: tear the loop down
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                stop(&game);
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn stop(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        if let (Some(handle), Some(window)) = (g.raf_handle.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(handle);
        }
        g.session.stop();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle_owner = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => handle_owner.borrow_mut().raf_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.raf_handle = None;
            g.session.frame(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_turbo::GameSession;
    use neon_turbo::platform::{entropy_seed, storage::default_store};
    use neon_turbo::sim::GameStatus;

    /// Upper bound on demo length (10 minutes of 60 Hz frames)
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    env_logger::init();
    log::info!("Neon Turbo (native) starting...");
    log::info!("Native mode runs a headless autopilot demo; use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(entropy_seed);
    log::info!("Seed: {seed}");

    let mut session = GameSession::new(seed, default_store());
    session.autopilot = true;
    session.new_run();

    let frame_ms = 1000.0 / 60.0;
    let mut status = session.sim.game.status;
    for frame in 0..MAX_FRAMES {
        session.frame(frame as f64 * frame_ms);

        let now = session.sim.game.status;
        if now != status {
            log::info!("{:?} -> {:?} (score {})", status, now, session.sim.game.display_score());
            status = now;
        }
        match now {
            GameStatus::LevelClear => {
                session.continue_run();
            }
            GameStatus::GameOver | GameStatus::Win => break,
            _ => {}
        }
    }

    let hud = session.hud_snapshot();
    match serde_json::to_string_pretty(&hud) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize HUD: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
