//! Find Maxence entry point
//!
//! The browser build drives the session from requestAnimationFrame. The native
//! build runs a headless session that plays itself, useful for exercising the
//! threaded simulator and the leaderboard client.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use find_maxence::audio::WebAudio;
    use find_maxence::hit::PointerEvent;
    use find_maxence::platform::FpsCounter;
    use find_maxence::platform::web::{self, CanvasRenderer};
    use find_maxence::sim::InlineSpawner;
    use find_maxence::{Phase, SessionController, Settings};

    type Controller = SessionController<InlineSpawner, CanvasRenderer, WebAudio>;

    struct Game {
        controller: Controller,
        canvas: HtmlCanvasElement,
        fps: FpsCounter,
        show_fps: bool,
    }

    /// Same clock as requestAnimationFrame timestamps
    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Find Maxence starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no #gameCanvas")?
            .dyn_into()?;

        let settings = Settings::load().normalized();
        // Write back so the settings page sees every field
        settings.save();

        let renderer = CanvasRenderer::new(&canvas, document.clone())?;
        let audio = WebAudio::new(settings.music);
        let show_fps = settings.show_fps;
        let seed = js_sys::Date::now() as u64;
        log::info!("Session seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            controller: SessionController::new(settings, InlineSpawner, renderer, audio, seed),
            canvas: canvas.clone(),
            fps: FpsCounter::new(),
            show_fps,
        }));

        web::set_display(&document, "fps", if show_fps { "block" } else { "none" });

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(&document, game.clone());

        request_animation_frame(game);

        log::info!("Find Maxence ready");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Click - hit test against the roster
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let viewport = web::viewport(&g.canvas);
                let pointer = PointerEvent::new(event.client_x() as f32, event.client_y() as f32);
                if let Some(hit) = g.controller.handle_pointer(&pointer, &viewport, now()) {
                    log::debug!("Hit {:?}", hit);
                }
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else { return };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() != "Escape" {
                    return;
                }
                let mut g = game.borrow_mut();
                if matches!(g.controller.session().phase, Phase::Running | Phase::Paused) {
                    g.controller.toggle_pause(now());
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Run `action` when the button with `id` is clicked
    fn on_click(document: &Document, id: &str, game: Rc<RefCell<Game>>, action: fn(&mut Game)) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("No #{} button", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            action(&mut game.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        on_click(document, "startButton", game.clone(), |g| {
            // Audio may only start from a user gesture
            g.controller.audio().resume();
            g.controller.start(now());

            let document = g.controller.render().document();
            web::set_display(document, "startButton", "none");
            web::set_display(document, "pauseButton", "block");
        });
        on_click(document, "restartButton", game.clone(), |g| {
            g.controller.restart(now());
        });
        on_click(document, "pauseButton", game.clone(), |g| {
            g.controller.pause(now());
        });
        on_click(document, "resumeButton", game, |g| {
            g.controller.resume(now());
        });
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Tab hidden
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().controller.focus_lost(now());
                    log::info!("Suspended (tab hidden)");
                }
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().controller.focus_lost(now());
                log::info!("Suspended (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().controller.focus_gained(now());
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.controller.frame(time);

            let fps = g.fps.record(time);
            if g.show_fps {
                let document = g.controller.render().document();
                web::set_text(document, "fps", &format!("{fps} FPS"));
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = web_game::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::thread;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use glam::Vec2;
    use serde_json::json;

    use find_maxence::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
    use find_maxence::hit::{PointerEvent, Viewport};
    use find_maxence::leaderboard::{
        HttpLeaderboard, MemoryLeaderboard, ScoreReporter, validate_submission,
    };
    use find_maxence::ports::{FrameView, Overlay, RenderPort, Silent, format_timer};
    use find_maxence::sim::ThreadSpawner;
    use find_maxence::{Phase, SessionController, Settings};

    const FRAME: Duration = Duration::from_millis(16);
    /// Let a fresh round move before clicking anything (ms)
    const LOOK_TIME_MS: f64 = 750.0;

    /// Render port that only logs
    #[derive(Default)]
    struct LogRender {
        frames: u64,
    }

    impl RenderPort for LogRender {
        fn draw(&mut self, frame: &FrameView<'_>) {
            self.frames += 1;
            if self.frames % 120 == 0 {
                log::debug!(
                    "Frame {}: {} targets, {} banners",
                    self.frames,
                    frame.targets.len(),
                    frame.banners.len()
                );
            }
        }

        fn update_timer(&mut self, seconds: f32) {
            log::trace!("Timer {}", format_timer(seconds));
        }

        fn update_score(&mut self, score: u32) {
            log::info!("Score: {}", score);
        }

        fn set_overlay(&mut self, overlay: Overlay, visible: bool) {
            log::info!("{:?} overlay {}", overlay, if visible { "shown" } else { "hidden" });
        }
    }

    type Controller = SessionController<ThreadSpawner, LogRender, Silent>;

    fn click_at(controller: &mut Controller, at: Vec2, now: f64) {
        let viewport = Viewport::identity(Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT));
        if let Some(hit) = controller.handle_pointer(&PointerEvent { client: at }, &viewport, now) {
            log::info!("Clicked {:?} at ({:.0}, {:.0})", hit, at.x, at.y);
        }
    }

    /// Play until `rounds` wins or game over; returns the final score
    fn play(rounds: u32) -> u32 {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        log::info!("Session seed: {}", seed);

        let mut controller: Controller =
            SessionController::new(Settings::load(), ThreadSpawner, LogRender::default(), Silent, seed);

        let clock = Instant::now();
        let now = || clock.elapsed().as_secs_f64() * 1000.0;

        controller.start(now());
        let mut generation = controller.generation();
        let mut round_started = now();
        let mut decoy_clicked = false;

        loop {
            thread::sleep(FRAME);
            let t = now();
            controller.frame(t);

            if controller.generation() != generation {
                generation = controller.generation();
                round_started = t;
            }

            match controller.session().phase {
                Phase::Running => {}
                Phase::GameOver => break,
                Phase::RoundWon if controller.session().score >= rounds => break,
                _ => continue,
            }
            if t - round_started < LOOK_TIME_MS || controller.is_invincible(t) {
                continue;
            }

            let roster = controller.roster();
            let target = if decoy_clicked {
                roster.primary()
            } else {
                decoy_clicked = true;
                roster.targets.iter().find(|target| !target.is_primary)
            };
            if let Some(at) = target.map(|target| target.center()) {
                click_at(&mut controller, at, t);
            }
        }

        let session = controller.session();
        log::info!(
            "Finished in {:?}: score {}, {}s left",
            session.phase,
            session.score,
            format_timer(session.time_remaining)
        );
        session.score
    }

    fn report(score: u32) {
        let name = std::env::var("PLAYER_NAME").unwrap_or_else(|_| "headless".to_string());
        let mut board: Box<dyn ScoreReporter> = match std::env::var("LEADERBOARD_URL") {
            Ok(url) => {
                log::info!("Reporting to {}", url);
                Box::new(HttpLeaderboard::new(url))
            }
            Err(_) => Box::new(MemoryLeaderboard::new()),
        };

        let submitted = validate_submission(&json!({ "name": name, "score": score }))
            .and_then(|submission| board.submit(&submission.name, submission.score));
        if let Err(e) = submitted {
            match e.status() {
                Some(status) => log::warn!("Score rejected ({}): {}", status, e.user_message()),
                None => log::warn!("Score not submitted ({}): {}", e, e.user_message()),
            }
        }

        match board.top_scores() {
            Ok(top) => {
                for (rank, entry) in top.iter().enumerate() {
                    log::info!("{:>2}. {:<20} {}", rank + 1, entry.name, entry.score);
                }
            }
            Err(e) => log::warn!("Could not fetch leaderboard: {}", e),
        }
    }

    pub fn run(rounds: u32) {
        let score = play(rounds);
        report(score);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Find Maxence (native, headless) starting...");

    let rounds = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                log::warn!("Invalid round count {:?}, using 3", arg);
                3
            }
        },
        None => 3,
    };

    headless::run(rounds);
}
