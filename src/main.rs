//! Chroma Match entry point
//!
//! In the browser this wires the canvas, pointer input and the frame loop to
//! the simulation. Natively it plays a short scripted game and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

    use chroma_match::consts::*;
    use chroma_match::renderer::draw_field;
    use chroma_match::sim::{Field, GameEvent, PointerEvent, TickInput, tick};
    use chroma_match::{GameMode, Settings};

    /// Game instance holding all state
    struct Game {
        field: Field,
        ctx: CanvasRenderingContext2d,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Set once a tick fails; the loop stops stepping the field
        halted: bool,
    }

    impl Game {
        fn new(field: Field, ctx: CanvasRenderingContext2d) -> Self {
            Self {
                field,
                ctx,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                halted: false,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            if self.halted {
                return;
            }
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                if let Err(e) = tick(&mut self.field, &input) {
                    log::error!("Simulation stopped: {}", e);
                    self.halted = true;
                    return;
                }
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Presses and releases are one-shot, hover persists
                self.input.events.clear();
            }

            for event in self.field.drain_events() {
                match event {
                    GameEvent::ScoreAdded { delta, total } => {
                        log::info!("+{} (score {})", delta, total)
                    }
                    other => log::debug!("{:?}", other),
                }
            }
        }

        fn render(&mut self) {
            draw_field(&self.field, &mut self.ctx);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.field.score().to_string()));
            }
            if let Some(el) = document.query_selector("#hud-mode .hud-value").ok().flatten() {
                el.set_text_content(Some(self.field.mode().as_str()));
            }
        }

        fn push_pointer(&mut self, pos: Vec2, pressed: bool) {
            self.input.events.push(PointerEvent { pos, pressed });
            self.input.pointer = Some(pos);
        }
    }

    /// `?mode=x` picks MatchX; anything unknown falls back to Endless
    fn mode_from_query(window: &web_sys::Window) -> GameMode {
        let search = window.location().search().unwrap_or_default();
        let Some(value) = search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("mode="))
        else {
            return GameMode::default();
        };
        match value.parse::<GameMode>() {
            Ok(mode) => mode,
            Err(e) => {
                log::warn!("{}; playing endless", e);
                GameMode::default()
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Chroma Match starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Field pixels are CSS pixels so pointer offsets map straight onto cells
        let width = canvas.client_width().max(0) as u32;
        let height = canvas.client_height().max(0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let mode = mode_from_query(&window);
        let seed = js_sys::Date::now() as u64;
        let settings = Settings {
            seed,
            ..Settings::for_canvas(width as f32, height as f32, mode)
        };
        let field = Field::new(settings).map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Playing {} with seed {}", mode.as_str(), seed);

        let game = Rc::new(RefCell::new(Game::new(field, ctx)));

        setup_input_handlers(&canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);
        Ok(())
    }

    fn touch_pos(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<Vec2> {
        // Releases only show up in changedTouches
        let touch = event
            .touches()
            .get(0)
            .or_else(|| event.changed_touches().get(0))?;
        let rect = canvas.get_bounding_client_rect();
        Some(Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn mouse_pos(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().input.pointer = Some(mouse_pos(&event));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse leave
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer = None;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down / up
        for (name, pressed) in [("mousedown", true), ("mouseup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().push_pointer(mouse_pos(&event), pressed);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_pos(&canvas_clone, &event) {
                    game.borrow_mut().input.pointer = Some(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start / end
        for (name, pressed) in [("touchstart", true), ("touchend", false)] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_pos(&canvas_clone, &event) {
                    game.borrow_mut().push_pointer(pos, pressed);
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Chroma Match (native) starting...");
    log::info!("The playable build is the web one - run with `trunk serve`");

    for mode in [chroma_match::GameMode::Endless, chroma_match::GameMode::MatchX] {
        if let Err(e) = demo::play(mode, 2024) {
            log::error!("{} demo failed: {}", mode.as_str(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Scripted headless games used as a smoke run of the simulation
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::{IVec2, Vec2};

    use chroma_match::sim::{Field, GameEvent, PointerEvent, TickInput, tick};
    use chroma_match::{GameMode, MatchError, Settings};

    const DEMO_TICKS: u32 = 3000;
    const DEMO_MOVES: i32 = 40;

    pub fn play(mode: GameMode, seed: u64) -> Result<(), MatchError> {
        let settings = Settings {
            seed,
            ..Settings::with_board(6, 6, mode)
        };
        let mut field = Field::new(settings)?;
        let size = field.settings().block_size;
        let bounds = field.bounds();
        let mut moves = 0;

        for _ in 0..DEMO_TICKS {
            let mut input = TickInput::default();
            if field.is_idle() && moves < DEMO_MOVES {
                // Walk the board cell by cell
                let cell = IVec2::new(moves % bounds.cols, (moves / bounds.cols) % bounds.rows);
                let center = (cell.as_vec2() + Vec2::splat(0.5)) * size;
                let release = match mode {
                    GameMode::Endless => center + Vec2::new(size, 0.0),
                    GameMode::MatchX => center,
                };
                input.events = vec![PointerEvent::down(center), PointerEvent::up(release)];
                moves += 1;
            }
            tick(&mut field, &input)?;

            for event in field.drain_events() {
                match event {
                    GameEvent::GameOver { score } => {
                        log::info!("{}: game over at {} points", mode.as_str(), score);
                        return Ok(());
                    }
                    other => log::info!("{}: {:?}", mode.as_str(), other),
                }
            }
        }

        log::info!(
            "{}: {} moves tried, final score {}",
            mode.as_str(),
            moves,
            field.score()
        );
        Ok(())
    }
}
