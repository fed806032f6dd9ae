//! Browser host binding
//!
//! `WarpSim` wraps a [`GameState`] for a JavaScript host: the host forwards
//! input, calls `frame` from `requestAnimationFrame` and reads back JSON.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::sim::{
    ControlScheme, Field, FrameClock, GameState, InputEvent, ModeChoice, SessionConfig, TickInput,
    tick,
};
use crate::tuning::Tuning;

fn point(x: Option<f32>, y: Option<f32>) -> Option<Vec2> {
    Some(Vec2::new(x?, y?))
}

#[wasm_bindgen]
pub struct WarpSim {
    state: GameState,
    clock: FrameClock,
    input: TickInput,
}

impl WarpSim {
    fn build(width: f32, height: f32, dash: bool, tuning: Tuning) -> WarpSim {
        console_error_panic_hook::set_once();
        // A second instance finds the logger already installed
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = js_sys::Date::now() as u64;
        let scheme = if dash {
            ControlScheme::Dash
        } else {
            ControlScheme::Lanes
        };
        let config = SessionConfig::menu_demo(scheme, &tuning);
        let clock = FrameClock::new(tuning.max_frame_dt);
        log::info!("Warp Run initialized with seed: {seed}");
        WarpSim {
            state: GameState::with_config(seed, tuning, Field::new(width, height), config),
            clock,
            input: TickInput::default(),
        }
    }
}

#[wasm_bindgen]
impl WarpSim {
    /// Menu demo on a `width` x `height` field with default tuning
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, dash: bool) -> WarpSim {
        Self::build(width, height, dash, Tuning::default())
    }

    /// Like `new`, with JSON tuning overrides
    pub fn with_tuning(
        width: f32,
        height: f32,
        dash: bool,
        tuning_json: &str,
    ) -> Result<WarpSim, JsError> {
        let tuning = Tuning::from_json(tuning_json)?;
        Ok(Self::build(width, height, dash, tuning))
    }

    pub fn shift_left(&mut self) {
        self.input.events.push(InputEvent::ShiftLeft);
    }

    pub fn shift_right(&mut self) {
        self.input.events.push(InputEvent::ShiftRight);
    }

    pub fn hold_start(&mut self, x: Option<f32>, y: Option<f32>) {
        self.input.events.push(InputEvent::HoldStart {
            target: point(x, y),
        });
    }

    pub fn hold_end(&mut self, x: Option<f32>, y: Option<f32>) {
        self.input.events.push(InputEvent::HoldEnd {
            target: point(x, y),
        });
    }

    pub fn pause_toggle(&mut self) {
        self.input.events.push(InputEvent::PauseToggle);
    }

    pub fn restart(&mut self) {
        self.input.events.push(InputEvent::Restart);
    }

    pub fn start(&mut self) {
        self.input.events.push(InputEvent::ModeSelect(ModeChoice::Start));
    }

    pub fn practice(&mut self) {
        self.input
            .events
            .push(InputEvent::ModeSelect(ModeChoice::Practice));
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let mut field = Field::new(width, height);
        field.lane_count = self.state.field().lane_count;
        self.state.set_field(field);
    }

    /// Tab hidden: the next frame starts a fresh delta
    pub fn suspend(&mut self) {
        self.clock.reset();
    }

    /// Advance one host frame
    pub fn frame(&mut self, timestamp_ms: f64) {
        let dt = self.clock.advance(timestamp_ms);
        tick(&mut self.state, &self.input, dt);
        self.input.events.clear();
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.snapshot())?)
    }

    pub fn drain_events_json(&mut self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.drain_events())?)
    }
}
