//! Per-frame simulation tick
//!
//! One synchronous pipeline advances the whole game by a variable, clamped
//! frame delta. Input events are applied first, then the mode gate decides
//! whether anything else runs.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::clamp_frame_dt;
use super::collision::resolve_collisions;
use super::field::Field;
use super::physics::{apply_magnet, integrate_craft, integrate_entities};
use super::state::{
    ControlScheme, GameEvent, GameMode, GameState, Hold, ModeChoice, Session, SessionConfig,
    SessionKind, place_gate,
};
use crate::charge_fraction;
use crate::consts::REFERENCE_FPS;
use crate::tuning::Tuning;

/// Logical input from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    ShiftLeft,
    ShiftRight,
    /// Begin charging a dash, optionally aiming at a point
    HoldStart { target: Option<Vec2> },
    /// Release the dash; falls back to the hold's aim, then the gate
    HoldEnd { target: Option<Vec2> },
    PauseToggle,
    Restart,
    ModeSelect(ModeChoice),
}

/// Input events collected since the previous tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = clamp_frame_dt(dt, state.tuning.max_frame_dt);

    for event in &input.events {
        apply_input(state, *event);
    }

    if !state.mode.is_running() {
        return;
    }

    let GameState {
        tuning,
        field,
        config,
        session,
        rng,
        events,
        ..
    } = &mut *state;

    session.stats.elapsed += dt;
    session.timers.tick(dt);
    session.craft.tick_invulnerability(dt);
    session.difficulty.advance(dt, &tuning.difficulty);

    if config.kind.scoring() {
        session.score += f64::from(survival_points(config.kind, tuning) * dt * REFERENCE_FPS);
    }
    if config.kind.damage_enabled() {
        session.vitality.drain(tuning.fuel.drain * dt);
    }
    if let Some(hold) = &mut session.hold {
        hold.held += dt;
    }
    if config.autonomous {
        autopilot(session, config.scheme, field, tuning, rng);
    }

    session.spawner.update(
        dt,
        &session.difficulty,
        config.scheme,
        field,
        tuning,
        &mut session.store,
        rng,
    );

    let time_scale = session.timers.time_scale(&tuning.powerups);
    integrate_craft(&mut session.craft, field, dt, tuning);
    integrate_entities(&mut session.store, dt, time_scale, tuning);
    if session.timers.magnet_active() {
        apply_magnet(&mut session.store, &session.craft, tuning.powerups.magnet_pull);
    }
    if let Some(gate) = &mut session.gate {
        gate.phase = (gate.phase + dt * tuning.spawn.phase_rate) % std::f32::consts::TAU;
    }

    if resolve_collisions(session, config, tuning, events) {
        session.gate = Some(place_gate(field, tuning, session.craft.pos, rng));
    }
    session.store.sweep(
        field,
        tuning.spawn.cull_margin,
        tuning.spawn.projectile_cull_margin,
    );

    let before = session.combo.multiplier(&tuning.combo);
    session.combo.decay(dt, &tuning.combo);
    let after = session.combo.multiplier(&tuning.combo);
    if after != before {
        events.push(GameEvent::ComboChanged(after));
    }

    if config.kind.can_end() && session.vitality.is_depleted() {
        finish_run(state);
    }
}

fn apply_input(state: &mut GameState, event: InputEvent) {
    let steerable = matches!(state.mode, GameMode::Practice | GameMode::Active)
        && !state.config.autonomous;

    match event {
        InputEvent::ShiftLeft if steerable => state.session.craft.shift_lane(-1, &state.field),
        InputEvent::ShiftRight if steerable => state.session.craft.shift_lane(1, &state.field),
        InputEvent::HoldStart { target }
            if steerable && state.config.scheme == ControlScheme::Dash =>
        {
            state.session.hold = Some(Hold {
                held: 0.0,
                aim: target,
            });
        }
        InputEvent::HoldEnd { target } => {
            let Some(hold) = state.session.hold.take() else {
                return;
            };
            if !steerable {
                return;
            }
            let aim = target
                .or(hold.aim)
                .or(state.session.gate.map(|gate| gate.pos));
            if let Some(aim) = aim {
                let charge = charge_fraction(hold.held, state.tuning.craft.dash_charge_rate);
                let impulse = state.session.craft.dash(aim, charge, &state.tuning.craft);
                log::debug!("Dash at charge {charge:.2}: {:.0} px/s", impulse.length());
            }
        }
        InputEvent::PauseToggle => state.toggle_pause(),
        InputEvent::Restart => {
            let config = state.config.restarted(&state.tuning);
            state.reset(config);
        }
        InputEvent::ModeSelect(choice) => {
            let scheme = state.config.scheme;
            let config = match choice {
                ModeChoice::Start => SessionConfig::active(scheme, &state.tuning),
                ModeChoice::Practice => SessionConfig::practice(scheme, &state.tuning),
            };
            state.reset(config);
        }
        InputEvent::ShiftLeft | InputEvent::ShiftRight | InputEvent::HoldStart { .. } => {}
    }
}

/// Passive points per reference frame
fn survival_points(kind: SessionKind, tuning: &Tuning) -> f32 {
    match kind {
        SessionKind::Active => tuning.points.survival_active,
        SessionKind::Practice => tuning.points.survival_practice,
        SessionKind::MenuDemo => 0.0,
    }
}

/// Random steering for demo and autopilot sessions
fn autopilot(
    session: &mut Session,
    scheme: ControlScheme,
    field: &Field,
    tuning: &Tuning,
    rng: &mut Pcg32,
) {
    match scheme {
        ControlScheme::Lanes => {
            if rng.random::<f32>() < tuning.demo.lane_change_chance {
                let lane = rng.random_range(0..field.lane_count.max(1));
                session.craft.set_target_lane(lane, field);
            }
        }
        ControlScheme::Dash => {
            if rng.random::<f32>() >= tuning.demo.dash_chance {
                return;
            }
            if let Some(gate) = session.gate {
                session
                    .craft
                    .dash(gate.pos, tuning.demo.dash_charge, &tuning.craft);
            }
        }
    }
}

fn finish_run(state: &mut GameState) {
    let session = &mut state.session;
    session.stats.score = session.points();
    session.hold = None;
    let stats = session.stats.clone();
    log::info!(
        "Run over: score {}, {} hits taken, best x{}, {:.1}s",
        stats.score,
        stats.hits_taken,
        stats.best_multiplier,
        stats.elapsed
    );
    state.set_mode(GameMode::Over);
    state.events.push(GameEvent::RunOver(stats));
}
