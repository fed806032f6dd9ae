//! Game state and core simulation types
//!
//! A run is one [`Session`] aggregate. Reset replaces it wholesale; nothing
//! survives from the previous run except the tuning, the field and the RNG.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::HitOutcome;
use super::craft::{Craft, Motion};
use super::difficulty::Difficulty;
use super::entity::{Entity, EntityKind, EntityStore, Gate, PickupKind, Projectile};
use super::field::Field;
use super::powerup::{PowerupTimers, Vitality};
use super::score::{ComboState, RunStats};
use super::spawn::{Spawner, spawn_entity};
use crate::charge_fraction;
use crate::tuning::Tuning;

/// How the craft is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    /// Discrete lanes with projectiles
    Lanes,
    /// Free motion, charged dashes and a fuel gate
    Dash,
}

/// Which kind of run a session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    /// Attract-mode demo behind the menu
    MenuDemo,
    Practice,
    Active,
}

impl SessionKind {
    /// Mode the state machine is in while this session runs
    pub fn mode(self) -> GameMode {
        match self {
            SessionKind::MenuDemo => GameMode::MenuDemo,
            SessionKind::Practice => GameMode::Practice,
            SessionKind::Active => GameMode::Active,
        }
    }

    pub fn damage_enabled(self) -> bool {
        self != SessionKind::MenuDemo
    }

    pub fn scoring(self) -> bool {
        self != SessionKind::MenuDemo
    }

    /// Difficulty ramps everywhere except the demo, which holds its seed
    pub fn ramps(self) -> bool {
        self != SessionKind::MenuDemo
    }

    /// Only a real run can end
    pub fn can_end(self) -> bool {
        self == SessionKind::Active
    }
}

/// Menu choices that start a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeChoice {
    Start,
    Practice,
}

/// Parameters for [`GameState::reset`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub kind: SessionKind,
    pub scheme: ControlScheme,
    pub starting_lives: u32,
    pub difficulty_seed: f32,
    /// Craft driven by the autopilot instead of input
    pub autonomous: bool,
    pub onboarding_pickups: usize,
}

impl SessionConfig {
    pub fn menu_demo(scheme: ControlScheme, tuning: &Tuning) -> Self {
        Self {
            kind: SessionKind::MenuDemo,
            scheme,
            starting_lives: tuning.craft.starting_lives,
            difficulty_seed: tuning.difficulty.demo_seed,
            autonomous: true,
            onboarding_pickups: tuning.spawn.onboarding_pickups,
        }
    }

    pub fn practice(scheme: ControlScheme, tuning: &Tuning) -> Self {
        Self {
            kind: SessionKind::Practice,
            scheme,
            starting_lives: tuning.craft.practice_lives,
            difficulty_seed: 0.0,
            autonomous: false,
            onboarding_pickups: tuning.spawn.onboarding_pickups,
        }
    }

    pub fn active(scheme: ControlScheme, tuning: &Tuning) -> Self {
        Self {
            kind: SessionKind::Active,
            scheme,
            starting_lives: tuning.craft.starting_lives,
            difficulty_seed: 0.0,
            autonomous: false,
            onboarding_pickups: tuning.spawn.onboarding_pickups,
        }
    }

    /// Same session, flown by the autopilot
    pub fn with_autopilot(mut self) -> Self {
        self.autonomous = true;
        self
    }

    /// Config a `Restart` produces (the demo restarts as a real run)
    pub fn restarted(self, tuning: &Tuning) -> Self {
        match self.kind {
            SessionKind::MenuDemo => Self::active(self.scheme, tuning),
            SessionKind::Practice | SessionKind::Active => self,
        }
    }
}

/// Current phase of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    MenuDemo,
    Practice,
    Active,
    /// Frozen; resumes into the mode it was entered from
    Paused,
    /// Run ended; left only through a reset
    Over,
}

impl GameMode {
    /// Whether the frame pipeline runs in this mode
    pub fn is_running(self) -> bool {
        matches!(self, GameMode::MenuDemo | GameMode::Practice | GameMode::Active)
    }
}

/// Notifications for the host (audio, effects, HUD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PickupCollected(EntityKind),
    GateCleared,
    ObstacleHit(HitOutcome),
    /// New combo multiplier
    ComboChanged(u32),
    ModeChanged(GameMode),
    RunOver(RunStats),
}

/// Dash charge in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hold {
    /// Seconds held so far
    pub held: f32,
    /// Point the player is aiming at, if any
    pub aim: Option<Vec2>,
}

/// Everything that belongs to one run
#[derive(Debug, Clone)]
pub struct Session {
    pub craft: Craft,
    pub store: EntityStore,
    /// Dash sessions only
    pub gate: Option<Gate>,
    pub combo: ComboState,
    pub timers: PowerupTimers,
    pub vitality: Vitality,
    pub difficulty: Difficulty,
    pub spawner: Spawner,
    /// Fractional score; survival points accrue per frame
    pub score: f64,
    pub stats: RunStats,
    pub hold: Option<Hold>,
}

impl Session {
    /// A fresh session with no entities and no gate
    pub fn new(config: &SessionConfig, field: &Field, tuning: &Tuning) -> Self {
        let mut craft = match config.scheme {
            ControlScheme::Lanes => Craft::in_lane(field, field.lane_count / 2, &tuning.craft),
            ControlScheme::Dash => Craft::free(field, &tuning.craft),
        };
        let vitality = match config.scheme {
            ControlScheme::Lanes => Vitality::Lives(config.starting_lives),
            ControlScheme::Dash => Vitality::Fuel(1.0),
        };
        let mut difficulty = Difficulty::new(
            config.difficulty_seed,
            config.kind.ramps(),
            &tuning.difficulty,
        );
        let spawner = if config.kind == SessionKind::MenuDemo {
            craft.grant_invulnerability(tuning.demo.invulnerability);
            difficulty = difficulty.with_pinned_speed(tuning.demo.speed);
            Spawner::new(tuning.demo.spawn_delay, tuning.demo.projectile_delay)
        } else {
            Spawner::default()
        };

        Self {
            craft,
            store: EntityStore::new(),
            gate: None,
            combo: ComboState::default(),
            timers: PowerupTimers::default(),
            vitality,
            difficulty,
            spawner,
            score: 0.0,
            stats: RunStats::default(),
            hold: None,
        }
    }

    /// Whole points earned so far
    pub fn points(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) tuning: Tuning,
    pub(crate) field: Field,
    pub(crate) config: SessionConfig,
    pub(crate) mode: GameMode,
    /// Mode to return to when unpausing
    pub(crate) resume_mode: Option<GameMode>,
    pub(crate) session: Session,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Lane-mode menu demo with default tuning
    pub fn new(seed: u64) -> Self {
        let tuning = Tuning::default();
        let config = SessionConfig::menu_demo(ControlScheme::Lanes, &tuning);
        Self::with_config(seed, tuning, Field::default(), config)
    }

    pub fn with_config(seed: u64, tuning: Tuning, field: Field, config: SessionConfig) -> Self {
        let session = Session::new(&config, &field, &tuning);
        let mut state = Self {
            tuning,
            field,
            config,
            mode: config.kind.mode(),
            resume_mode: None,
            session,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        state.reset(config);
        state
    }

    /// Discard the current run and start a new one
    pub fn reset(&mut self, config: SessionConfig) {
        let mut session = Session::new(&config, &self.field, &self.tuning);
        if config.scheme == ControlScheme::Dash {
            session.gate = Some(place_gate(
                &self.field,
                &self.tuning,
                session.craft.pos,
                &mut self.rng,
            ));
        }

        // Onboarding pickups alternate Secondary, Primary, spaced down from the top
        let onboarding = [
            EntityKind::Pickup(PickupKind::Secondary),
            EntityKind::Pickup(PickupKind::Primary),
        ];
        for (i, kind) in onboarding
            .iter()
            .cycle()
            .take(config.onboarding_pickups)
            .enumerate()
        {
            spawn_entity(
                *kind,
                &session.difficulty,
                config.scheme,
                &self.field,
                &self.tuning,
                &mut session.store,
                &mut self.rng,
            );
            if let Some(entity) = session.store.entities.last_mut() {
                entity.pos.y += i as f32 * self.field.height * 0.18;
            }
        }

        log::info!(
            "Session reset: {:?} {:?}, lives {}, difficulty {:.1}",
            config.kind,
            config.scheme,
            config.starting_lives,
            session.difficulty.level()
        );
        self.session = session;
        self.config = config;
        self.resume_mode = None;
        self.set_mode(config.kind.mode());
    }

    pub(crate) fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::info!("Mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.events.push(GameEvent::ModeChanged(mode));
        }
    }

    /// Pause any running mode, or resume from Paused
    pub(crate) fn toggle_pause(&mut self) {
        match self.mode {
            GameMode::MenuDemo | GameMode::Practice | GameMode::Active => {
                self.resume_mode = Some(self.mode);
                self.set_mode(GameMode::Paused);
            }
            GameMode::Paused => {
                let mode = self
                    .resume_mode
                    .take()
                    .unwrap_or_else(|| self.config.kind.mode());
                self.set_mode(mode);
            }
            GameMode::Over => {}
        }
    }

    /// Adopt a new playfield size (host resize)
    pub fn set_field(&mut self, field: Field) {
        log::debug!("Field resized to {}x{}", field.width, field.height);
        self.field = field;
        let target = match self.session.craft.motion {
            Motion::Lane { target_lane, .. } => Some(target_lane),
            Motion::Free { .. } => None,
        };
        if let Some(lane) = target {
            self.session.craft.set_target_lane(lane, &self.field);
        }
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Current dash charge in `[0, 1]` while a hold is in progress
    pub fn charge(&self) -> Option<f32> {
        self.session
            .hold
            .map(|hold| charge_fraction(hold.held, self.tuning.craft.dash_charge_rate))
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot<'_> {
        let session = &self.session;
        let powerups = &self.tuning.powerups;
        Snapshot {
            mode: self.mode,
            paused: self.mode == GameMode::Paused,
            scheme: self.config.scheme,
            field: self.field,
            craft: &session.craft,
            entities: &session.store.entities,
            projectiles: &session.store.projectiles,
            gate: session.gate,
            score: session.points(),
            vitality: session.vitality,
            multiplier: session.combo.multiplier(&self.tuning.combo),
            combo_hits: session.combo.hits(),
            timers: session.timers,
            speed: session.difficulty.speed(&self.tuning.difficulty)
                * session.timers.time_scale(powerups),
            difficulty: session.difficulty.level(),
            charge: self.charge(),
        }
    }
}

/// Borrowed render view of the current frame
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub mode: GameMode,
    pub paused: bool,
    pub scheme: ControlScheme,
    pub field: Field,
    pub craft: &'a Craft,
    pub entities: &'a [Entity],
    pub projectiles: &'a [Projectile],
    pub gate: Option<Gate>,
    pub score: u64,
    pub vitality: Vitality,
    pub multiplier: u32,
    pub combo_hits: u32,
    pub timers: PowerupTimers,
    /// Scroll speed after slow-time (px/s)
    pub speed: f32,
    pub difficulty: f32,
    pub charge: Option<f32>,
}

const GATE_PLACEMENT_TRIES: usize = 16;

/// Pick a new gate position in the upper part of the field, at least four
/// gate radii from `avoid`
pub(crate) fn place_gate(
    field: &Field,
    tuning: &Tuning,
    avoid: Vec2,
    rng: &mut impl Rng,
) -> Gate {
    let radius = tuning.fuel.gate_radius;
    let margin = radius * 2.0;
    let (left, right) = (margin, field.width - margin);
    let (top, bottom) = (field.height * 0.15, field.height * 0.6);

    let sampled = (0..GATE_PLACEMENT_TRIES)
        .map(|_| {
            Vec2::new(
                sample_span(rng, left, right),
                sample_span(rng, top, bottom),
            )
        })
        .find(|pos| pos.distance(avoid) >= radius * 4.0);

    // Fall back to the corner of the placement box farthest from the craft
    let pos = sampled.unwrap_or_else(|| {
        let x = if avoid.x < field.width * 0.5 {
            right.max(left)
        } else {
            left
        };
        let y = if avoid.y < (top + bottom) * 0.5 {
            bottom
        } else {
            top
        };
        Vec2::new(x, y)
    });
    Gate {
        pos,
        radius,
        phase: 0.0,
    }
}

fn sample_span(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_menu_demo() {
        let state = GameState::new(42);
        assert_eq!(state.mode(), GameMode::MenuDemo);
        assert_eq!(
            state.session().difficulty.level(),
            state.tuning().difficulty.demo_seed
        );
        assert!(state.session().craft.is_invulnerable());
        assert_eq!(state.session().store.entities.len(), 2);
    }

    #[test]
    fn test_reset_spawns_onboarding_pickups() {
        let mut state = GameState::new(1);
        let tuning = state.tuning().clone();
        state.reset(SessionConfig::active(ControlScheme::Lanes, &tuning));

        let kinds: Vec<EntityKind> = state
            .session()
            .store
            .entities
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Pickup(PickupKind::Secondary),
                EntityKind::Pickup(PickupKind::Primary),
            ]
        );
        let store = &state.session().store;
        assert!(store.entities[1].pos.y > store.entities[0].pos.y);
        assert_eq!(store.count_kind(EntityKind::Pickup(PickupKind::Primary)), 1);
        assert_eq!(store.count_kind(EntityKind::Pickup(PickupKind::Secondary)), 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ModeChanged(GameMode::Active)]
        );
    }

    #[test]
    fn test_reset_clears_run_state() {
        use crate::sim::tick::{TickInput, tick};

        let tuning = Tuning::default();
        let config = SessionConfig::practice(ControlScheme::Lanes, &tuning);
        let mut state = GameState::with_config(9, tuning.clone(), Field::default(), config);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), 1.0 / 60.0);
        }
        assert!(state.session().difficulty.level() > 0.0);
        assert!(state.session().stats.elapsed > 0.0);

        let session = &mut state.session;
        let pos = session.craft.pos;
        session
            .store
            .spawn_projectile(pos - Vec2::new(0.0, 200.0), Vec2::ZERO, 6.0, 1);
        session.score = 5000.0;
        session.vitality = Vitality::Lives(1);
        session.timers = PowerupTimers {
            shield: 4.0,
            slow: 3.0,
            magnet: 2.0,
        };
        session.craft.grant_invulnerability(1.5);
        session.craft.record_trail(&tuning.craft);
        session.hold = Some(Hold {
            held: 0.4,
            aim: Some(pos),
        });
        session.gate = Some(Gate {
            pos,
            radius: tuning.fuel.gate_radius,
            phase: 1.0,
        });
        session.stats.hits_taken = 2;
        for _ in 0..10 {
            session.combo.register_hit(&tuning.combo);
        }
        assert!(!session.store.projectiles.is_empty());

        state.reset(SessionConfig::active(ControlScheme::Lanes, &tuning));

        let session = state.session();
        assert_eq!(state.mode(), GameMode::Active);
        assert_eq!(session.points(), 0);
        assert_eq!(session.vitality, Vitality::Lives(3));
        assert_eq!(session.timers, PowerupTimers::default());
        assert_eq!(session.combo.multiplier(&tuning.combo), 1);
        assert_eq!(session.combo.hits(), 0);
        assert_eq!(session.difficulty.level(), 0.0);
        assert_eq!(session.spawner, Spawner::default());
        assert_eq!(session.stats, RunStats::default());
        assert!(!session.craft.is_invulnerable());
        assert!(session.craft.trail.is_empty());
        assert_eq!(session.hold, None);
        assert_eq!(session.gate, None);
        assert_eq!(state.charge(), None);
        assert_eq!(session.store.entities.len(), tuning.spawn.onboarding_pickups);
        assert!(session.store.projectiles.is_empty());
    }

    #[test]
    fn test_dash_reset_places_gate_and_fuel() {
        let mut state = GameState::new(3);
        let tuning = state.tuning().clone();
        state.reset(SessionConfig::active(ControlScheme::Dash, &tuning));

        let session = state.session();
        assert_eq!(session.vitality, Vitality::Fuel(1.0));
        let gate = session.gate.expect("dash sessions have a gate");
        let field = state.field();
        assert!(gate.pos.x >= 0.0 && gate.pos.x <= field.width);
        assert!(gate.pos.y < field.craft_row());
        assert!(session.store.entities.iter().all(|e| e.lane.is_none()));
    }

    #[test]
    fn test_pause_resumes_previous_mode() {
        let mut state = GameState::new(5);
        let tuning = state.tuning().clone();

        state.toggle_pause();
        assert_eq!(state.mode(), GameMode::Paused);
        state.toggle_pause();
        assert_eq!(state.mode(), GameMode::MenuDemo);

        state.reset(SessionConfig::practice(ControlScheme::Lanes, &tuning));
        state.toggle_pause();
        assert_eq!(state.mode(), GameMode::Paused);
        assert!(state.snapshot().paused);
        state.toggle_pause();
        assert_eq!(state.mode(), GameMode::Practice);
    }

    #[test]
    fn test_restart_config() {
        let tuning = Tuning::default();
        let demo = SessionConfig::menu_demo(ControlScheme::Dash, &tuning);
        let restarted = demo.restarted(&tuning);
        assert_eq!(restarted.kind, SessionKind::Active);
        assert_eq!(restarted.scheme, ControlScheme::Dash);
        assert!(!restarted.autonomous);

        let practice = SessionConfig::practice(ControlScheme::Lanes, &tuning);
        assert_eq!(practice.restarted(&tuning), practice);
        assert_eq!(practice.starting_lives, 99);
    }

    #[test]
    fn test_snapshot_reports_slowed_speed() {
        let mut state = GameState::new(8);
        let tuning = state.tuning().clone();
        state.reset(SessionConfig::active(ControlScheme::Lanes, &tuning));
        assert_eq!(state.snapshot().speed, 700.0);

        state.session.timers.slow = 1.0;
        let snapshot = state.snapshot();
        assert!((snapshot.speed - 700.0 * 0.65).abs() < 1e-3);
        assert_eq!(snapshot.multiplier, 1);
        assert_eq!(snapshot.charge, None);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }

    #[test]
    fn test_demo_scrolls_at_pinned_speed() {
        let state = GameState::new(8);
        assert_eq!(state.snapshot().speed, state.tuning().demo.speed);
        assert_eq!(state.snapshot().speed, 560.0);
    }

    #[test]
    fn test_gate_keeps_clear_of_centered_craft() {
        let tuning = Tuning::default();
        let field = Field::default();
        let craft = Vec2::new(field.width * 0.5, field.height * 0.35);
        for seed in 0..2000 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let gate = place_gate(&field, &tuning, craft, &mut rng);
            assert!(
                gate.pos.distance(craft) >= gate.radius * 4.0,
                "seed {seed}: gate at {:?}",
                gate.pos
            );
            let margin = gate.radius * 2.0;
            assert!(gate.pos.x >= margin && gate.pos.x <= field.width - margin);
            assert!(gate.pos.y >= field.height * 0.15 && gate.pos.y <= field.height * 0.6);
        }
    }

    #[test]
    fn test_gate_fallback_when_field_is_cramped() {
        let tuning = Tuning::default();
        let field = Field::new(tuning.fuel.gate_radius * 5.0, 200.0);
        let craft = Vec2::new(field.width * 0.5, 60.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let gate = place_gate(&field, &tuning, craft, &mut rng);
        assert!(gate.pos.x.is_finite() && gate.pos.y.is_finite());
        assert!(gate.pos.y > craft.y);
    }

    #[test]
    fn test_set_field_clamps_lane_target() {
        let mut state = GameState::new(2);
        state.session.craft.shift_lane(1, &state.field);
        let mut narrow = Field::new(400.0, 800.0);
        narrow.lane_count = 2;
        state.set_field(narrow);
        assert!(matches!(
            state.session().craft.motion,
            Motion::Lane { target_lane: 1, .. }
        ));
    }
}
