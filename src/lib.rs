//! Warp Run - a lane-dodging / dash-gate arcade simulation core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (difficulty, spawning, physics, collisions, scoring)
//! - `tuning`: Data-driven game balance
//! - `wasm`: Browser host binding (wasm32 only)

pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Largest frame delta the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.033;
    /// Reference frame rate the per-frame factors were tuned at
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Playfield layout
    pub const LANE_COUNT: usize = 3;
    pub const LANE_PADDING_FRACTION: f32 = 0.18;
    pub const CRAFT_Y_FRACTION: f32 = 0.76;

    /// Craft
    pub const CRAFT_RADIUS: f32 = 18.0;
    /// Extra reach added to the craft radius for overlap tests
    pub const COLLISION_BUFFER: f32 = 2.0;
    /// Lane snapping: fraction of the gap left after one 60 Hz frame
    pub const LANE_SNAP_DECAY: f32 = 0.0004;
    pub const TRAIL_LENGTH: usize = 22;
    pub const TRAIL_FADE: f32 = 0.90;

    /// Difficulty ramp
    pub const DIFFICULTY_CEILING: f32 = 14.0;
    pub const DIFFICULTY_RAMP: f32 = 0.12;
    pub const DEMO_DIFFICULTY: f32 = 2.0;
    pub const BASE_SPEED: f32 = 700.0;
    pub const SPEED_GAIN: f32 = 30.0;

    /// Spawn cadence
    pub const SPAWN_INTERVAL_BASE: f32 = 0.50;
    pub const SPAWN_INTERVAL_GAIN: f32 = 0.018;
    pub const SPAWN_INTERVAL_MIN: f32 = 0.18;
    pub const EXTRA_SPAWN_BASE: f32 = 0.10;
    pub const EXTRA_SPAWN_GAIN: f32 = 0.01;
    pub const EXTRA_SPAWN_CAP: f32 = 0.35;

    /// Projectile cadence (lane sessions)
    pub const PROJECTILE_INTERVAL_BASE: f32 = 1.05;
    pub const PROJECTILE_INTERVAL_GAIN: f32 = 0.03;
    pub const PROJECTILE_INTERVAL_MIN: f32 = 0.35;

    /// Entities
    pub const ENTITY_RADIUS: f32 = 20.0;
    pub const MOBILE_RADIUS: f32 = 23.0;
    pub const MOBILE_SPEED_FACTOR: f32 = 1.02;
    pub const SPAWN_OFFSET: f32 = 70.0;
    pub const CULL_MARGIN: f32 = 140.0;
    pub const PHASE_RATE: f32 = 3.0;

    /// Projectiles
    pub const PROJECTILE_RADIUS: f32 = 6.0;
    pub const PROJECTILE_SPEED_FACTOR: f32 = 1.35;
    pub const PROJECTILE_CULL_MARGIN: f32 = 80.0;
    /// Vertical band (fractions of field height) a source must sit in to fire
    pub const PROJECTILE_SOURCE_TOP: f32 = 0.10;
    pub const PROJECTILE_SOURCE_BOTTOM: f32 = 0.55;

    /// Combo ladder
    pub const COMBO_THRESHOLDS: [u32; 4] = [3, 7, 12, 18];
    pub const COMBO_REFRESH: f32 = 1.8;
    pub const COMBO_COOLDOWN: f32 = 0.35;

    /// Point values
    pub const POINTS_PRIMARY: u32 = 160;
    pub const POINTS_SECONDARY: u32 = 120;
    pub const POINTS_SHIELD: u32 = 80;
    pub const POINTS_SLOW: u32 = 60;
    pub const POINTS_MAGNET: u32 = 60;
    pub const POINTS_GATE: u32 = 200;
    /// Passive score per 60 Hz frame survived
    pub const SURVIVAL_POINTS_ACTIVE: f32 = 7.5;
    pub const SURVIVAL_POINTS_PRACTICE: f32 = 3.5;

    /// Power-ups (seconds added, cap)
    pub const SHIELD_GAIN: f32 = 6.0;
    pub const SHIELD_CAP: f32 = 12.0;
    pub const SHIELD_HIT_COST: f32 = 4.0;
    pub const SLOW_GAIN: f32 = 2.2;
    pub const SLOW_CAP: f32 = 4.4;
    pub const SLOW_FACTOR: f32 = 0.65;
    pub const MAGNET_GAIN: f32 = 3.8;
    pub const MAGNET_CAP: f32 = 7.6;
    /// Fraction of the distance to the craft a collectible covers per frame
    pub const MAGNET_PULL: f32 = 0.05;

    /// Hits
    pub const SHIELD_INVULNERABILITY: f32 = 0.6;
    pub const HIT_INVULNERABILITY: f32 = 1.0;
    pub const STARTING_LIVES: u32 = 3;
    pub const PRACTICE_LIVES: u32 = 99;

    /// Menu demo
    /// Fixed scroll speed while the menu demo runs (px/s)
    pub const DEMO_SPEED: f32 = 560.0;
    pub const DEMO_INVULNERABILITY: f32 = 0.2;
    pub const DEMO_SPAWN_DELAY: f32 = 0.15;
    pub const DEMO_PROJECTILE_DELAY: f32 = 0.6;
    pub const DEMO_LANE_CHANGE_CHANCE: f32 = 0.02;
    pub const DEMO_DASH_CHANCE: f32 = 0.01;
    pub const DEMO_DASH_CHARGE: f32 = 0.6;

    /// Free motion / dash
    pub const FRICTION: f32 = 0.92;
    pub const BOUNCE_RESTITUTION: f32 = 0.45;
    pub const DASH_MIN_IMPULSE: f32 = 420.0;
    pub const DASH_MAX_IMPULSE: f32 = 1100.0;
    pub const DASH_CHARGE_RATE: f32 = 2.5;

    /// Fuel (dash sessions)
    pub const FUEL_DRAIN: f32 = 0.015;
    pub const FUEL_HIT_COST: f32 = 0.25;
    pub const GATE_REFUEL: f32 = 0.2;
    pub const GATE_RADIUS: f32 = 26.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Scale a per-frame factor tuned at 60 Hz to an arbitrary `dt`
///
/// `factor` is what remains after one reference frame (e.g. 0.92 friction).
#[inline]
pub fn per_frame_factor(factor: f32, dt: f32) -> f32 {
    factor.powf(dt * consts::REFERENCE_FPS)
}

/// Charge fraction accumulated after holding for `hold_secs`
#[inline]
pub fn charge_fraction(hold_secs: f32, rate: f32) -> f32 {
    (1.0 - (-rate * hold_secs.max(0.0)).exp()).clamp(0.0, 1.0)
}
