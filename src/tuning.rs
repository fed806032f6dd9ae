//! Data-driven game balance
//!
//! Every number the simulation uses lives here so a host can override any of
//! them from JSON. Missing fields fall back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading or validating a [`Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Craft handling, hit response and starting resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftTuning {
    pub radius: f32,
    pub collision_buffer: f32,
    pub lane_snap_decay: f32,
    pub trail_length: usize,
    pub trail_fade: f32,
    pub friction: f32,
    pub restitution: f32,
    pub dash_min_impulse: f32,
    pub dash_max_impulse: f32,
    pub dash_charge_rate: f32,
    pub shield_invulnerability: f32,
    pub hit_invulnerability: f32,
    pub starting_lives: u32,
    pub practice_lives: u32,
}

impl Default for CraftTuning {
    fn default() -> Self {
        Self {
            radius: CRAFT_RADIUS,
            collision_buffer: COLLISION_BUFFER,
            lane_snap_decay: LANE_SNAP_DECAY,
            trail_length: TRAIL_LENGTH,
            trail_fade: TRAIL_FADE,
            friction: FRICTION,
            restitution: BOUNCE_RESTITUTION,
            dash_min_impulse: DASH_MIN_IMPULSE,
            dash_max_impulse: DASH_MAX_IMPULSE,
            dash_charge_rate: DASH_CHARGE_RATE,
            shield_invulnerability: SHIELD_INVULNERABILITY,
            hit_invulnerability: HIT_INVULNERABILITY,
            starting_lives: STARTING_LIVES,
            practice_lives: PRACTICE_LIVES,
        }
    }
}

/// Difficulty ramp and the cadences derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub ceiling: f32,
    pub ramp_rate: f32,
    pub demo_seed: f32,
    pub base_speed: f32,
    pub speed_gain: f32,
    pub spawn_interval_base: f32,
    pub spawn_interval_gain: f32,
    pub spawn_interval_min: f32,
    pub extra_spawn_base: f32,
    pub extra_spawn_gain: f32,
    pub extra_spawn_cap: f32,
    pub projectile_interval_base: f32,
    pub projectile_interval_gain: f32,
    pub projectile_interval_min: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            ceiling: DIFFICULTY_CEILING,
            ramp_rate: DIFFICULTY_RAMP,
            demo_seed: DEMO_DIFFICULTY,
            base_speed: BASE_SPEED,
            speed_gain: SPEED_GAIN,
            spawn_interval_base: SPAWN_INTERVAL_BASE,
            spawn_interval_gain: SPAWN_INTERVAL_GAIN,
            spawn_interval_min: SPAWN_INTERVAL_MIN,
            extra_spawn_base: EXTRA_SPAWN_BASE,
            extra_spawn_gain: EXTRA_SPAWN_GAIN,
            extra_spawn_cap: EXTRA_SPAWN_CAP,
            projectile_interval_base: PROJECTILE_INTERVAL_BASE,
            projectile_interval_gain: PROJECTILE_INTERVAL_GAIN,
            projectile_interval_min: PROJECTILE_INTERVAL_MIN,
        }
    }
}

/// Spawn-table shares. The static obstacle takes whatever is left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub primary: f32,
    pub secondary: f32,
    pub shield: f32,
    pub slow: f32,
    pub magnet: f32,
    pub mobile_base: f32,
    pub mobile_growth: f32,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            primary: 0.18,
            secondary: 0.18,
            shield: 0.04,
            slow: 0.03,
            magnet: 0.03,
            mobile_base: 0.20,
            mobile_growth: 0.012,
        }
    }
}

impl SpawnWeights {
    /// Combined share of the difficulty-independent entries
    pub fn fixed_share(&self) -> f32 {
        self.primary + self.secondary + self.shield + self.slow + self.magnet
    }
}

/// Entity sizes, speeds and field margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub weights: SpawnWeights,
    pub entity_radius: f32,
    pub mobile_radius: f32,
    pub mobile_speed_factor: f32,
    pub spawn_offset: f32,
    pub cull_margin: f32,
    pub phase_rate: f32,
    pub projectile_radius: f32,
    pub projectile_speed_factor: f32,
    pub projectile_cull_margin: f32,
    pub projectile_source_top: f32,
    pub projectile_source_bottom: f32,
    pub onboarding_pickups: usize,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            weights: SpawnWeights::default(),
            entity_radius: ENTITY_RADIUS,
            mobile_radius: MOBILE_RADIUS,
            mobile_speed_factor: MOBILE_SPEED_FACTOR,
            spawn_offset: SPAWN_OFFSET,
            cull_margin: CULL_MARGIN,
            phase_rate: PHASE_RATE,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_speed_factor: PROJECTILE_SPEED_FACTOR,
            projectile_cull_margin: PROJECTILE_CULL_MARGIN,
            projectile_source_top: PROJECTILE_SOURCE_TOP,
            projectile_source_bottom: PROJECTILE_SOURCE_BOTTOM,
            onboarding_pickups: 2,
        }
    }
}

/// Combo ladder thresholds and decay timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Hit counts at which the multiplier steps up (ascending)
    pub thresholds: Vec<u32>,
    pub refresh: f32,
    pub cooldown: f32,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            thresholds: COMBO_THRESHOLDS.to_vec(),
            refresh: COMBO_REFRESH,
            cooldown: COMBO_COOLDOWN,
        }
    }
}

/// Base point values (before the combo multiplier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointTable {
    pub primary: u32,
    pub secondary: u32,
    pub shield: u32,
    pub slow: u32,
    pub magnet: u32,
    pub gate: u32,
    pub survival_active: f32,
    pub survival_practice: f32,
}

impl Default for PointTable {
    fn default() -> Self {
        Self {
            primary: POINTS_PRIMARY,
            secondary: POINTS_SECONDARY,
            shield: POINTS_SHIELD,
            slow: POINTS_SLOW,
            magnet: POINTS_MAGNET,
            gate: POINTS_GATE,
            survival_active: SURVIVAL_POINTS_ACTIVE,
            survival_practice: SURVIVAL_POINTS_PRACTICE,
        }
    }
}

/// Power-up durations, caps and effect strengths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupTuning {
    pub shield_gain: f32,
    pub shield_cap: f32,
    pub shield_hit_cost: f32,
    pub slow_gain: f32,
    pub slow_cap: f32,
    pub slow_factor: f32,
    pub magnet_gain: f32,
    pub magnet_cap: f32,
    pub magnet_pull: f32,
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            shield_gain: SHIELD_GAIN,
            shield_cap: SHIELD_CAP,
            shield_hit_cost: SHIELD_HIT_COST,
            slow_gain: SLOW_GAIN,
            slow_cap: SLOW_CAP,
            slow_factor: SLOW_FACTOR,
            magnet_gain: MAGNET_GAIN,
            magnet_cap: MAGNET_CAP,
            magnet_pull: MAGNET_PULL,
        }
    }
}

/// Menu demo autopilot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoTuning {
    pub speed: f32,
    pub invulnerability: f32,
    pub spawn_delay: f32,
    pub projectile_delay: f32,
    pub lane_change_chance: f32,
    pub dash_chance: f32,
    pub dash_charge: f32,
}

impl Default for DemoTuning {
    fn default() -> Self {
        Self {
            speed: DEMO_SPEED,
            invulnerability: DEMO_INVULNERABILITY,
            spawn_delay: DEMO_SPAWN_DELAY,
            projectile_delay: DEMO_PROJECTILE_DELAY,
            lane_change_chance: DEMO_LANE_CHANGE_CHANCE,
            dash_chance: DEMO_DASH_CHANCE,
            dash_charge: DEMO_DASH_CHARGE,
        }
    }
}

/// Fuel economy and gates (dash sessions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelTuning {
    pub drain: f32,
    pub hit_cost: f32,
    pub gate_refuel: f32,
    pub gate_radius: f32,
}

impl Default for FuelTuning {
    fn default() -> Self {
        Self {
            drain: FUEL_DRAIN,
            hit_cost: FUEL_HIT_COST,
            gate_refuel: GATE_REFUEL,
            gate_radius: GATE_RADIUS,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub max_frame_dt: f32,
    pub craft: CraftTuning,
    pub difficulty: DifficultyTuning,
    pub spawn: SpawnTuning,
    pub combo: ComboTuning,
    pub points: PointTable,
    pub powerups: PowerupTuning,
    pub demo: DemoTuning,
    pub fuel: FuelTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_frame_dt: MAX_FRAME_DT,
            craft: CraftTuning::default(),
            difficulty: DifficultyTuning::default(),
            spawn: SpawnTuning::default(),
            combo: ComboTuning::default(),
            points: PointTable::default(),
            powerups: PowerupTuning::default(),
            demo: DemoTuning::default(),
            fuel: FuelTuning::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is negative")))
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        if let Err(err) = tuning.validate() {
            log::warn!("Rejected tuning: {err}");
            return Err(err);
        }
        Ok(tuning)
    }

    /// Load and validate a tuning file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.max_frame_dt <= 0.0 {
            return Err(invalid("max_frame_dt", "must be positive"));
        }

        let craft = &self.craft;
        check_non_negative("craft.radius", craft.radius)?;
        check_non_negative("craft.collision_buffer", craft.collision_buffer)?;
        if !(craft.lane_snap_decay > 0.0 && craft.lane_snap_decay < 1.0) {
            return Err(invalid("craft.lane_snap_decay", "must be inside (0, 1)"));
        }
        check_unit("craft.trail_fade", craft.trail_fade)?;
        check_unit("craft.friction", craft.friction)?;
        check_unit("craft.restitution", craft.restitution)?;
        if craft.dash_min_impulse > craft.dash_max_impulse {
            return Err(invalid(
                "craft.dash_min_impulse",
                "must not exceed dash_max_impulse",
            ));
        }
        check_non_negative("craft.dash_charge_rate", craft.dash_charge_rate)?;
        if craft.starting_lives == 0 {
            return Err(invalid("craft.starting_lives", "must be at least 1"));
        }

        let diff = &self.difficulty;
        check_non_negative("difficulty.ceiling", diff.ceiling)?;
        check_non_negative("difficulty.ramp_rate", diff.ramp_rate)?;
        if diff.demo_seed < 0.0 || diff.demo_seed > diff.ceiling {
            return Err(invalid("difficulty.demo_seed", "must lie within [0, ceiling]"));
        }
        if diff.spawn_interval_min <= 0.0 || diff.spawn_interval_min > diff.spawn_interval_base {
            return Err(invalid(
                "difficulty.spawn_interval_min",
                "must be positive and not exceed spawn_interval_base",
            ));
        }
        if diff.projectile_interval_min <= 0.0
            || diff.projectile_interval_min > diff.projectile_interval_base
        {
            return Err(invalid(
                "difficulty.projectile_interval_min",
                "must be positive and not exceed projectile_interval_base",
            ));
        }
        check_unit("difficulty.extra_spawn_cap", diff.extra_spawn_cap)?;

        let weights = &self.spawn.weights;
        for (field, value) in [
            ("spawn.weights.primary", weights.primary),
            ("spawn.weights.secondary", weights.secondary),
            ("spawn.weights.shield", weights.shield),
            ("spawn.weights.slow", weights.slow),
            ("spawn.weights.magnet", weights.magnet),
            ("spawn.weights.mobile_base", weights.mobile_base),
            ("spawn.weights.mobile_growth", weights.mobile_growth),
        ] {
            check_non_negative(field, value)?;
        }
        if weights.fixed_share() > 1.0 {
            return Err(invalid(
                "spawn.weights",
                format!("fixed shares sum to {} (> 1)", weights.fixed_share()),
            ));
        }
        if self.spawn.projectile_source_top > self.spawn.projectile_source_bottom {
            return Err(invalid(
                "spawn.projectile_source_top",
                "must not be below projectile_source_bottom",
            ));
        }

        if self.combo.thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("combo.thresholds", "must be strictly ascending"));
        }
        check_non_negative("combo.refresh", self.combo.refresh)?;
        check_non_negative("combo.cooldown", self.combo.cooldown)?;

        let p = &self.powerups;
        check_non_negative("powerups.shield_cap", p.shield_cap)?;
        check_non_negative("powerups.slow_cap", p.slow_cap)?;
        check_non_negative("powerups.magnet_cap", p.magnet_cap)?;
        if !(p.slow_factor > 0.0 && p.slow_factor <= 1.0) {
            return Err(invalid("powerups.slow_factor", "must be inside (0, 1]"));
        }
        check_unit("powerups.magnet_pull", p.magnet_pull)?;

        check_non_negative("demo.speed", self.demo.speed)?;
        check_unit("demo.lane_change_chance", self.demo.lane_change_chance)?;
        check_unit("demo.dash_chance", self.demo.dash_chance)?;
        check_unit("demo.dash_charge", self.demo.dash_charge)?;

        check_unit("fuel.hit_cost", self.fuel.hit_cost)?;
        check_unit("fuel.gate_refuel", self.fuel.gate_refuel)?;
        check_non_negative("fuel.drain", self.fuel.drain)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "difficulty": { "ceiling": 20.0 } }"#)
            .expect("partial override should parse");
        assert_eq!(tuning.difficulty.ceiling, 20.0);
        assert_eq!(tuning.difficulty.ramp_rate, DIFFICULTY_RAMP);
        assert_eq!(tuning.points, PointTable::default());
    }

    #[test]
    fn test_rejects_overfull_spawn_table() {
        let json = r#"{ "spawn": { "weights": { "primary": 0.7, "secondary": 0.5 } } }"#;
        match Tuning::from_json(json) {
            Err(TuningError::Invalid { field, .. }) => assert_eq!(field, "spawn.weights"),
            other => panic!("expected invalid spawn weights, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let json = r#"{ "combo": { "thresholds": [3, 3, 12] } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::Invalid {
                field: "combo.thresholds",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io { .. }));
        assert!(err.to_string().contains("not/here.json"));
    }
}
