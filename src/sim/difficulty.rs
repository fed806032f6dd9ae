//! Difficulty scheduling
//!
//! A single monotonic scalar drives scroll speed, spawn cadence and the
//! obstacle share of the spawn table.

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;

/// Difficulty scalar in `[0, ceiling]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    level: f32,
    /// Whether the ramp is running (menu demo holds its seed)
    ramps: bool,
    /// Fixed scroll speed overriding the ramp (menu demo)
    pinned_speed: Option<f32>,
}

impl Difficulty {
    pub fn new(seed: f32, ramps: bool, tuning: &DifficultyTuning) -> Self {
        Self {
            level: seed.clamp(0.0, tuning.ceiling),
            ramps,
            pinned_speed: None,
        }
    }

    /// Scroll at `speed` regardless of level
    pub fn with_pinned_speed(mut self, speed: f32) -> Self {
        self.pinned_speed = Some(speed.max(0.0));
        self
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Advance by one frame of active (unpaused) time
    pub fn advance(&mut self, dt: f32, tuning: &DifficultyTuning) {
        if !self.ramps {
            return;
        }
        let next = self.level + dt.max(0.0) * tuning.ramp_rate;
        self.level = next.min(tuning.ceiling).max(self.level);
    }

    /// Scroll speed before power-up effects (px/s)
    pub fn speed(&self, tuning: &DifficultyTuning) -> f32 {
        self.pinned_speed
            .unwrap_or(tuning.base_speed + self.level * tuning.speed_gain)
    }

    /// Seconds between spawn ticks
    pub fn spawn_interval(&self, tuning: &DifficultyTuning) -> f32 {
        (tuning.spawn_interval_base - self.level * tuning.spawn_interval_gain)
            .clamp(tuning.spawn_interval_min, tuning.spawn_interval_base)
    }

    /// Seconds between projectile ticks (lane sessions)
    pub fn projectile_interval(&self, tuning: &DifficultyTuning) -> f32 {
        (tuning.projectile_interval_base - self.level * tuning.projectile_interval_gain).clamp(
            tuning.projectile_interval_min,
            tuning.projectile_interval_base,
        )
    }

    /// Probability of a second spawn in the same tick
    pub fn extra_spawn_chance(&self, tuning: &DifficultyTuning) -> f32 {
        (tuning.extra_spawn_base + self.level * tuning.extra_spawn_gain)
            .min(tuning.extra_spawn_cap)
    }
}
