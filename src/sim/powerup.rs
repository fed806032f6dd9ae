//! Power-up timers and the craft's expendable resource

use serde::{Deserialize, Serialize};

use super::entity::PowerupKind;
use crate::tuning::PowerupTuning;

/// Countdown timers (seconds). An effect is active iff its timer is > 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerupTimers {
    pub shield: f32,
    pub slow: f32,
    pub magnet: f32,
}

impl PowerupTimers {
    pub fn shield_active(&self) -> bool {
        self.shield > 0.0
    }

    pub fn slow_active(&self) -> bool {
        self.slow > 0.0
    }

    pub fn magnet_active(&self) -> bool {
        self.magnet > 0.0
    }

    /// Count every timer down, never below zero
    pub fn tick(&mut self, dt: f32) {
        self.shield = (self.shield - dt).max(0.0);
        self.slow = (self.slow - dt).max(0.0);
        self.magnet = (self.magnet - dt).max(0.0);
    }

    /// Start or extend the timer for `kind`, additively up to its cap
    pub fn extend(&mut self, kind: PowerupKind, tuning: &PowerupTuning) {
        let (timer, gain, cap) = match kind {
            PowerupKind::Shield => (&mut self.shield, tuning.shield_gain, tuning.shield_cap),
            PowerupKind::Slow => (&mut self.slow, tuning.slow_gain, tuning.slow_cap),
            PowerupKind::Magnet => (&mut self.magnet, tuning.magnet_gain, tuning.magnet_cap),
        };
        *timer = (*timer + gain).clamp(0.0, cap);
    }

    /// Spend shield time to absorb a hit. Returns false if no shield was up.
    pub fn absorb_hit(&mut self, tuning: &PowerupTuning) -> bool {
        if !self.shield_active() {
            return false;
        }
        self.shield = (self.shield - tuning.shield_hit_cost).max(0.0);
        true
    }

    /// Motion scale applied to the scroll while slow-time is up
    pub fn time_scale(&self, tuning: &PowerupTuning) -> f32 {
        if self.slow_active() {
            tuning.slow_factor
        } else {
            1.0
        }
    }
}

/// Lives (lane sessions) or fuel fraction (dash sessions)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Vitality {
    Lives(u32),
    Fuel(f32),
}

impl Vitality {
    pub fn is_depleted(&self) -> bool {
        match *self {
            Vitality::Lives(lives) => lives == 0,
            Vitality::Fuel(fuel) => fuel <= 0.0,
        }
    }

    /// Apply one unshielded hit
    pub fn take_hit(&mut self, fuel_cost: f32) {
        match self {
            Vitality::Lives(lives) => *lives = lives.saturating_sub(1),
            Vitality::Fuel(fuel) => *fuel = (*fuel - fuel_cost).clamp(0.0, 1.0),
        }
    }

    /// Burn fuel over time (no-op for lives)
    pub fn drain(&mut self, amount: f32) {
        if let Vitality::Fuel(fuel) = self {
            *fuel = (*fuel - amount).clamp(0.0, 1.0);
        }
    }

    pub fn refuel(&mut self, amount: f32) {
        if let Vitality::Fuel(fuel) = self {
            *fuel = (*fuel + amount).clamp(0.0, 1.0);
        }
    }
}
