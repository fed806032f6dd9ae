//! The player craft
//!
//! Two control schemes share one craft: lane mode snaps between discrete
//! tracks, free mode integrates a velocity with friction and takes dash
//! impulses.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::tuning::CraftTuning;
use crate::{lerp, per_frame_factor};

/// How the craft is being steered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Snapping between lanes
    Lane { lane: usize, target_lane: usize },
    /// Continuous motion with friction
    Free { vel: Vec2 },
}

/// Trail point for craft rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Fades toward 0 as the point ages
    pub alpha: f32,
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub pos: Vec2,
    pub radius: f32,
    pub motion: Motion,
    /// Heading for rendering (radians, -π/2 points up the field)
    pub heading: f32,
    /// Seconds of invulnerability left
    pub invulnerable: f32,
    /// Trail history (oldest first)
    pub trail: Vec<TrailPoint>,
}

const UP: f32 = -std::f32::consts::FRAC_PI_2;
/// Maximum bank angle while sliding between lanes
const MAX_BANK: f32 = 0.35;

impl Craft {
    /// Craft parked in `lane`
    pub fn in_lane(field: &Field, lane: usize, tuning: &CraftTuning) -> Self {
        let lane = lane.min(field.last_lane());
        Self {
            pos: Vec2::new(field.lane_x(lane), field.craft_row()),
            radius: tuning.radius,
            motion: Motion::Lane {
                lane,
                target_lane: lane,
            },
            heading: UP,
            invulnerable: 0.0,
            trail: Vec::with_capacity(tuning.trail_length),
        }
    }

    /// Craft at rest at the field's home position
    pub fn free(field: &Field, tuning: &CraftTuning) -> Self {
        Self {
            pos: field.craft_home(),
            radius: tuning.radius,
            motion: Motion::Free { vel: Vec2::ZERO },
            heading: UP,
            invulnerable: 0.0,
            trail: Vec::with_capacity(tuning.trail_length),
        }
    }

    pub fn velocity(&self) -> Vec2 {
        match self.motion {
            Motion::Free { vel } => vel,
            Motion::Lane { .. } => Vec2::ZERO,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    pub fn grant_invulnerability(&mut self, secs: f32) {
        self.invulnerable = self.invulnerable.max(secs);
    }

    pub fn tick_invulnerability(&mut self, dt: f32) {
        self.invulnerable = (self.invulnerable - dt).max(0.0);
    }

    /// Move the target lane by `delta`, clamped to the field (lane mode only)
    pub fn shift_lane(&mut self, delta: i64, field: &Field) {
        if let Motion::Lane { target_lane, .. } = &mut self.motion {
            *target_lane = field.clamp_lane(*target_lane as i64 + delta);
        }
    }

    /// Jump the target lane to `lane`, clamped to the field (lane mode only)
    pub fn set_target_lane(&mut self, lane: usize, field: &Field) {
        if let Motion::Lane { target_lane, .. } = &mut self.motion {
            *target_lane = lane.min(field.last_lane());
        }
    }

    /// Ease toward the target lane and pin to the craft row
    pub fn update_lane(&mut self, field: &Field, dt: f32, tuning: &CraftTuning) {
        let Motion::Lane { lane, target_lane } = &mut self.motion else {
            return;
        };
        *target_lane = (*target_lane).min(field.last_lane());
        let target_x = field.lane_x(*target_lane);
        let t = 1.0 - per_frame_factor(tuning.lane_snap_decay, dt);
        self.pos.x = lerp(self.pos.x, target_x, t);
        self.pos.y = field.craft_row();

        // Report the lane once we're closer to it than to any other
        let spacing = field.lane_spacing().max(1.0);
        if (self.pos.x - target_x).abs() < spacing * 0.5 {
            *lane = *target_lane;
        }
        let bank = ((target_x - self.pos.x) / spacing).clamp(-1.0, 1.0) * MAX_BANK;
        self.heading = UP + bank;
    }

    /// Friction, integration and bounce against the field edges
    pub fn update_free(&mut self, field: &Field, dt: f32, tuning: &CraftTuning) {
        let Motion::Free { vel } = &mut self.motion else {
            return;
        };
        *vel *= per_frame_factor(tuning.friction, dt);
        self.pos += *vel * dt;

        let min = Vec2::splat(self.radius);
        let max = Vec2::new(field.width - self.radius, field.height - self.radius).max(min);
        if self.pos.x < min.x || self.pos.x > max.x {
            self.pos.x = self.pos.x.clamp(min.x, max.x);
            vel.x = -vel.x * tuning.restitution;
        }
        if self.pos.y < min.y || self.pos.y > max.y {
            self.pos.y = self.pos.y.clamp(min.y, max.y);
            vel.y = -vel.y * tuning.restitution;
        }

        if vel.length_squared() > 1.0 {
            self.heading = vel.y.atan2(vel.x);
        }
    }

    /// Apply a dash impulse toward `target` (free mode only)
    ///
    /// `charge` in `[0, 1]` interpolates between the minimum and maximum
    /// impulse. Returns the impulse actually applied.
    pub fn dash(&mut self, target: Vec2, charge: f32, tuning: &CraftTuning) -> Vec2 {
        let Motion::Free { vel } = &mut self.motion else {
            return Vec2::ZERO;
        };
        let dir = (target - self.pos).normalize_or_zero();
        let magnitude = lerp(
            tuning.dash_min_impulse,
            tuning.dash_max_impulse,
            charge.clamp(0.0, 1.0),
        );
        let impulse = dir * magnitude;
        *vel += impulse;
        impulse
    }

    /// Record current position to trail and fade older points
    pub fn record_trail(&mut self, tuning: &CraftTuning) {
        for point in &mut self.trail {
            point.alpha *= tuning.trail_fade;
        }
        self.trail.push(TrailPoint {
            pos: self.pos + Vec2::new(0.0, self.radius * 0.75),
            alpha: 1.0,
        });
        if self.trail.len() > tuning.trail_length {
            let excess = self.trail.len() - tuning.trail_length;
            self.trail.drain(..excess);
        }
    }
}
