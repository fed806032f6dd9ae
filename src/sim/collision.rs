//! Collision detection and resolution
//!
//! Everything is a circle. Damage (obstacles, projectiles) is resolved before
//! collection so a shield picked up this frame cannot cancel a hit taken
//! this frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::powerup::Vitality;
use super::score::base_points;
use super::state::{GameEvent, Session, SessionConfig};
use crate::tuning::Tuning;

/// What an obstacle hit did to the craft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Shield time was spent instead of a life
    AbsorbedByShield,
    LifeLost,
    FuelLost,
    /// Damage disabled for this session (menu demo)
    Harmless,
}

/// Circle overlap using squared distances (no square root)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// Resolve all craft overlaps for this frame
///
/// Returns true if the dash gate was cleared (the caller relocates it).
pub fn resolve_collisions(
    session: &mut Session,
    config: &SessionConfig,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    let craft_pos = session.craft.pos;
    let reach = session.craft.radius + tuning.craft.collision_buffer;
    let projectile_reach = reach + tuning.craft.collision_buffer;

    // Pass 1: damage, against the shield state the frame started with
    let obstacle_hits: Vec<usize> = session
        .store
        .entities
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            !e.dead && e.kind.is_obstacle() && circles_overlap(craft_pos, reach, e.pos, e.radius)
        })
        .map(|(i, _)| i)
        .collect();
    let projectile_hits: Vec<usize> = session
        .store
        .projectiles
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.dead && circles_overlap(craft_pos, projectile_reach, p.pos, p.radius))
        .map(|(i, _)| i)
        .collect();

    for i in obstacle_hits {
        if apply_obstacle_hit(session, config, tuning, events).is_some() {
            session.store.entities[i].dead = true;
        }
    }
    for i in projectile_hits {
        if apply_obstacle_hit(session, config, tuning, events).is_some() {
            session.store.projectiles[i].dead = true;
        }
    }

    // Pass 2: collection
    let collected: Vec<usize> = session
        .store
        .entities
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            !e.dead && e.kind.is_collectible() && circles_overlap(craft_pos, reach, e.pos, e.radius)
        })
        .map(|(i, _)| i)
        .collect();
    for i in collected {
        let kind = session.store.entities[i].kind;
        collect(session, kind, config, tuning, events);
        session.store.entities[i].dead = true;
    }

    match session.gate {
        Some(gate) if circles_overlap(craft_pos, reach, gate.pos, gate.radius) => {
            clear_gate(session, config, tuning, events);
            true
        }
        _ => false,
    }
}

/// Apply one obstacle contact. `None` means it was ignored (invulnerable).
fn apply_obstacle_hit(
    session: &mut Session,
    config: &SessionConfig,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> Option<HitOutcome> {
    if session.craft.is_invulnerable() {
        return None;
    }

    let outcome = if !config.kind.damage_enabled() {
        HitOutcome::Harmless
    } else if session.timers.absorb_hit(&tuning.powerups) {
        session
            .craft
            .grant_invulnerability(tuning.craft.shield_invulnerability);
        reset_combo(session, tuning, events);
        HitOutcome::AbsorbedByShield
    } else {
        session.vitality.take_hit(tuning.fuel.hit_cost);
        session.stats.hits_taken += 1;
        session
            .craft
            .grant_invulnerability(tuning.craft.hit_invulnerability);
        reset_combo(session, tuning, events);
        match session.vitality {
            Vitality::Lives(_) => HitOutcome::LifeLost,
            Vitality::Fuel(_) => HitOutcome::FuelLost,
        }
    };

    log::debug!("Obstacle hit: {outcome:?}");
    events.push(GameEvent::ObstacleHit(outcome));
    Some(outcome)
}

/// Award points at the current multiplier, then bump the combo
fn award(
    session: &mut Session,
    base: u32,
    config: &SessionConfig,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    if config.kind.scoring() {
        let multiplier = session.combo.multiplier(&tuning.combo);
        session.score += f64::from(base) * f64::from(multiplier);
    }

    let before = session.combo.multiplier(&tuning.combo);
    session.combo.register_hit(&tuning.combo);
    let after = session.combo.multiplier(&tuning.combo);
    session.stats.record_multiplier(after);
    if after != before {
        events.push(GameEvent::ComboChanged(after));
    }
}

fn collect(
    session: &mut Session,
    kind: EntityKind,
    config: &SessionConfig,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    if let EntityKind::Powerup(powerup) = kind {
        session.timers.extend(powerup, &tuning.powerups);
    }
    session.stats.record_collect(kind);
    events.push(GameEvent::PickupCollected(kind));
    award(session, base_points(kind, &tuning.points), config, tuning, events);
}

fn clear_gate(
    session: &mut Session,
    config: &SessionConfig,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    session.vitality.refuel(tuning.fuel.gate_refuel);
    session.stats.gates += 1;
    events.push(GameEvent::GateCleared);
    award(session, tuning.points.gate, config, tuning, events);
}

fn reset_combo(session: &mut Session, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    let before = session.combo.multiplier(&tuning.combo);
    session.combo.reset();
    if before != 1 {
        events.push(GameEvent::ComboChanged(1));
    }
}
