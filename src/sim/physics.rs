//! Movement integration for the craft and everything on the field

use super::craft::{Craft, Motion};
use super::entity::EntityStore;
use super::field::Field;
use crate::tuning::Tuning;

/// Move the craft for one frame according to its control scheme
pub fn integrate_craft(craft: &mut Craft, field: &Field, dt: f32, tuning: &Tuning) {
    match craft.motion {
        Motion::Lane { .. } => craft.update_lane(field, dt, &tuning.craft),
        Motion::Free { .. } => craft.update_free(field, dt, &tuning.craft),
    }
    craft.record_trail(&tuning.craft);
}

/// Advance entities and projectiles
///
/// `time_scale` slows the scroll (slow-time); cosmetic phases run at full rate.
pub fn integrate_entities(store: &mut EntityStore, dt: f32, time_scale: f32, tuning: &Tuning) {
    let step = dt * time_scale;
    for entity in &mut store.entities {
        entity.phase = (entity.phase + dt * tuning.spawn.phase_rate) % std::f32::consts::TAU;
        entity.pos += entity.vel * step;
    }
    for projectile in &mut store.projectiles {
        projectile.age += dt;
        projectile.pos += projectile.vel * step;
    }
}

/// Pull every collectible a fixed fraction of the way toward the craft
pub fn apply_magnet(store: &mut EntityStore, craft: &Craft, pull: f32) {
    for entity in store
        .entities
        .iter_mut()
        .filter(|e| !e.dead && e.kind.is_collectible())
    {
        entity.pos = entity.pos.lerp(craft.pos, pull);
    }
}
