//! Entity kinds and the store that owns live entities
//!
//! Entities are created by the spawner, advanced by the integrator and
//! removed by collision resolution or off-field culling. Removal always
//! happens in the frame an entity is marked dead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::Field;

/// Things that cost a life (or fuel) on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Drifts with the scroll
    Static,
    /// Slightly faster, fires projectiles in lane sessions
    Mobile,
}

/// Plain score collectibles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Primary,
    Secondary,
}

/// Collectibles that start or extend a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Shield,
    Slow,
    Magnet,
}

/// Closed set of spawnable entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Pickup(PickupKind),
    Powerup(PowerupKind),
}

impl EntityKind {
    pub fn is_obstacle(self) -> bool {
        matches!(self, EntityKind::Obstacle(_))
    }

    /// Pickups and power-ups (affected by the magnet, collected on contact)
    pub fn is_collectible(self) -> bool {
        !self.is_obstacle()
    }
}

/// A scrolling entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Lane it was spawned in (lane sessions only)
    pub lane: Option<usize>,
    /// Cosmetic animation phase (radians)
    pub phase: f32,
    #[serde(skip)]
    pub dead: bool,
}

/// An enemy-fired projectile (lane sessions only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub lane: usize,
    /// Seconds since launch
    pub age: f32,
    #[serde(skip)]
    pub dead: bool,
}

/// Dash target (dash sessions only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub pos: Vec2,
    pub radius: f32,
    pub phase: f32,
}

/// Owns every live entity and projectile
#[derive(Debug, Clone)]
pub struct EntityStore {
    pub entities: Vec<Entity>,
    pub projectiles: Vec<Projectile>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Add an entity, returning its ID
    pub fn spawn(
        &mut self,
        kind: EntityKind,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        lane: Option<usize>,
        phase: f32,
    ) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            kind,
            pos,
            vel,
            radius,
            lane,
            phase,
            dead: false,
        });
        id
    }

    /// Add a projectile, returning its ID
    pub fn spawn_projectile(&mut self, pos: Vec2, vel: Vec2, radius: f32, lane: usize) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos,
            vel,
            radius,
            lane,
            age: 0.0,
            dead: false,
        });
        id
    }

    /// Drop dead entities/projectiles and anything past the field margins
    pub fn sweep(&mut self, field: &Field, entity_margin: f32, projectile_margin: f32) {
        self.entities
            .retain(|e| !e.dead && !field.is_outside(e.pos, entity_margin));
        self.projectiles
            .retain(|p| !p.dead && !field.is_outside(p.pos, projectile_margin));
    }

    pub fn live_count(&self) -> usize {
        self.entities.len() + self.projectiles.len()
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}
