//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, tuning and input
//! sequence the simulation produces the same frames:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod craft;
pub mod difficulty;
pub mod entity;
pub mod field;
pub mod physics;
pub mod powerup;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::{FrameClock, clamp_frame_dt};
pub use collision::{HitOutcome, circles_overlap};
pub use craft::{Craft, Motion, TrailPoint};
pub use difficulty::Difficulty;
pub use entity::{
    Entity, EntityKind, EntityStore, Gate, ObstacleKind, PickupKind, PowerupKind, Projectile,
};
pub use field::Field;
pub use powerup::{PowerupTimers, Vitality};
pub use score::{ComboState, RunStats};
pub use spawn::{SpawnTable, Spawner};
pub use state::{
    ControlScheme, GameEvent, GameMode, GameState, ModeChoice, Session, SessionConfig, SessionKind,
    Snapshot,
};
pub use tick::{InputEvent, TickInput, tick};
