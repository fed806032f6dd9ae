//! Entity spawning
//!
//! Spawn selection is data, not branching: an ordered weight table is rebuilt
//! from the current difficulty and sampled once per spawn with a single
//! uniform roll.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::entity::{EntityKind, EntityStore, ObstacleKind, PickupKind, PowerupKind};
use super::field::Field;
use super::state::ControlScheme;
use crate::tuning::{SpawnWeights, Tuning};

/// Ordered cumulative-distribution table of entity kinds
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTable {
    entries: Vec<(EntityKind, f32)>,
}

impl SpawnTable {
    /// Build the table for a difficulty level
    ///
    /// The mobile obstacle share grows with difficulty but never pushes the
    /// total above 1; the static obstacle takes the remainder.
    pub fn for_difficulty(weights: &SpawnWeights, difficulty: f32) -> Self {
        let fixed = weights.fixed_share().min(1.0);
        let mobile = (weights.mobile_base + difficulty.max(0.0) * weights.mobile_growth)
            .clamp(0.0, 1.0 - fixed);
        let remainder = (1.0 - fixed - mobile).max(0.0);
        Self {
            entries: vec![
                (EntityKind::Pickup(PickupKind::Primary), weights.primary),
                (EntityKind::Pickup(PickupKind::Secondary), weights.secondary),
                (EntityKind::Powerup(PowerupKind::Shield), weights.shield),
                (EntityKind::Powerup(PowerupKind::Slow), weights.slow),
                (EntityKind::Powerup(PowerupKind::Magnet), weights.magnet),
                (EntityKind::Obstacle(ObstacleKind::Mobile), mobile),
                (EntityKind::Obstacle(ObstacleKind::Static), remainder),
            ],
        }
    }

    pub fn entries(&self) -> &[(EntityKind, f32)] {
        &self.entries
    }

    /// Sum of all shares (1 for any valid tuning)
    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn share(&self, kind: EntityKind) -> f32 {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, w)| w)
            .sum()
    }

    /// Walk the cumulative distribution with `roll` in `[0, 1)`
    pub fn sample(&self, roll: f32) -> EntityKind {
        let mut acc = 0.0;
        for &(kind, weight) in &self.entries {
            acc += weight;
            if roll < acc {
                return kind;
            }
        }
        EntityKind::Obstacle(ObstacleKind::Static)
    }
}

/// Spawn and projectile countdowns
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub spawn_timer: f32,
    pub projectile_timer: f32,
}

impl Spawner {
    pub fn new(spawn_delay: f32, projectile_delay: f32) -> Self {
        Self {
            spawn_timer: spawn_delay,
            projectile_timer: projectile_delay,
        }
    }

    /// Run both cadences for one frame
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        difficulty: &Difficulty,
        scheme: ControlScheme,
        field: &Field,
        tuning: &Tuning,
        store: &mut EntityStore,
        rng: &mut impl Rng,
    ) {
        let diff = &tuning.difficulty;

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            let table = SpawnTable::for_difficulty(&tuning.spawn.weights, difficulty.level());
            let kind = table.sample(rng.random::<f32>());
            spawn_entity(kind, difficulty, scheme, field, tuning, store, rng);
            if rng.random::<f32>() < difficulty.extra_spawn_chance(diff) {
                let extra = table.sample(rng.random::<f32>());
                spawn_entity(extra, difficulty, scheme, field, tuning, store, rng);
            }
            self.spawn_timer = difficulty.spawn_interval(diff);
        }

        if scheme != ControlScheme::Lanes {
            return;
        }
        self.projectile_timer -= dt;
        if self.projectile_timer <= 0.0 {
            fire_projectile(difficulty, field, tuning, store, rng);
            self.projectile_timer = difficulty.projectile_interval(diff);
        }
    }
}

/// Create one entity of `kind` just above the field
pub fn spawn_entity(
    kind: EntityKind,
    difficulty: &Difficulty,
    scheme: ControlScheme,
    field: &Field,
    tuning: &Tuning,
    store: &mut EntityStore,
    rng: &mut impl Rng,
) -> u32 {
    let spawn = &tuning.spawn;
    let mobile = kind == EntityKind::Obstacle(ObstacleKind::Mobile);
    let radius = if mobile {
        spawn.mobile_radius
    } else {
        spawn.entity_radius
    };

    let (x, lane) = match scheme {
        ControlScheme::Lanes => {
            let lane = rng.random_range(0..field.lane_count.max(1));
            (field.lane_x(lane), Some(lane))
        }
        ControlScheme::Dash => {
            let max_x = (field.width - radius).max(radius);
            let x = if max_x > radius {
                rng.random_range(radius..max_x)
            } else {
                field.width * 0.5
            };
            (x, None)
        }
    };

    let speed_factor = if mobile { spawn.mobile_speed_factor } else { 1.0 };
    let vel = Vec2::new(0.0, difficulty.speed(&tuning.difficulty) * speed_factor);
    let phase = rng.random_range(0.0..std::f32::consts::TAU);
    let id = store.spawn(
        kind,
        Vec2::new(x, -spawn.spawn_offset),
        vel,
        radius,
        lane,
        phase,
    );
    log::debug!("Spawned {kind:?} #{id} at x={x:.0}");
    id
}

/// Launch a projectile from a random eligible mobile obstacle
///
/// Returns `None` (and does nothing) when no source is on the field.
pub fn fire_projectile(
    difficulty: &Difficulty,
    field: &Field,
    tuning: &Tuning,
    store: &mut EntityStore,
    rng: &mut impl Rng,
) -> Option<u32> {
    let spawn = &tuning.spawn;
    let top = field.height * spawn.projectile_source_top;
    let bottom = field.height * spawn.projectile_source_bottom;
    let sources: Vec<(Vec2, usize)> = store
        .entities
        .iter()
        .filter(|e| {
            e.kind == EntityKind::Obstacle(ObstacleKind::Mobile)
                && !e.dead
                && e.pos.y > top
                && e.pos.y < bottom
        })
        .filter_map(|e| e.lane.map(|lane| (e.pos, lane)))
        .collect();

    if sources.is_empty() {
        log::debug!("No projectile source on field, skipping");
        return None;
    }

    let (pos, lane) = sources[rng.random_range(0..sources.len())];
    let vel = Vec2::new(
        0.0,
        difficulty.speed(&tuning.difficulty) * spawn.projectile_speed_factor,
    );
    Some(store.spawn_projectile(pos + Vec2::new(0.0, 10.0), vel, spawn.projectile_radius, lane))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_table_at_zero_difficulty() {
        let table = SpawnTable::for_difficulty(&SpawnWeights::default(), 0.0);
        assert_eq!(table.sample(0.0), EntityKind::Pickup(PickupKind::Primary));
        assert_eq!(table.sample(0.20), EntityKind::Pickup(PickupKind::Secondary));
        assert_eq!(table.sample(0.37), EntityKind::Powerup(PowerupKind::Shield));
        assert_eq!(table.sample(0.41), EntityKind::Powerup(PowerupKind::Slow));
        assert_eq!(table.sample(0.44), EntityKind::Powerup(PowerupKind::Magnet));
        assert_eq!(table.sample(0.50), EntityKind::Obstacle(ObstacleKind::Mobile));
        assert_eq!(table.sample(0.70), EntityKind::Obstacle(ObstacleKind::Static));
        assert_eq!(table.sample(0.999), EntityKind::Obstacle(ObstacleKind::Static));
    }

    #[test]
    fn test_mobile_share_grows_with_difficulty() {
        let weights = SpawnWeights::default();
        let easy = SpawnTable::for_difficulty(&weights, 0.0);
        let hard = SpawnTable::for_difficulty(&weights, 14.0);
        let mobile = EntityKind::Obstacle(ObstacleKind::Mobile);
        assert!((easy.share(mobile) - 0.20).abs() < 1e-6);
        assert!((hard.share(mobile) - 0.368).abs() < 1e-5);
        assert!(hard.share(EntityKind::Obstacle(ObstacleKind::Static)) < 0.20);
    }

    #[test]
    fn test_projectile_needs_a_source() {
        let tuning = Tuning::default();
        let field = Field::new(720.0, 1000.0);
        let difficulty = Difficulty::new(0.0, true, &tuning.difficulty);
        let mut store = EntityStore::new();
        let mut rng = Pcg32::seed_from_u64(7);

        // A static obstacle is not a source
        store.spawn(
            EntityKind::Obstacle(ObstacleKind::Static),
            Vec2::new(100.0, 300.0),
            Vec2::ZERO,
            20.0,
            Some(0),
            0.0,
        );
        assert_eq!(fire_projectile(&difficulty, &field, &tuning, &mut store, &mut rng), None);

        // A mobile obstacle outside the firing band is not a source either
        store.spawn(
            EntityKind::Obstacle(ObstacleKind::Mobile),
            Vec2::new(100.0, 800.0),
            Vec2::ZERO,
            23.0,
            Some(0),
            0.0,
        );
        assert_eq!(fire_projectile(&difficulty, &field, &tuning, &mut store, &mut rng), None);
        assert!(store.projectiles.is_empty());

        store.spawn(
            EntityKind::Obstacle(ObstacleKind::Mobile),
            Vec2::new(360.0, 300.0),
            Vec2::ZERO,
            23.0,
            Some(1),
            0.0,
        );
        assert!(fire_projectile(&difficulty, &field, &tuning, &mut store, &mut rng).is_some());
        let projectile = &store.projectiles[0];
        assert_eq!(projectile.lane, 1);
        assert_eq!(projectile.pos, Vec2::new(360.0, 310.0));
        assert!((projectile.vel.y - 700.0 * 1.35).abs() < 1e-3);
    }

    #[test]
    fn test_lane_spawn_is_in_a_lane() {
        let tuning = Tuning::default();
        let field = Field::new(720.0, 1000.0);
        let difficulty = Difficulty::new(3.0, true, &tuning.difficulty);
        let mut store = EntityStore::new();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            spawn_entity(
                EntityKind::Obstacle(ObstacleKind::Mobile),
                &difficulty,
                ControlScheme::Lanes,
                &field,
                &tuning,
                &mut store,
                &mut rng,
            );
        }
        for e in &store.entities {
            let lane = e.lane.expect("lane spawns carry a lane");
            assert_eq!(e.pos.x, field.lane_x(lane));
            assert_eq!(e.pos.y, -tuning.spawn.spawn_offset);
            assert_eq!(e.radius, tuning.spawn.mobile_radius);
            let expected = difficulty.speed(&tuning.difficulty) * tuning.spawn.mobile_speed_factor;
            assert!((e.vel.y - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_dash_spawn_stays_inside_field() {
        let tuning = Tuning::default();
        let field = Field::new(500.0, 1000.0);
        let difficulty = Difficulty::new(0.0, true, &tuning.difficulty);
        let mut store = EntityStore::new();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            spawn_entity(
                EntityKind::Pickup(PickupKind::Primary),
                &difficulty,
                ControlScheme::Dash,
                &field,
                &tuning,
                &mut store,
                &mut rng,
            );
        }
        assert!(store.entities.iter().all(|e| e.lane.is_none()
            && e.pos.x >= e.radius
            && e.pos.x <= field.width - e.radius));
    }

    #[test]
    fn test_spawner_respects_cadence() {
        let tuning = Tuning::default();
        let field = Field::new(720.0, 1000.0);
        let difficulty = Difficulty::new(0.0, true, &tuning.difficulty);
        let mut store = EntityStore::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut spawner = Spawner::new(0.0, 10.0);

        spawner.update(
            0.01, &difficulty, ControlScheme::Lanes, &field, &tuning, &mut store, &mut rng,
        );
        let first = store.entities.len();
        assert!((1..=2).contains(&first));
        assert!((spawner.spawn_timer - 0.5).abs() < 1e-6);

        // Nothing more until the interval elapses
        spawner.update(
            0.4, &difficulty, ControlScheme::Lanes, &field, &tuning, &mut store, &mut rng,
        );
        assert_eq!(store.entities.len(), first);
    }

    proptest! {
        #[test]
        fn prop_table_sums_to_one(level in 0.0f32..=14.0) {
            let table = SpawnTable::for_difficulty(&SpawnWeights::default(), level);
            prop_assert!((table.total() - 1.0).abs() < 1e-5);
            prop_assert!(table.entries().iter().all(|(_, w)| *w >= 0.0));
        }

        #[test]
        fn prop_table_sums_to_one_for_any_growth(
            level in 0.0f32..100.0,
            growth in 0.0f32..0.5,
        ) {
            let weights = SpawnWeights { mobile_growth: growth, ..SpawnWeights::default() };
            let table = SpawnTable::for_difficulty(&weights, level);
            prop_assert!((table.total() - 1.0).abs() < 1e-5);
        }

        #[test]
        fn prop_sample_is_total(roll in 0.0f32..1.0, level in 0.0f32..14.0) {
            let table = SpawnTable::for_difficulty(&SpawnWeights::default(), level);
            let kind = table.sample(roll);
            prop_assert!(table.share(kind) > 0.0);
        }
    }
}
