//! Combo ladder, point values and run statistics

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, PickupKind, PowerupKind};
use crate::tuning::{ComboTuning, PointTable};

/// Multiplier for a consecutive-hit count: 1 plus the number of thresholds reached
pub fn multiplier_for_hits(hits: u32, thresholds: &[u32]) -> u32 {
    1 + thresholds.iter().filter(|&&t| hits >= t).count() as u32
}

/// Base points for collecting `kind` (obstacles are worth nothing)
pub fn base_points(kind: EntityKind, points: &PointTable) -> u32 {
    match kind {
        EntityKind::Pickup(PickupKind::Primary) => points.primary,
        EntityKind::Pickup(PickupKind::Secondary) => points.secondary,
        EntityKind::Powerup(PowerupKind::Shield) => points.shield,
        EntityKind::Powerup(PowerupKind::Slow) => points.slow,
        EntityKind::Powerup(PowerupKind::Magnet) => points.magnet,
        EntityKind::Obstacle(_) => 0,
    }
}

/// Decaying consecutive-hit counter
///
/// The multiplier is never stored; it is always derived from `hits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    hits: u32,
    timer: f32,
}

impl ComboState {
    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn multiplier(&self, tuning: &ComboTuning) -> u32 {
        multiplier_for_hits(self.hits, &tuning.thresholds)
    }

    /// Register a successful collection
    pub fn register_hit(&mut self, tuning: &ComboTuning) {
        self.hits = self.hits.saturating_add(1);
        self.timer = tuning.refresh;
    }

    /// Drop the combo entirely (obstacle hit)
    pub fn reset(&mut self) {
        self.hits = 0;
        self.timer = 0.0;
    }

    /// Count down and shed one hit when the timer runs out
    pub fn decay(&mut self, dt: f32, tuning: &ComboTuning) {
        if self.hits == 0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.hits -= 1;
            self.timer = if self.hits > 0 { tuning.cooldown } else { 0.0 };
        }
    }
}

/// Per-run tallies reported when a run ends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    pub primary: u32,
    pub secondary: u32,
    pub powerups: u32,
    pub gates: u32,
    pub hits_taken: u32,
    pub best_multiplier: u32,
    /// Seconds of unpaused play
    pub elapsed: f32,
}

impl RunStats {
    /// Tally a collected entity
    pub fn record_collect(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Pickup(PickupKind::Primary) => self.primary += 1,
            EntityKind::Pickup(PickupKind::Secondary) => self.secondary += 1,
            EntityKind::Powerup(_) => self.powerups += 1,
            EntityKind::Obstacle(_) => {}
        }
    }

    pub fn record_multiplier(&mut self, multiplier: u32) {
        self.best_multiplier = self.best_multiplier.max(multiplier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::ObstacleKind;
    use proptest::prelude::*;

    fn expected_ladder(h: u32) -> u32 {
        match h {
            0..=2 => 1,
            3..=6 => 2,
            7..=11 => 3,
            12..=17 => 4,
            _ => 5,
        }
    }

    #[test]
    fn test_third_collection_reaches_x2() {
        let tuning = ComboTuning::default();
        let mut combo = ComboState::default();
        combo.register_hit(&tuning);
        combo.decay(0.5, &tuning);
        combo.register_hit(&tuning);
        combo.decay(0.5, &tuning);
        assert_eq!(combo.multiplier(&tuning), 1);
        combo.register_hit(&tuning);
        assert_eq!(combo.multiplier(&tuning), 2);
    }

    #[test]
    fn test_decay_steps_one_hit_at_a_time() {
        let tuning = ComboTuning::default();
        let mut combo = ComboState::default();
        for _ in 0..8 {
            combo.register_hit(&tuning);
        }
        assert_eq!(combo.multiplier(&tuning), 3);

        // Refresh window runs out: exactly one hit is shed
        combo.decay(1.8, &tuning);
        assert_eq!(combo.hits(), 7);
        assert_eq!(combo.multiplier(&tuning), 3);

        // Then one more per cooldown
        combo.decay(0.35, &tuning);
        assert_eq!(combo.hits(), 6);
        assert_eq!(combo.multiplier(&tuning), 2);
        combo.decay(0.1, &tuning);
        assert_eq!(combo.hits(), 6);
    }

    #[test]
    fn test_decay_bottoms_out() {
        let tuning = ComboTuning::default();
        let mut combo = ComboState::default();
        combo.register_hit(&tuning);
        for _ in 0..100 {
            combo.decay(0.5, &tuning);
        }
        assert_eq!(combo.hits(), 0);
        assert_eq!(combo.multiplier(&tuning), 1);
    }

    #[test]
    fn test_reset_drops_multiplier() {
        let tuning = ComboTuning::default();
        let mut combo = ComboState::default();
        for _ in 0..20 {
            combo.register_hit(&tuning);
        }
        assert_eq!(combo.multiplier(&tuning), 5);
        combo.reset();
        assert_eq!(combo.multiplier(&tuning), 1);
    }

    #[test]
    fn test_base_points() {
        let points = PointTable::default();
        assert_eq!(base_points(EntityKind::Pickup(PickupKind::Primary), &points), 160);
        assert_eq!(base_points(EntityKind::Pickup(PickupKind::Secondary), &points), 120);
        assert_eq!(base_points(EntityKind::Powerup(PowerupKind::Shield), &points), 80);
        assert_eq!(base_points(EntityKind::Obstacle(ObstacleKind::Static), &points), 0);
    }

    proptest! {
        #[test]
        fn prop_ladder_matches_table(h in 0u32..1000) {
            let tuning = ComboTuning::default();
            prop_assert_eq!(multiplier_for_hits(h, &tuning.thresholds), expected_ladder(h));
        }

        #[test]
        fn prop_multiplier_tracks_hits(ops in prop::collection::vec(0u8..3, 0..200)) {
            let tuning = ComboTuning::default();
            let mut combo = ComboState::default();
            for op in ops {
                match op {
                    0 => combo.register_hit(&tuning),
                    1 => combo.decay(0.4, &tuning),
                    _ => combo.reset(),
                }
                prop_assert_eq!(combo.multiplier(&tuning), expected_ladder(combo.hits()));
            }
        }
    }
}
