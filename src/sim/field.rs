//! Playfield geometry supplied by the layout collaborator

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Playfield size and lane layout (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub lane_count: usize,
    /// Horizontal padding on each side, as a fraction of width
    pub lane_padding: f32,
    /// Vertical position of the craft, as a fraction of height
    pub craft_y: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self::new(720.0, 1280.0)
    }
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            lane_count: LANE_COUNT,
            lane_padding: LANE_PADDING_FRACTION,
            craft_y: CRAFT_Y_FRACTION,
        }
    }

    /// Highest valid lane index
    pub fn last_lane(&self) -> usize {
        self.lane_count.max(1) - 1
    }

    /// Clamp a (possibly out of range) lane index
    pub fn clamp_lane(&self, lane: i64) -> usize {
        lane.clamp(0, self.last_lane() as i64) as usize
    }

    /// Horizontal center of a lane
    pub fn lane_x(&self, lane: usize) -> f32 {
        let lane = lane.min(self.last_lane());
        if self.lane_count <= 1 {
            return self.width * 0.5;
        }
        let pad = self.width * self.lane_padding;
        let usable = self.width - pad * 2.0;
        pad + usable / (self.lane_count - 1) as f32 * lane as f32
    }

    /// Distance between adjacent lanes
    pub fn lane_spacing(&self) -> f32 {
        if self.lane_count <= 1 {
            self.width
        } else {
            self.width * (1.0 - 2.0 * self.lane_padding) / (self.lane_count - 1) as f32
        }
    }

    /// Fixed vertical position of the craft in lane mode
    pub fn craft_row(&self) -> f32 {
        self.height * self.craft_y
    }

    /// Craft spawn point
    pub fn craft_home(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.craft_row())
    }

    /// True if `pos` is further than `margin` outside the field
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.y > self.height + margin
            || pos.y < -margin * 2.0
            || pos.x < -margin
            || pos.x > self.width + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_layout_is_symmetric() {
        let field = Field::new(1000.0, 800.0);
        assert!((field.lane_x(0) - 180.0).abs() < 1e-3);
        assert!((field.lane_x(1) - 500.0).abs() < 1e-3);
        assert!((field.lane_x(2) - 820.0).abs() < 1e-3);
        assert!((field.lane_spacing() - 320.0).abs() < 1e-3);
    }

    #[test]
    fn test_lane_indices_clamp() {
        let field = Field::new(1000.0, 800.0);
        assert_eq!(field.clamp_lane(-3), 0);
        assert_eq!(field.clamp_lane(7), 2);
        assert_eq!(field.lane_x(9), field.lane_x(2));
    }

    #[test]
    fn test_outside_uses_margin() {
        let field = Field::new(400.0, 600.0);
        assert!(!field.is_outside(Vec2::new(200.0, 650.0), 140.0));
        assert!(field.is_outside(Vec2::new(200.0, 741.0), 140.0));
        // Freshly spawned entities above the field are still inside
        assert!(!field.is_outside(Vec2::new(200.0, -70.0), 140.0));
    }
}
