use serde::{Deserialize, Serialize};

use crate::config::FloorConfig;

/// Two floor tiles leapfrogging each other. Purely cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Floor {
    pub x1: f32,
    pub x2: f32,
}

impl Floor {
    pub fn new(config: &FloorConfig) -> Self {
        Self {
            x1: 0.0,
            x2: config.width,
        }
    }

    pub fn advance(&mut self, config: &FloorConfig) {
        self.x1 -= config.velocity;
        self.x2 -= config.velocity;

        if self.x1 + config.width < 0.0 {
            self.x1 = self.x2 + config.width;
        }
        if self.x2 + config.width < 0.0 {
            self.x2 = self.x1 + config.width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_stay_adjacent() {
        let cfg = FloorConfig::default();
        let mut floor = Floor::new(&cfg);
        for _ in 0..1000 {
            floor.advance(&cfg);
            let gap = (floor.x1 - floor.x2).abs();
            assert!((gap - cfg.width).abs() < 1e-3, "tiles drifted apart: {gap}");
            assert!(floor.x1.min(floor.x2) + cfg.width >= -cfg.velocity);
        }
    }

    #[test]
    fn first_tile_wraps_behind_second() {
        let cfg = FloorConfig {
            width: 10.0,
            velocity: 5.0,
        };
        let mut floor = Floor::new(&cfg);
        floor.advance(&cfg);
        floor.advance(&cfg);
        assert_eq!((floor.x1, floor.x2), (-10.0, 0.0));
        floor.advance(&cfg);
        assert_eq!((floor.x1, floor.x2), (5.0, -5.0));
    }
}
