use serde::{Deserialize, Serialize};

/// Number of values in an [`Observation`].
pub const OBSERVATION_LEN: usize = 3;

/// Everything a controller is allowed to see about the world for one tick.
///
/// Deliberately minimal: no horizontal distance, no velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// The agent's own vertical position.
    pub y: f32,
    /// Absolute vertical distance to the lower edge of the active obstacle's top piece.
    pub gap_top_distance: f32,
    /// Absolute vertical distance to the upper edge of the active obstacle's bottom piece.
    pub gap_bottom_distance: f32,
}

impl Observation {
    pub fn new(y: f32, gap_top_distance: f32, gap_bottom_distance: f32) -> Self {
        Self {
            y,
            gap_top_distance,
            gap_bottom_distance,
        }
    }

    /// Values in the fixed input order `(y, gap_top_distance, gap_bottom_distance)`.
    pub fn as_array(&self) -> [f32; OBSERVATION_LEN] {
        [self.y, self.gap_top_distance, self.gap_bottom_distance]
    }
}

/// Decision policy driving one agent.
///
/// Implemented by evolved networks, scripted test stubs, or a human-input
/// adapter. The simulation only ever queries it; it never mutates it.
pub trait Controller {
    /// Produce the scalar action for this tick. Values above the configured
    /// jump threshold request a jump; anything else (including NaN) does not.
    fn decide(&self, observation: &Observation) -> f32;
}

impl<T: Controller + ?Sized> Controller for &T {
    fn decide(&self, observation: &Observation) -> f32 {
        (**self).decide(observation)
    }
}

impl<T: Controller + ?Sized> Controller for Box<T> {
    fn decide(&self, observation: &Observation) -> f32 {
        (**self).decide(observation)
    }
}

/// Adapts a plain closure into a [`Controller`].
pub struct FnController<F>(pub F);

impl<F> Controller for FnController<F>
where
    F: Fn(&Observation) -> f32,
{
    fn decide(&self, observation: &Observation) -> f32 {
        (self.0)(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Controller for Doubler {
        fn decide(&self, observation: &Observation) -> f32 {
            observation.y * 2.0
        }
    }

    #[test]
    fn observation_array_order() {
        let obs = Observation::new(1.0, 2.0, 3.0);
        assert_eq!(obs.as_array(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn reference_and_box_forward_to_inner() {
        let obs = Observation::new(4.0, 0.0, 0.0);
        let boxed: Box<dyn Controller> = Box::new(Doubler);
        assert_eq!(boxed.decide(&obs), 8.0);
        assert_eq!((&Doubler).decide(&obs), 8.0);
    }

    #[test]
    fn closure_controller() {
        let c = FnController(|o: &Observation| o.gap_bottom_distance - o.gap_top_distance);
        assert_eq!(c.decide(&Observation::new(0.0, 1.0, 5.0)), 4.0);
    }
}
