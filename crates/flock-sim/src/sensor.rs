use flock_core::controller::Observation;

use crate::config::ObstacleConfig;
use crate::obstacle::Obstacle;
use crate::physics::Agent;

/// Index of the obstacle every agent senses this tick.
///
/// The nearest obstacle, until `tracked_x` is past its right edge; from then on
/// the next one, so controllers see the upcoming gap rather than the one they
/// are already flying through. `None` only when no obstacle exists.
pub fn active_obstacle_index(
    obstacles: &[Obstacle],
    tracked_x: f32,
    config: &ObstacleConfig,
) -> Option<usize> {
    let first = obstacles.first()?;
    if obstacles.len() > 1 && tracked_x > first.right_edge(config) {
        Some(1)
    } else {
        Some(0)
    }
}

/// Observation vector for one agent against the active obstacle.
pub fn observe(agent: &Agent, active: &Obstacle) -> Observation {
    Observation::new(
        agent.y,
        (agent.y - active.gap_center).abs(),
        (agent.y - active.bottom).abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacles(xs: &[f32]) -> Vec<Obstacle> {
        let cfg = ObstacleConfig::default();
        xs.iter()
            .map(|&x| Obstacle::with_gap_center(x, 200.0, &cfg))
            .collect()
    }

    #[test]
    fn no_obstacles_no_index() {
        assert_eq!(
            active_obstacle_index(&[], 230.0, &ObstacleConfig::default()),
            None
        );
    }

    #[test]
    fn single_obstacle_always_first() {
        let obs = obstacles(&[0.0]);
        assert_eq!(
            active_obstacle_index(&obs, 230.0, &ObstacleConfig::default()),
            Some(0)
        );
    }

    #[test]
    fn switches_only_strictly_past_right_edge() {
        let cfg = ObstacleConfig::default();
        // First obstacle's right edge at 126 + 104 = 230.
        let mut obs = obstacles(&[126.0, 500.0]);
        assert_eq!(active_obstacle_index(&obs, 230.0, &cfg), Some(0));
        obs[0].advance(&cfg);
        assert_eq!(active_obstacle_index(&obs, 230.0, &cfg), Some(1));
    }

    #[test]
    fn observation_uses_gap_edges() {
        let cfg = ObstacleConfig::default();
        let agent = Agent::new(0, 230.0, 350.0);
        let o = Obstacle::with_gap_center(400.0, 300.0, &cfg);
        let obs = observe(&agent, &o);
        assert_eq!(obs.as_array(), [350.0, 50.0, 150.0]);
    }
}
