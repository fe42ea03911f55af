use serde::{Deserialize, Serialize};

use crate::config::FitnessConfig;

/// Reward for surviving one more tick.
pub fn reward_survival(fitness: &mut f32, config: &FitnessConfig) {
    *fitness += config.survival_reward;
}

/// Penalty for hitting an obstacle.
pub fn penalize_collision(fitness: &mut f32, config: &FitnessConfig) {
    *fitness -= config.collision_penalty;
}

/// Bonus for being alive when an obstacle is passed.
pub fn reward_pass(fitness: &mut f32, config: &FitnessConfig) {
    *fitness += config.pass_bonus;
}

/// Fitness expected for an agent that survived `ticks` ticks, saw `passed`
/// obstacles passed and never crashed.
pub fn expected_fitness(ticks: u64, passed: u32, config: &FitnessConfig) -> f32 {
    config.survival_reward * ticks as f32 + config.pass_bonus * passed as f32
}

/// Population-level summary of one generation's fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub best: f32,
    pub worst: f32,
    pub mean: f32,
    pub stdev: f32,
}

impl FitnessSummary {
    /// `None` for an empty population.
    pub fn from_scores(scores: &[f32]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f32;
        let best = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let worst = scores.iter().copied().fold(f32::INFINITY, f32::min);
        let mean = scores.iter().sum::<f32>() / n;
        let variance = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f32>() / n;
        Some(Self {
            best,
            worst,
            mean,
            stdev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_pass_and_crash() {
        let cfg = FitnessConfig::default();
        let mut f = 0.0;
        reward_survival(&mut f, &cfg);
        reward_pass(&mut f, &cfg);
        penalize_collision(&mut f, &cfg);
        assert!((f - 4.1).abs() < 1e-5);
    }

    #[test]
    fn expected_matches_accumulation() {
        let cfg = FitnessConfig::default();
        let mut f = 0.0;
        for _ in 0..40 {
            reward_survival(&mut f, &cfg);
        }
        reward_pass(&mut f, &cfg);
        assert!((f - expected_fitness(40, 1, &cfg)).abs() < 1e-4);
    }

    #[test]
    fn summary_of_empty_is_none() {
        assert_eq!(FitnessSummary::from_scores(&[]), None);
    }

    #[test]
    fn summary_values() {
        let s = FitnessSummary::from_scores(&[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_eq!(s.best, 7.0);
        assert_eq!(s.worst, 1.0);
        assert_eq!(s.mean, 4.0);
        assert!((s.stdev - 5.0f32.sqrt()).abs() < 1e-6);
    }
}
