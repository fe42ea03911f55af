use serde::Serialize;

use flock_core::events::StopReason;
use flock_sim::GenerationReport;
use flock_sim::scoring::FitnessSummary;

/// Per-generation line of the run log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best: f32,
    pub mean: f32,
    pub stdev: f32,
    pub score: u32,
    pub ticks: u64,
    pub seconds: f32,
    pub reason: StopReason,
}

impl GenerationStats {
    pub fn new(report: &GenerationReport, fitness: &[f32], seconds: f32) -> Self {
        let summary = FitnessSummary::from_scores(fitness).unwrap_or(FitnessSummary {
            best: 0.0,
            worst: 0.0,
            mean: 0.0,
            stdev: 0.0,
        });
        Self {
            generation: report.generation,
            best: summary.best,
            mean: summary.mean,
            stdev: summary.stdev,
            score: report.score,
            ticks: report.ticks,
            seconds,
            reason: report.reason,
        }
    }
}

/// Totals printed when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub generations: u32,
    pub best_fitness: Option<f32>,
    pub best_generation: Option<u32>,
    pub best_score: u32,
    pub aborted: bool,
}

impl RunSummary {
    pub fn record(&mut self, stats: &GenerationStats) {
        self.generations += 1;
        if self.best_fitness.is_none_or(|best| stats.best > best) {
            self.best_fitness = Some(stats.best);
            self.best_generation = Some(stats.generation);
        }
        self.best_score = self.best_score.max(stats.score);
        self.aborted |= stats.reason == StopReason::Aborted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(generation: u32, score: u32, reason: StopReason) -> GenerationReport {
        GenerationReport {
            generation,
            population: 3,
            ticks: 90,
            score,
            survivors: 0,
            reason,
        }
    }

    #[test]
    fn stats_from_report() {
        let stats = GenerationStats::new(&report(2, 1, StopReason::Extinct), &[1.0, 2.0, 6.0], 3.0);
        assert_eq!(stats.best, 6.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.score, 1);
        assert_eq!(stats.seconds, 3.0);
    }

    #[test]
    fn empty_population_reports_zeros() {
        let stats = GenerationStats::new(&report(0, 0, StopReason::Extinct), &[], 0.0);
        assert_eq!(stats.best, 0.0);
        assert_eq!(stats.stdev, 0.0);
    }

    #[test]
    fn summary_tracks_best() {
        let mut summary = RunSummary::default();
        summary.record(&GenerationStats::new(&report(0, 0, StopReason::Extinct), &[2.0], 1.0));
        summary.record(&GenerationStats::new(&report(1, 3, StopReason::Extinct), &[9.0], 1.0));
        summary.record(&GenerationStats::new(&report(2, 1, StopReason::Aborted), &[4.0], 1.0));
        assert_eq!(summary.generations, 3);
        assert_eq!(summary.best_fitness, Some(9.0));
        assert_eq!(summary.best_generation, Some(1));
        assert_eq!(summary.best_score, 3);
        assert!(summary.aborted);
    }

    #[test]
    fn summary_serializes_to_json() {
        let value = serde_json::to_value(RunSummary::default()).unwrap();
        assert_eq!(value["generations"], 0);
        assert!(value["best_fitness"].is_null());
    }
}
