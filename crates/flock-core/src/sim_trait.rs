use crate::events::{GenerationEvent, StopReason};
use crate::stop::StopSignal;

/// Tick-driven evaluation of a population, as seen by a driver loop or a
/// presentation layer.
pub trait Simulation {
    /// Advance by exactly one fixed tick. A finished simulation returns no events.
    fn tick(&mut self, stop: &dyn StopSignal) -> Vec<GenerationEvent>;

    /// Whether the simulation reached its terminal state.
    fn is_done(&self) -> bool {
        self.stop_reason().is_some()
    }

    /// Why the simulation finished, `None` while it is still running.
    fn stop_reason(&self) -> Option<StopReason>;

    /// Ticks simulated so far.
    fn ticks(&self) -> u64;

    /// Obstacles passed by the surviving population.
    fn score(&self) -> u32;

    /// Live agent count.
    fn alive(&self) -> usize;

    /// Lengths of the live agent, controller and fitness sequences, in that order.
    fn sequence_lengths(&self) -> [usize; 3];
}
