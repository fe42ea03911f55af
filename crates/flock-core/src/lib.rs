pub mod controller;
pub mod events;
pub mod sim_trait;
pub mod stop;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::Cell;

    use crate::controller::{Controller, Observation};
    use crate::events::{AgentId, GenerationEvent, StopReason};
    use crate::sim_trait::Simulation;
    use crate::stop::{NeverStop, StopSignal};

    /// Always returns the same output.
    #[derive(Debug, Clone, Copy)]
    pub struct ConstantController(pub f32);

    impl Controller for ConstantController {
        fn decide(&self, _observation: &Observation) -> f32 {
            self.0
        }
    }

    /// Replays a fixed list of outputs, then repeats the last one.
    #[derive(Debug)]
    pub struct ScriptedController {
        outputs: Vec<f32>,
        cursor: Cell<usize>,
    }

    impl ScriptedController {
        pub fn new(outputs: Vec<f32>) -> Self {
            Self {
                outputs,
                cursor: Cell::new(0),
            }
        }
    }

    impl Controller for ScriptedController {
        fn decide(&self, _observation: &Observation) -> f32 {
            let i = self.cursor.get();
            self.cursor.set(i + 1);
            self.outputs
                .get(i)
                .or_else(|| self.outputs.last())
                .copied()
                .unwrap_or(0.0)
        }
    }

    /// Jumps whenever the agent sinks below `target_y`, so it hovers around that line.
    #[derive(Debug, Clone, Copy)]
    pub struct HoverController {
        pub target_y: f32,
    }

    impl Controller for HoverController {
        fn decide(&self, observation: &Observation) -> f32 {
            if observation.y > self.target_y {
                1.0
            } else {
                0.0
            }
        }
    }

    /// Fires after being polled `after` times.
    #[derive(Debug)]
    pub struct StopAfter {
        pub after: u64,
        polls: Cell<u64>,
    }

    impl StopAfter {
        pub fn new(after: u64) -> Self {
            Self {
                after,
                polls: Cell::new(0),
            }
        }
    }

    impl StopSignal for StopAfter {
        fn should_stop(&self) -> bool {
            let n = self.polls.get();
            self.polls.set(n + 1);
            n >= self.after
        }
    }

    /// Run N ticks without a stop signal, returning all accumulated events.
    pub fn run_ticks(sim: &mut dyn Simulation, n: usize) -> Vec<GenerationEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.tick(&NeverStop));
        }
        all_events
    }

    /// Tick until the simulation finishes or `max_ticks` elapse.
    pub fn run_to_completion(sim: &mut dyn Simulation, max_ticks: usize) -> Vec<GenerationEvent> {
        let mut all_events = Vec::new();
        for _ in 0..max_ticks {
            if sim.is_done() {
                break;
            }
            all_events.extend(sim.tick(&NeverStop));
        }
        all_events
    }

    /// Agents removed by the given events, in removal order.
    pub fn removed_agents(events: &[GenerationEvent]) -> Vec<AgentId> {
        events
            .iter()
            .filter_map(GenerationEvent::removed_agent)
            .collect()
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================
    // Generic assertions every Simulation implementation must pass. Crates
    // call them from their own tests with a freshly built simulation.

    /// Agent, controller and fitness sequences have equal length after every tick.
    pub fn contract_sequences_stay_aligned(sim: &mut dyn Simulation, max_ticks: usize) {
        for _ in 0..max_ticks {
            if sim.is_done() {
                break;
            }
            sim.tick(&NeverStop);
            let [agents, controllers, fitness] = sim.sequence_lengths();
            assert_eq!(agents, controllers, "agents and controllers out of step");
            assert_eq!(agents, fitness, "agents and fitness slots out of step");
            assert_eq!(agents, sim.alive(), "alive count must match live agents");
        }
    }

    /// Running long enough must end the simulation, and the end is terminal.
    pub fn contract_eventually_completes(sim: &mut dyn Simulation, max_ticks: usize) {
        let events = run_to_completion(sim, max_ticks);
        assert!(
            sim.is_done(),
            "Simulation must complete within {max_ticks} ticks"
        );
        let completions = events
            .iter()
            .filter(|e| matches!(e, GenerationEvent::GenerationComplete { .. }))
            .count();
        assert_eq!(completions, 1, "exactly one completion event");

        let ticks = sim.ticks();
        let score = sim.score();
        assert!(sim.tick(&NeverStop).is_empty(), "tick after done is a no-op");
        assert_eq!(sim.ticks(), ticks);
        assert_eq!(sim.score(), score);
    }

    /// A raised stop signal ends the simulation on the next tick with `Aborted`.
    pub fn contract_stop_signal_aborts(sim: &mut dyn Simulation) {
        let events = sim.tick(&StopAfter::new(0));
        assert_eq!(sim.stop_reason(), Some(StopReason::Aborted));
        assert_eq!(
            events,
            vec![GenerationEvent::GenerationComplete {
                reason: StopReason::Aborted
            }],
            "an aborted tick does no simulation work"
        );
    }

    /// An agent is removed at most once.
    pub fn contract_removed_agents_never_return(sim: &mut dyn Simulation, max_ticks: usize) {
        let events = run_to_completion(sim, max_ticks);
        let mut removed = removed_agents(&events);
        let total = removed.len();
        removed.sort_unstable();
        removed.dedup();
        assert_eq!(removed.len(), total, "agent removed more than once");
    }
}
