pub mod collision;
pub mod config;
pub mod floor;
pub mod mask;
pub mod obstacle;
pub mod physics;
pub mod scoring;
pub mod sensor;
pub mod snapshot;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use flock_core::controller::Controller;
use flock_core::events::{GenerationEvent, StopReason};
use flock_core::sim_trait::Simulation;
use flock_core::stop::StopSignal;

use config::{ConfigError, SimConfig};
use floor::Floor;
use mask::SpriteSet;
use obstacle::Obstacle;
use physics::Agent;
use snapshot::{AgentView, FrameSnapshot, ObstacleView};

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Config(ConfigError),
    /// Every controller needs exactly one fitness accumulator.
    MismatchedPopulation { controllers: usize, fitness: usize },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid config: {e}"),
            Self::MismatchedPopulation {
                controllers,
                fitness,
            } => write!(
                f,
                "{controllers} controllers but {fitness} fitness accumulators"
            ),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::MismatchedPopulation { .. } => None,
        }
    }
}

impl From<ConfigError> for EvalError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Outcome of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub population: usize,
    pub ticks: u64,
    pub score: u32,
    pub survivors: usize,
    pub reason: StopReason,
}

/// Whether a controller output requests a jump. Non-finite output never does.
pub fn wants_jump(output: f32, threshold: f32) -> bool {
    output.is_finite() && output > threshold
}

/// One evaluation pass over a population.
///
/// Holds three index-aligned live sequences (agents, their controllers, their
/// caller-owned fitness accumulators) plus the obstacle field. Removal always
/// drops the same index from all three at once.
pub struct Generation<'a, C> {
    config: SimConfig,
    sprites: SpriteSet,
    number: u32,
    population: usize,
    agents: Vec<Agent>,
    controllers: Vec<&'a C>,
    fitness: Vec<&'a mut f32>,
    obstacles: Vec<Obstacle>,
    floor: Floor,
    rng: StdRng,
    tick: u64,
    score: u32,
    finished: Option<StopReason>,
}

impl<'a, C: Controller> Generation<'a, C> {
    /// Spawn one agent per controller at the shared start position, with one
    /// obstacle already scrolling in. Fitness accumulators are only ever
    /// added to or subtracted from.
    pub fn new(
        config: &SimConfig,
        controllers: &'a [C],
        fitness: &'a mut [f32],
    ) -> Result<Self, EvalError> {
        config.validate()?;
        if controllers.len() != fitness.len() {
            return Err(EvalError::MismatchedPopulation {
                controllers: controllers.len(),
                fitness: fitness.len(),
            });
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let agents = (0..controllers.len())
            .map(|id| Agent::new(id, config.agent.start_x, config.agent.start_y))
            .collect();
        let first = Obstacle::new(config.obstacles.first_spawn_x, &mut rng, &config.obstacles);

        Ok(Self {
            config: config.clone(),
            sprites: SpriteSet::from_config(config),
            number: 0,
            population: controllers.len(),
            agents,
            controllers: controllers.iter().collect(),
            fitness: fitness.iter_mut().collect(),
            obstacles: vec![first],
            floor: Floor::new(&config.floor),
            rng,
            tick: 0,
            score: 0,
            finished: None,
        })
    }

    /// Collide against these silhouettes instead of the procedural defaults.
    pub fn with_sprites(mut self, sprites: SpriteSet) -> Self {
        self.sprites = sprites;
        self
    }

    /// Label used in logs, snapshots and the report.
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Horizontal position of the reference agent: the first live one.
    fn tracked_x(&self) -> Option<f32> {
        self.agents.first().map(Agent::x)
    }

    /// Obstacle index the next tick's observations will use.
    pub fn active_obstacle(&self) -> Option<usize> {
        let tracked_x = self.tracked_x()?;
        sensor::active_obstacle_index(&self.obstacles, tracked_x, &self.config.obstacles)
    }

    /// Advance the whole population by one tick.
    pub fn step(&mut self, stop: &dyn StopSignal) -> Vec<GenerationEvent> {
        if self.finished.is_some() {
            return Vec::new();
        }
        let mut events = Vec::new();

        if stop.should_stop() {
            self.finish(StopReason::Aborted, &mut events);
            return events;
        }
        if self.agents.is_empty() {
            self.finish(StopReason::Extinct, &mut events);
            return events;
        }
        if self.cap_reached() {
            self.finish(StopReason::TickCap, &mut events);
            return events;
        }

        self.tick += 1;
        tracing::trace!(
            generation = self.number,
            tick = self.tick,
            alive = self.agents.len(),
            "tick"
        );

        let active = self.active_obstacle();
        self.act(active);

        self.floor.advance(&self.config.floor);
        for obstacle in &mut self.obstacles {
            obstacle.advance(&self.config.obstacles);
        }

        self.resolve_collisions(&mut events);
        self.retire_obstacles(&mut events);
        self.check_passed(&mut events);
        self.remove_out_of_bounds(&mut events);

        if self.agents.is_empty() {
            self.finish(StopReason::Extinct, &mut events);
        } else if self.cap_reached() {
            self.finish(StopReason::TickCap, &mut events);
        }

        debug_assert_eq!(self.agents.len(), self.controllers.len());
        debug_assert_eq!(self.agents.len(), self.fitness.len());
        events
    }

    fn cap_reached(&self) -> bool {
        self.config.max_ticks.is_some_and(|cap| self.tick >= cap)
    }

    /// Reward, move, sense and decide for every live agent.
    fn act(&mut self, active: Option<usize>) {
        let active = active.and_then(|i| self.obstacles.get(i));
        let lanes = self
            .agents
            .iter_mut()
            .zip(&self.controllers)
            .zip(self.fitness.iter_mut());

        for ((agent, controller), fitness) in lanes {
            scoring::reward_survival(fitness, &self.config.fitness);
            agent.advance(&self.config.physics);

            let Some(obstacle) = active else {
                continue;
            };
            let observation = sensor::observe(agent, obstacle);
            let output = controller.decide(&observation);
            if !output.is_finite() {
                tracing::trace!(agent = agent.id, output, "Ignored non-finite controller output");
            }
            if wants_jump(output, self.config.jump_threshold) {
                agent.jump(&self.config.physics);
            }
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GenerationEvent>) {
        for obstacle in &self.obstacles {
            for (agent, fitness) in self.agents.iter_mut().zip(self.fitness.iter_mut()) {
                if !agent.alive {
                    continue;
                }
                if let Some(piece) = collision::check_obstacle(agent, obstacle, &self.sprites) {
                    agent.alive = false;
                    scoring::penalize_collision(fitness, &self.config.fitness);
                    tracing::debug!(
                        generation = self.number,
                        tick = self.tick,
                        agent = agent.id,
                        ?piece,
                        "Agent crashed"
                    );
                    events.push(GenerationEvent::AgentCrashed {
                        agent: agent.id,
                        fitness: **fitness,
                    });
                }
            }
        }
        self.cull();
    }

    fn retire_obstacles(&mut self, events: &mut Vec<GenerationEvent>) {
        let before = self.obstacles.len();
        let left_bound = self.config.playfield.left_bound;
        let obstacle_config = &self.config.obstacles;
        self.obstacles
            .retain(|o| !o.is_offscreen(left_bound, obstacle_config));
        for _ in self.obstacles.len()..before {
            events.push(GenerationEvent::ObstacleRetired);
        }
    }

    fn check_passed(&mut self, events: &mut Vec<GenerationEvent>) {
        let Some(tracked_x) = self.tracked_x() else {
            return;
        };
        let mut passed_any = false;
        for obstacle in &mut self.obstacles {
            passed_any |= obstacle.mark_passed(tracked_x);
        }
        if !passed_any {
            return;
        }

        self.score += 1;
        for fitness in &mut self.fitness {
            scoring::reward_pass(fitness, &self.config.fitness);
        }
        let spawned = Obstacle::new(
            self.config.obstacles.spawn_x,
            &mut self.rng,
            &self.config.obstacles,
        );
        tracing::debug!(
            generation = self.number,
            tick = self.tick,
            score = self.score,
            gap_center = spawned.gap_center,
            "Obstacle passed"
        );
        self.obstacles.push(spawned);
        events.push(GenerationEvent::ObstaclePassed { score: self.score });
    }

    fn remove_out_of_bounds(&mut self, events: &mut Vec<GenerationEvent>) {
        for (agent, fitness) in self.agents.iter_mut().zip(&self.fitness) {
            if collision::out_of_bounds(agent, &self.config) {
                agent.alive = false;
                tracing::debug!(
                    generation = self.number,
                    tick = self.tick,
                    agent = agent.id,
                    y = agent.y,
                    "Agent left the playfield"
                );
                events.push(GenerationEvent::AgentOutOfBounds {
                    agent: agent.id,
                    fitness: **fitness,
                });
            }
        }
        self.cull();
    }

    /// Drop every agent marked dead, together with its controller and fitness
    /// slot, keeping survivors in their original order.
    fn cull(&mut self) {
        if self.agents.iter().all(|a| a.alive) {
            return;
        }
        let agents = std::mem::take(&mut self.agents);
        let controllers = std::mem::take(&mut self.controllers);
        let fitness = std::mem::take(&mut self.fitness);
        for ((agent, controller), slot) in agents.into_iter().zip(controllers).zip(fitness) {
            if agent.alive {
                self.agents.push(agent);
                self.controllers.push(controller);
                self.fitness.push(slot);
            }
        }
    }

    fn finish(&mut self, reason: StopReason, events: &mut Vec<GenerationEvent>) {
        self.finished = Some(reason);
        tracing::debug!(
            generation = self.number,
            ticks = self.tick,
            score = self.score,
            survivors = self.agents.len(),
            %reason,
            "Generation finished"
        );
        events.push(GenerationEvent::GenerationComplete { reason });
    }

    /// Tick until the generation finishes.
    pub fn run(&mut self, stop: &dyn StopSignal) -> GenerationReport {
        tracing::debug!(
            generation = self.number,
            population = self.population,
            seed = ?self.config.seed,
            "Generation started"
        );
        while self.finished.is_none() {
            self.step(stop);
        }
        self.report()
    }

    /// Summary so far; `reason` is `Aborted` if the generation has not finished.
    pub fn report(&self) -> GenerationReport {
        GenerationReport {
            generation: self.number,
            population: self.population,
            ticks: self.tick,
            score: self.score,
            survivors: self.agents.len(),
            reason: self.finished.unwrap_or(StopReason::Aborted),
        }
    }

    /// Read-only copy of the current scene.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            generation: self.number,
            tick: self.tick,
            score: self.score,
            alive: self.agents.len(),
            active_obstacle: self.active_obstacle(),
            floor_x: [self.floor.x1, self.floor.x2],
            agents: self
                .agents
                .iter()
                .map(|a| AgentView {
                    id: a.id,
                    x: a.x(),
                    y: a.y,
                    tilt: a.tilt,
                    frame: a.frame,
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    x: o.x,
                    gap_center: o.gap_center,
                    top: o.top,
                    bottom: o.bottom,
                    passed: o.passed,
                })
                .collect(),
            finished: self.finished,
        }
    }
}

impl<C: Controller> Simulation for Generation<'_, C> {
    fn tick(&mut self, stop: &dyn StopSignal) -> Vec<GenerationEvent> {
        self.step(stop)
    }

    fn stop_reason(&self) -> Option<StopReason> {
        self.finished
    }

    fn ticks(&self) -> u64 {
        self.tick
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn alive(&self) -> usize {
        self.agents.len()
    }

    fn sequence_lengths(&self) -> [usize; 3] {
        [self.agents.len(), self.controllers.len(), self.fitness.len()]
    }
}

/// Evaluate one generation to completion, accumulating into `fitness`
/// (`fitness[i]` belongs to `controllers[i]`).
pub fn evaluate<C: Controller>(
    config: &SimConfig,
    controllers: &[C],
    fitness: &mut [f32],
    stop: &dyn StopSignal,
) -> Result<GenerationReport, EvalError> {
    let mut generation = Generation::new(config, controllers, fitness)?;
    Ok(generation.run(stop))
}
