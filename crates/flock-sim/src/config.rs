use serde::{Deserialize, Serialize};

/// Vertical jump impulse (negative is up).
pub const JUMP_VELOCITY: f32 = -10.5;
/// Constant acceleration `k` in `v*n + 0.5*k*n^2`.
pub const GRAVITY: f32 = 9.0;
/// Largest downward displacement applied in one tick.
pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
/// Extra upward displacement added whenever the agent is rising.
pub const UPWARD_NUDGE: f32 = 2.0;

/// Playfield geometry in pixels, y growing downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub width: f32,
    pub height: f32,
    /// Top edge of the floor strip.
    pub floor_y: f32,
    /// Agents above this line are out of bounds.
    pub ceiling_y: f32,
    /// How far the agent sprite may sink into the floor strip before it counts as a landing.
    pub floor_margin: f32,
    /// Obstacles whose right edge is left of this are retired.
    pub left_bound: f32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 800.0,
            floor_y: 730.0,
            ceiling_y: -50.0,
            floor_margin: 10.0,
            left_bound: 0.0,
        }
    }
}

/// Agent spawn position and sprite size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start_x: 230.0,
            start_y: 350.0,
            width: 68,
            height: 48,
        }
    }
}

/// Vertical kinematics and the cosmetic tilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub jump_velocity: f32,
    pub gravity: f32,
    pub terminal_displacement: f32,
    pub upward_nudge: f32,
    /// Tilt (degrees) held while rising.
    pub max_tilt: f32,
    /// Tilt lost per tick while diving.
    pub tilt_step: f32,
    /// Tilt stops decaying once it is at or below this.
    pub min_tilt: f32,
    /// Tilt stays pinned until the agent sinks this far below its jump height.
    pub tilt_hold_margin: f32,
    /// Ticks each wing frame is held.
    pub animation_ticks: u32,
    /// At or below this tilt the wings stop flapping.
    pub glide_tilt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            jump_velocity: JUMP_VELOCITY,
            gravity: GRAVITY,
            terminal_displacement: TERMINAL_DISPLACEMENT,
            upward_nudge: UPWARD_NUDGE,
            max_tilt: 25.0,
            tilt_step: 20.0,
            min_tilt: -90.0,
            tilt_hold_margin: 50.0,
            animation_ticks: 5,
            glide_tilt: -80.0,
        }
    }
}

/// Obstacle geometry, scrolling and spawning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Vertical opening between the two pieces.
    pub gap: f32,
    pub scroll_velocity: f32,
    /// Sprite size of each piece.
    pub width: u32,
    pub height: u32,
    /// Height of the rounded cap at the opening end of each piece.
    pub cap_height: u32,
    /// Gap-center draw range, half-open.
    pub gap_center_min: i32,
    pub gap_center_max: i32,
    /// Where the first obstacle of a generation appears.
    pub first_spawn_x: f32,
    /// Where every later obstacle appears.
    pub spawn_x: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            gap: 200.0,
            scroll_velocity: 5.0,
            width: 104,
            height: 640,
            cap_height: 48,
            gap_center_min: 50,
            gap_center_max: 450,
            first_spawn_x: 650.0,
            spawn_x: 500.0,
        }
    }
}

/// Scrolling floor strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub width: f32,
    pub velocity: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: 672.0,
            velocity: 5.0,
        }
    }
}

/// Fitness rewards and penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Added to every live agent each tick.
    pub survival_reward: f32,
    /// Subtracted once from an agent that hits an obstacle.
    pub collision_penalty: f32,
    /// Added to every live agent when an obstacle is passed.
    pub pass_bonus: f32,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            survival_reward: 0.1,
            collision_penalty: 1.0,
            pass_bonus: 5.0,
        }
    }
}

/// Top-level simulation configuration, fixed for the lifetime of a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub playfield: PlayfieldConfig,
    pub agent: AgentConfig,
    pub physics: PhysicsConfig,
    pub obstacles: ObstacleConfig,
    pub floor: FloorConfig,
    pub fitness: FitnessConfig,
    /// Controller outputs strictly above this request a jump.
    pub jump_threshold: f32,
    pub tick_rate_hz: f32,
    /// External cap on ticks per generation.
    pub max_ticks: Option<u64>,
    /// Obstacle RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            playfield: PlayfieldConfig::default(),
            agent: AgentConfig::default(),
            physics: PhysicsConfig::default(),
            obstacles: ObstacleConfig::default(),
            floor: FloorConfig::default(),
            fitness: FitnessConfig::default(),
            jump_threshold: 0.5,
            tick_rate_hz: 30.0,
            max_ticks: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonFinite(&'static str),
    NonPositive(&'static str),
    /// A jump must push the agent up (negative y).
    JumpNotUpward(f32),
    EmptyGapRange { min: i32, max: i32 },
    UnreachableGap { min: i32, max: i32, gap: f32 },
    InvertedPlayfield { ceiling_y: f32, floor_y: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite(field) => write!(f, "{field} must be finite"),
            Self::NonPositive(field) => write!(f, "{field} must be positive"),
            Self::JumpNotUpward(v) => write!(f, "physics.jump_velocity {v} must be negative"),
            Self::EmptyGapRange { min, max } => {
                write!(f, "gap center range {min}..{max} is empty")
            },
            Self::UnreachableGap { min, max, gap } => write!(
                f,
                "gap center range {min}..{max} with gap {gap} leaves the playfield"
            ),
            Self::InvertedPlayfield { ceiling_y, floor_y } => {
                write!(f, "ceiling {ceiling_y} must be above floor {floor_y}")
            },
        }
    }
}

impl std::error::Error for ConfigError {}

impl SimConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("FLOCK_SIM_CONFIG")
            .unwrap_or_else(|_| "config/sim.toml".to_string());
        Self::load_from(&path)
    }

    /// Load config from the given TOML file, falling back to defaults.
    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<SimConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    SimConfig::default()
                },
            },
            Err(_) => SimConfig::default(),
        }
    }

    /// Reject configurations that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("playfield.width", self.playfield.width),
            ("playfield.height", self.playfield.height),
            ("playfield.floor_y", self.playfield.floor_y),
            ("playfield.ceiling_y", self.playfield.ceiling_y),
            ("playfield.floor_margin", self.playfield.floor_margin),
            ("playfield.left_bound", self.playfield.left_bound),
            ("agent.start_x", self.agent.start_x),
            ("agent.start_y", self.agent.start_y),
            ("physics.jump_velocity", self.physics.jump_velocity),
            ("physics.gravity", self.physics.gravity),
            ("physics.terminal_displacement", self.physics.terminal_displacement),
            ("physics.upward_nudge", self.physics.upward_nudge),
            ("physics.max_tilt", self.physics.max_tilt),
            ("physics.tilt_step", self.physics.tilt_step),
            ("physics.min_tilt", self.physics.min_tilt),
            ("physics.tilt_hold_margin", self.physics.tilt_hold_margin),
            ("physics.glide_tilt", self.physics.glide_tilt),
            ("obstacles.gap", self.obstacles.gap),
            ("obstacles.scroll_velocity", self.obstacles.scroll_velocity),
            ("obstacles.first_spawn_x", self.obstacles.first_spawn_x),
            ("obstacles.spawn_x", self.obstacles.spawn_x),
            ("floor.width", self.floor.width),
            ("floor.velocity", self.floor.velocity),
            ("fitness.survival_reward", self.fitness.survival_reward),
            ("fitness.collision_penalty", self.fitness.collision_penalty),
            ("fitness.pass_bonus", self.fitness.pass_bonus),
            ("jump_threshold", self.jump_threshold),
            ("tick_rate_hz", self.tick_rate_hz),
        ];
        if let Some(&(field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite(field));
        }

        let positive = [
            ("playfield.width", self.playfield.width),
            ("obstacles.gap", self.obstacles.gap),
            ("obstacles.scroll_velocity", self.obstacles.scroll_velocity),
            ("floor.width", self.floor.width),
            ("tick_rate_hz", self.tick_rate_hz),
            ("agent.width", self.agent.width as f32),
            ("agent.height", self.agent.height as f32),
            ("obstacles.width", self.obstacles.width as f32),
            ("obstacles.height", self.obstacles.height as f32),
            ("physics.gravity", self.physics.gravity),
            ("physics.animation_ticks", self.physics.animation_ticks as f32),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::NonPositive(field));
        }
        if self.physics.jump_velocity >= 0.0 {
            return Err(ConfigError::JumpNotUpward(self.physics.jump_velocity));
        }

        if self.playfield.ceiling_y >= self.playfield.floor_y {
            return Err(ConfigError::InvertedPlayfield {
                ceiling_y: self.playfield.ceiling_y,
                floor_y: self.playfield.floor_y,
            });
        }

        let (min, max) = (
            self.obstacles.gap_center_min,
            self.obstacles.gap_center_max,
        );
        if min >= max {
            return Err(ConfigError::EmptyGapRange { min, max });
        }
        // Largest draw is max - 1; its bottom opening must sit above the floor.
        if min <= 0 || (max - 1) as f32 + self.obstacles.gap >= self.playfield.floor_y {
            return Err(ConfigError::UnreachableGap {
                min,
                max,
                gap: self.obstacles.gap,
            });
        }

        Ok(())
    }

    /// Seconds of simulated time covered by `ticks`.
    pub fn ticks_to_secs(&self, ticks: u64) -> f32 {
        ticks as f32 / self.tick_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: SimConfig = toml::from_str(
            r#"
            seed = 7
            [obstacles]
            gap = 180.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.obstacles.gap, 180.0);
        assert_eq!(cfg.obstacles.scroll_velocity, 5.0);
        assert_eq!(cfg.agent, AgentConfig::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg: SimConfig = toml::from_str(include_str!("../../../config/sim.toml")).unwrap();
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn empty_gap_range_rejected() {
        let mut cfg = SimConfig::default();
        cfg.obstacles.gap_center_min = 300;
        cfg.obstacles.gap_center_max = 300;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyGapRange { min: 300, max: 300 })
        );
    }

    #[test]
    fn gap_below_floor_rejected() {
        let mut cfg = SimConfig::default();
        cfg.obstacles.gap_center_max = 600;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnreachableGap { .. })
        ));
    }

    #[test]
    fn nan_rejected() {
        let mut cfg = SimConfig::default();
        cfg.physics.gravity = f32::NAN;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonFinite("physics.gravity"))
        );
    }

    #[test]
    fn zero_scroll_rejected() {
        let mut cfg = SimConfig::default();
        cfg.obstacles.scroll_velocity = 0.0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive("obstacles.scroll_velocity"))
        );
    }

    #[test]
    fn weightless_physics_rejected() {
        let mut cfg = SimConfig::default();
        cfg.physics.gravity = 0.0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive("physics.gravity"))
        );

        let mut cfg = SimConfig::default();
        cfg.physics.jump_velocity = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::JumpNotUpward(0.0)));
    }

    #[test]
    fn frozen_animation_rejected() {
        let mut cfg = SimConfig::default();
        cfg.physics.animation_ticks = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive("physics.animation_ticks"))
        );
    }

    #[test]
    fn inverted_playfield_rejected() {
        let mut cfg = SimConfig::default();
        cfg.playfield.ceiling_y = 800.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedPlayfield { .. })
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = SimConfig::load_from("/nonexistent/flock/sim.toml");
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn ticks_to_secs_uses_tick_rate() {
        let cfg = SimConfig::default();
        assert!((cfg.ticks_to_secs(90) - 3.0).abs() < 1e-6);
    }
}
