use serde::{Deserialize, Serialize};

/// Stable identifier of an agent: its index in the controller slice handed to
/// the generation. Survives removal of other agents.
pub type AgentId = usize;

/// Why a generation stopped ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every agent was removed.
    Extinct,
    /// The external tick cap was reached with agents still alive.
    TickCap,
    /// The external stop signal fired.
    Aborted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extinct => write!(f, "extinct"),
            Self::TickCap => write!(f, "tick cap"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Events emitted by a generation during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationEvent {
    /// Agent hit an obstacle and was removed.
    AgentCrashed { agent: AgentId, fitness: f32 },
    /// Agent left the vertical playfield and was removed.
    AgentOutOfBounds { agent: AgentId, fitness: f32 },
    /// The tracked agent passed an obstacle; a new one was spawned.
    ObstaclePassed { score: u32 },
    /// An obstacle scrolled off the left edge and was dropped.
    ObstacleRetired,
    GenerationComplete { reason: StopReason },
}

impl GenerationEvent {
    /// The agent removed by this event, if any.
    pub fn removed_agent(&self) -> Option<AgentId> {
        match self {
            Self::AgentCrashed { agent, .. } | Self::AgentOutOfBounds { agent, .. } => Some(*agent),
            _ => None,
        }
    }
}
