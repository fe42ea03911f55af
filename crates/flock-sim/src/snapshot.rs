use serde::{Deserialize, Serialize};

use flock_core::events::{AgentId, StopReason};

/// Read-only copy of the scene after a tick, enough for a presentation layer to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub generation: u32,
    pub tick: u64,
    pub score: u32,
    pub alive: usize,
    pub active_obstacle: Option<usize>,
    pub floor_x: [f32; 2],
    pub agents: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
    pub finished: Option<StopReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub x: f32,
    pub y: f32,
    pub tilt: f32,
    pub frame: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub x: f32,
    pub gap_center: f32,
    pub top: f32,
    pub bottom: f32,
    pub passed: bool,
}

#[derive(Debug)]
pub enum SnapshotError {
    Encode(String),
    Decode(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "snapshot encode error: {e}"),
            Self::Decode(e) => write!(f, "snapshot decode error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl FrameSnapshot {
    /// MessagePack encoding for handing frames to another process or thread.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        rmp_serde::to_vec(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        rmp_serde::from_slice(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}
