//! In-memory record of agent positions, one frame per tick.

use serde::Serialize;

use crate::structs::{Agent, AgentId, Vector3D};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub positions: Vec<(AgentId, Vector3D)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trajectory {
    frames: Vec<Frame>,
}

impl Trajectory {
    pub fn new() -> Self {
        Trajectory::default()
    }

    pub fn record(&mut self, tick: u64, agents: &[Agent]) {
        self.frames.push(Frame {
            tick,
            positions: agents.iter().map(|a| (a.id(), a.position())).collect(),
        });
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Positions of one agent across all recorded frames.
    pub fn path(&self, id: AgentId) -> Vec<Vector3D> {
        self.frames
            .iter()
            .filter_map(|frame| {
                frame
                    .positions
                    .iter()
                    .find(|(agent_id, _)| *agent_id == id)
                    .map(|(_, position)| *position)
            })
            .collect()
    }

    /// Total distance travelled by one agent over the recording.
    pub fn path_length(&self, id: AgentId) -> f64 {
        self.path(id)
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
