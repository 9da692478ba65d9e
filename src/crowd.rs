//! # Crowd
//!
//! Owns the agents and walls of one simulation and runs ticks in the fixed
//! phase order:
//!
//! 1. collaborators update targets and parameters (before calling `step`)
//! 2. every agent is steered and integrated against a snapshot of the crowd
//!    taken at the start of the tick
//! 3. every (agent, wall) pair is resolved
//! 4. collaborators read the new positions and velocities
//!
//! Agents are stored in id order, so the neighbor accumulation order and
//! therefore the result never depends on the order agents were added in.

use tracing::debug;

use crate::config::CrowdConfig;
use crate::error::{CrowdError, Result};
use crate::integrator::advance;
use crate::structs::{Agent, AgentId, Vector3D};
use crate::trajectory::Trajectory;
use crate::wall::Wall;

/// Summary of one completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Number of (agent, wall) pairs that needed a position correction.
    pub wall_corrections: usize,
}

#[derive(Debug, Clone)]
pub struct Crowd {
    config: CrowdConfig,
    agents: Vec<Agent>,
    walls: Vec<Wall>,
    tick: u64,
    trajectory: Option<Trajectory>,
}

impl Crowd {
    pub fn new(config: CrowdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Crowd {
            config,
            agents: Vec::new(),
            walls: Vec::new(),
            tick: 0,
            trajectory: None,
        })
    }

    pub fn config(&self) -> &CrowdConfig {
        &self.config
    }

    /// Adds an agent built from the crowd's default parameters.
    pub fn spawn(
        &mut self,
        id: AgentId,
        position: Vector3D,
        velocity: Vector3D,
        target: Vector3D,
    ) -> Result<AgentId> {
        let agent = Agent::new(id, position, velocity, target, self.config.agent)?;
        self.add_agent(agent)
    }

    pub fn add_agent(&mut self, agent: Agent) -> Result<AgentId> {
        let id = agent.id();
        match self.agents.binary_search_by_key(&id, Agent::id) {
            Ok(_) => Err(CrowdError::DuplicateAgent(id)),
            Err(index) => {
                self.agents.insert(index, agent);
                Ok(id)
            }
        }
    }

    /// Adds a wall and returns its index.
    pub fn add_wall(&mut self, wall: Wall) -> usize {
        self.walls.push(wall);
        self.walls.len() - 1
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall_mut(&mut self, index: usize) -> Option<&mut Wall> {
        self.walls.get_mut(index)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents
            .binary_search_by_key(&id, Agent::id)
            .ok()
            .map(|index| &self.agents[index])
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        match self.agents.binary_search_by_key(&id, Agent::id) {
            Ok(index) => Some(&mut self.agents[index]),
            Err(_) => None,
        }
    }

    /// Like [`Crowd::agent_mut`], but unknown ids are an error.
    pub fn try_agent_mut(&mut self, id: AgentId) -> Result<&mut Agent> {
        self.agent_mut(id).ok_or(CrowdError::UnknownAgent(id))
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Starts (or stops and discards) per-tick position recording.
    pub fn record_trajectory(&mut self, enabled: bool) {
        self.trajectory = if enabled {
            Some(Trajectory::new())
        } else {
            None
        };
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Advances every agent by `dt` and resolves wall contacts.
    pub fn step(&mut self, dt: f64) -> Result<TickReport> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(CrowdError::InvalidTimestep(dt));
        }

        let snapshot = self.agents.clone();
        let direction = self.config.direction;
        for agent in &mut self.agents {
            advance(agent, &snapshot, dt, direction);
        }

        let mut wall_corrections = 0;
        for agent in &mut self.agents {
            for wall in &self.walls {
                if wall.resolve(agent) {
                    wall_corrections += 1;
                }
            }
        }

        self.tick += 1;
        if let Some(trajectory) = &mut self.trajectory {
            trajectory.record(self.tick, &self.agents);
        }

        debug!(
            tick = self.tick,
            agents = self.agents.len(),
            wall_corrections,
            "crowd tick complete"
        );

        Ok(TickReport {
            tick: self.tick,
            wall_corrections,
        })
    }

    /// Steps `ticks` times with the configured timestep.
    pub fn run(&mut self, ticks: usize) -> Result<()> {
        let dt = self.config.timestep;
        for _ in 0..ticks {
            self.step(dt)?;
        }
        Ok(())
    }
}
