//! # Crowd Steering
//!
//! Predictive local collision avoidance for crowds of disc-shaped agents
//! moving on a ground plane.
//!
//! ## Model
//!
//! - **Time to collision**: swept-disc test between an agent and each
//!   neighbor under constant relative velocity.
//! - **Steering**: a goal-seeking force plus, for every neighbor expected to
//!   collide within the agent's horizon, an urgency-weighted avoidance push
//!   and an optional lateral sidestep.
//! - **Integration**: force and speed clamping, explicit Euler step.
//! - **Walls**: axis-aligned boxes that correct penetrating positions after
//!   integration.
//!
//! ## Usage
//!
//! Build a [`Crowd`] from a [`CrowdConfig`], add agents and walls, then call
//! [`Crowd::step`] once per frame. Scenario scripts can use the same engine
//! through the Python bindings (`python` feature).

pub mod collision;
pub mod config;
pub mod crowd;
pub mod error;
pub mod integrator;
pub mod side_table;
pub mod steering;
pub mod structs;
pub mod trajectory;
pub mod wall;

#[cfg(feature = "python")]
mod python;

pub use collision::time_to_collision;
pub use config::{CrowdConfig, ScenarioPreset};
pub use crowd::{Crowd, TickReport};
pub use error::{CrowdError, Result};
pub use integrator::{advance, apply_force};
pub use side_table::SideTable;
pub use steering::{steering_force, steering_forces, AvoidanceDirection, SteeringForces};
pub use structs::{Agent, AgentId, AgentParams, Vector3D};
pub use trajectory::{Frame, Trajectory};
pub use wall::{Wall, WallAxis};
