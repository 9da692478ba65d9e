//! # Core Data Structures
//!
//! This module defines the data records the steering engine operates on:
//!
//! - **Vector3D**: world-space position/velocity; the simulation is planar,
//!   so only `x` and `z` are ever changed by the engine
//! - **AgentParams**: tunable per-agent parameters, validated once
//! - **Agent**: a steering agent (position, velocity, target, parameters)
//!
//! Scenario bookkeeping (state machine labels, timers, render handles) does
//! not live here; see [`crate::side_table::SideTable`].

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::error::{require_non_negative, require_positive, CrowdError, Result};

pub type AgentId = usize;

pub const DEFAULT_AVOID_WEIGHT: f64 = 1.0;
pub const DEFAULT_SIDESTEP_WEIGHT: f64 = 0.0;
pub const DEFAULT_YIELD_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3D { x, y, z }
    }

    pub fn zero() -> Self {
        Vector3D::default()
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Vector3D) -> f64 {
        (*self - *other).magnitude()
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn normalize(&self) -> Vector3D {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self * (1.0 / mag)
        } else {
            Vector3D::zero()
        }
    }

    /// Ground-plane components `(x, z)`.
    pub fn planar(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.z)
    }

    /// Replaces the ground-plane components, keeping `y`.
    pub fn with_planar(&self, planar: Vector2<f64>) -> Vector3D {
        Vector3D {
            x: planar.x,
            y: self.y,
            z: planar.y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl From<(f64, f64, f64)> for Vector3D {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Vector3D { x, y, z }
    }
}

impl From<Vector3D> for (f64, f64, f64) {
    fn from(v: Vector3D) -> Self {
        (v.x, v.y, v.z)
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, other: Vector3D) -> Vector3D {
        Vector3D {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vector3D {
    fn add_assign(&mut self, other: Vector3D) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, other: Vector3D) -> Vector3D {
        Vector3D {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;

    fn mul(self, scalar: f64) -> Vector3D {
        Vector3D {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;

    fn neg(self) -> Vector3D {
        Vector3D {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Tunable parameters shared by the constructor and scenario configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Collision and avoidance footprint.
    pub radius: f64,
    pub max_speed: f64,
    pub max_force: f64,
    /// Predicted collisions further away than this (in simulation time) are ignored.
    pub horizon: f64,
    /// Gain on the goal force.
    pub k: f64,
    #[serde(default = "default_avoid_weight")]
    pub avoid_weight: f64,
    #[serde(default = "default_sidestep_weight")]
    pub sidestep_weight: f64,
    /// Avoidance multiplier applied while the agent is yielding.
    #[serde(default = "default_yield_factor")]
    pub yield_factor: f64,
}

fn default_avoid_weight() -> f64 {
    DEFAULT_AVOID_WEIGHT
}

fn default_sidestep_weight() -> f64 {
    DEFAULT_SIDESTEP_WEIGHT
}

fn default_yield_factor() -> f64 {
    DEFAULT_YIELD_FACTOR
}

impl AgentParams {
    /// Parameters with the optional weights at their neutral defaults.
    pub fn new(radius: f64, max_speed: f64, max_force: f64, horizon: f64, k: f64) -> Self {
        AgentParams {
            radius,
            max_speed,
            max_force,
            horizon,
            k,
            avoid_weight: DEFAULT_AVOID_WEIGHT,
            sidestep_weight: DEFAULT_SIDESTEP_WEIGHT,
            yield_factor: DEFAULT_YIELD_FACTOR,
        }
    }

    pub fn with_weights(mut self, avoid_weight: f64, sidestep_weight: f64) -> Self {
        self.avoid_weight = avoid_weight;
        self.sidestep_weight = sidestep_weight;
        self
    }

    pub fn with_yield_factor(mut self, yield_factor: f64) -> Self {
        self.yield_factor = yield_factor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("radius", self.radius)?;
        require_positive("max_speed", self.max_speed)?;
        require_positive("max_force", self.max_force)?;
        require_positive("horizon", self.horizon)?;
        require_positive("k", self.k)?;
        require_non_negative("avoid_weight", self.avoid_weight)?;
        require_non_negative("sidestep_weight", self.sidestep_weight)?;
        validate_yield_factor(self.yield_factor)
    }
}

fn validate_yield_factor(value: f64) -> Result<()> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(CrowdError::InvalidParameter {
            name: "yield_factor",
            value,
            reason: "must be finite and >= 1",
        })
    }
}

fn require_finite_vector(name: &'static str, v: Vector3D) -> Result<()> {
    match [v.x, v.y, v.z].into_iter().find(|c| !c.is_finite()) {
        None => Ok(()),
        Some(value) => Err(CrowdError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        }),
    }
}

/// A steering agent.
///
/// Position and velocity are only written by the integrator and the wall
/// resolver. Collaborators drive behavior through `target`, `yielding` and
/// the validated setters.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    pub(crate) position: Vector3D,
    pub(crate) velocity: Vector3D,
    pub(crate) goal: Vector3D,
    /// Where the agent is heading.
    pub target: Vector3D,
    /// Whether the agent currently defers to others.
    pub yielding: bool,
    params: AgentParams,
}

impl Agent {
    pub fn new(
        id: AgentId,
        position: Vector3D,
        velocity: Vector3D,
        target: Vector3D,
        params: AgentParams,
    ) -> Result<Self> {
        params.validate()?;
        require_finite_vector("position", position)?;
        require_finite_vector("velocity", velocity)?;
        require_finite_vector("target", target)?;
        Ok(Agent {
            id,
            position,
            velocity,
            goal: target - position,
            target,
            yielding: false,
            params,
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn velocity(&self) -> Vector3D {
        self.velocity
    }

    /// Displacement to target as of the last steering evaluation.
    pub fn goal(&self) -> Vector3D {
        self.goal
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    pub fn max_speed(&self) -> f64 {
        self.params.max_speed
    }

    pub fn max_force(&self) -> f64 {
        self.params.max_force
    }

    pub fn horizon(&self) -> f64 {
        self.params.horizon
    }

    pub fn k(&self) -> f64 {
        self.params.k
    }

    pub fn avoid_weight(&self) -> f64 {
        self.params.avoid_weight
    }

    pub fn sidestep_weight(&self) -> f64 {
        self.params.sidestep_weight
    }

    pub fn yield_factor(&self) -> f64 {
        self.params.yield_factor
    }

    pub fn set_horizon(&mut self, horizon: f64) -> Result<()> {
        require_positive("horizon", horizon)?;
        self.params.horizon = horizon;
        Ok(())
    }

    pub fn set_avoid_weight(&mut self, weight: f64) -> Result<()> {
        require_non_negative("avoid_weight", weight)?;
        self.params.avoid_weight = weight;
        Ok(())
    }

    pub fn set_sidestep_weight(&mut self, weight: f64) -> Result<()> {
        require_non_negative("sidestep_weight", weight)?;
        self.params.sidestep_weight = weight;
        Ok(())
    }

    pub fn set_yield_factor(&mut self, factor: f64) -> Result<()> {
        validate_yield_factor(factor)?;
        self.params.yield_factor = factor;
        Ok(())
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        (self.position.planar() - other.position.planar()).norm()
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Agent(id={}, pos={}, vel={}, r={:.2})",
            self.id, self.position, self.velocity, self.params.radius
        )
    }
}
