//! # Python bindings
//!
//! Exposes a `Crowd` class to scenario scripts. Positions and velocities
//! cross the boundary as `(x, y, z)` tuples; every error becomes a
//! `ValueError`.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{CrowdConfig, ScenarioPreset};
use crate::crowd::Crowd;
use crate::error::CrowdError;
use crate::steering::AvoidanceDirection;
use crate::structs::{
    Agent, AgentId, AgentParams, Vector3D, DEFAULT_AVOID_WEIGHT, DEFAULT_SIDESTEP_WEIGHT,
    DEFAULT_YIELD_FACTOR,
};
use crate::wall::{Wall, WallAxis};

type Tuple3 = (f64, f64, f64);

impl From<CrowdError> for PyErr {
    fn from(err: CrowdError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn parse_direction(name: &str) -> PyResult<AvoidanceDirection> {
    match name {
        "predicted" => Ok(AvoidanceDirection::Predicted),
        "current" => Ok(AvoidanceDirection::Current),
        other => Err(PyValueError::new_err(format!("unknown avoidance direction '{}'", other))),
    }
}

fn parse_preset(name: &str) -> PyResult<ScenarioPreset> {
    match name {
        "room" => Ok(ScenarioPreset::Room),
        "airplane" => Ok(ScenarioPreset::Airplane),
        "museum" => Ok(ScenarioPreset::Museum),
        "performer" => Ok(ScenarioPreset::Performer),
        "subway" => Ok(ScenarioPreset::Subway),
        "walkway" => Ok(ScenarioPreset::Walkway),
        other => Err(PyValueError::new_err(format!("unknown scenario preset '{}'", other))),
    }
}

#[pyclass(name = "Crowd")]
pub struct PyCrowd {
    inner: Crowd,
}

impl PyCrowd {
    fn agent(&self, id: AgentId) -> PyResult<&Agent> {
        self.inner
            .agent(id)
            .ok_or_else(|| CrowdError::UnknownAgent(id).into())
    }
}

#[pymethods]
impl PyCrowd {
    #[new]
    #[pyo3(signature = (timestep=0.05, direction="predicted"))]
    fn new(timestep: f64, direction: &str) -> PyResult<Self> {
        let config = CrowdConfig {
            timestep,
            direction: parse_direction(direction)?,
            ..CrowdConfig::default()
        };
        Ok(PyCrowd { inner: Crowd::new(config)? })
    }

    #[staticmethod]
    fn from_preset(name: &str) -> PyResult<Self> {
        let config = CrowdConfig::preset(parse_preset(name)?);
        Ok(PyCrowd { inner: Crowd::new(config)? })
    }

    #[staticmethod]
    fn from_toml(path: &str) -> PyResult<Self> {
        let config = CrowdConfig::load(path)?;
        Ok(PyCrowd { inner: Crowd::new(config)? })
    }

    #[pyo3(signature = (
        id, position, velocity, target, radius, max_speed, max_force, horizon, k,
        avoid_weight=DEFAULT_AVOID_WEIGHT,
        sidestep_weight=DEFAULT_SIDESTEP_WEIGHT,
        yield_factor=DEFAULT_YIELD_FACTOR
    ))]
    #[allow(clippy::too_many_arguments)]
    fn add_agent(
        &mut self,
        id: AgentId,
        position: Tuple3,
        velocity: Tuple3,
        target: Tuple3,
        radius: f64,
        max_speed: f64,
        max_force: f64,
        horizon: f64,
        k: f64,
        avoid_weight: f64,
        sidestep_weight: f64,
        yield_factor: f64,
    ) -> PyResult<AgentId> {
        let params = AgentParams::new(radius, max_speed, max_force, horizon, k)
            .with_weights(avoid_weight, sidestep_weight)
            .with_yield_factor(yield_factor);
        let agent = Agent::new(id, position.into(), velocity.into(), target.into(), params)?;
        Ok(self.inner.add_agent(agent)?)
    }

    /// Adds an agent using the crowd's configured parameters.
    fn spawn(&mut self, id: AgentId, position: Tuple3, target: Tuple3) -> PyResult<AgentId> {
        Ok(self
            .inner
            .spawn(id, position.into(), Vector3D::zero(), target.into())?)
    }

    #[pyo3(signature = (width, height, vertical, position, thickness=None))]
    fn add_wall(
        &mut self,
        width: f64,
        height: f64,
        vertical: bool,
        position: Tuple3,
        thickness: Option<f64>,
    ) -> PyResult<usize> {
        let axis = WallAxis::from_vertical(vertical);
        let wall = match thickness {
            Some(thickness) => {
                Wall::with_thickness(width, height, thickness, axis, position.into())?
            }
            None => Wall::new(width, height, axis, position.into())?,
        };
        Ok(self.inner.add_wall(wall))
    }

    fn move_wall(&mut self, index: usize, position: Tuple3) -> PyResult<()> {
        let wall = self
            .inner
            .wall_mut(index)
            .ok_or_else(|| PyValueError::new_err(format!("unknown wall {}", index)))?;
        wall.set_position(position.into());
        Ok(())
    }

    fn set_target(&mut self, id: AgentId, target: Tuple3) -> PyResult<()> {
        self.inner.try_agent_mut(id)?.target = target.into();
        Ok(())
    }

    fn set_yielding(&mut self, id: AgentId, yielding: bool) -> PyResult<()> {
        self.inner.try_agent_mut(id)?.yielding = yielding;
        Ok(())
    }

    fn set_horizon(&mut self, id: AgentId, horizon: f64) -> PyResult<()> {
        Ok(self.inner.try_agent_mut(id)?.set_horizon(horizon)?)
    }

    fn set_weights(
        &mut self,
        id: AgentId,
        avoid_weight: f64,
        sidestep_weight: f64,
    ) -> PyResult<()> {
        let agent = self.inner.try_agent_mut(id)?;
        agent.set_avoid_weight(avoid_weight)?;
        agent.set_sidestep_weight(sidestep_weight)?;
        Ok(())
    }

    /// Advances one tick. Uses the configured timestep when `dt` is omitted.
    #[pyo3(signature = (dt=None))]
    fn step(&mut self, dt: Option<f64>) -> PyResult<u64> {
        let dt = dt.unwrap_or(self.inner.config().timestep);
        Ok(self.inner.step(dt)?.tick)
    }

    fn run(&mut self, ticks: usize) -> PyResult<()> {
        Ok(self.inner.run(ticks)?)
    }

    fn position(&self, id: AgentId) -> PyResult<Tuple3> {
        Ok(self.agent(id)?.position().into())
    }

    fn velocity(&self, id: AgentId) -> PyResult<Tuple3> {
        Ok(self.agent(id)?.velocity().into())
    }

    fn positions(&self) -> Vec<(AgentId, Tuple3)> {
        self.inner
            .agents()
            .iter()
            .map(|agent| (agent.id(), agent.position().into()))
            .collect()
    }

    #[getter]
    fn tick(&self) -> u64 {
        self.inner.tick()
    }

    fn __len__(&self) -> usize {
        self.inner.agents().len()
    }

    fn __str__(&self) -> String {
        format!(
            "Crowd(tick={}, agents={}, walls={})",
            self.inner.tick(),
            self.inner.agents().len(),
            self.inner.walls().len()
        )
    }
}

/// Time until two discs first touch, or infinity if they never will.
#[pyfunction(name = "time_to_collision")]
fn time_to_collision_py(
    position_a: Tuple3,
    velocity_a: Tuple3,
    radius_a: f64,
    position_b: Tuple3,
    velocity_b: Tuple3,
    radius_b: f64,
) -> PyResult<f64> {
    let disc = |id, position: Tuple3, velocity: Tuple3, radius| {
        let params = AgentParams::new(radius, 1.0, 1.0, 1.0, 1.0);
        Agent::new(id, position.into(), velocity.into(), position.into(), params)
    };
    let a = disc(0, position_a, velocity_a, radius_a)?;
    let b = disc(1, position_b, velocity_b, radius_b)?;
    Ok(crate::collision::time_to_collision(&a, &b))
}

#[pymodule]
fn crowd_steering(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCrowd>()?;
    m.add_function(wrap_pyfunction!(time_to_collision_py, m)?)?;
    Ok(())
}
