//! # Integration
//!
//! Explicit (semi-implicit Euler) integration of one agent over one tick:
//! clamp force, update velocity, clamp speed, move. Only the ground-plane
//! components of velocity and position are touched.

use nalgebra::Vector2;
use tracing::warn;

use crate::steering::{steering_force, AvoidanceDirection};
use crate::structs::Agent;

/// Scales `v` down to `max` if it is longer, preserving direction.
pub fn clamp_magnitude(v: Vector2<f64>, max: f64) -> Vector2<f64> {
    let magnitude = v.norm();
    if magnitude > max {
        v * (max / magnitude)
    } else {
        v
    }
}

fn is_finite(v: &Vector2<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Applies `force` to `agent` for `dt` and returns the force actually used
/// after clamping to `max_force`.
///
/// A non-finite force is replaced by zero. A step that would produce a
/// non-finite velocity or position is dropped entirely and reports zero
/// applied force.
pub fn apply_force(agent: &mut Agent, force: Vector2<f64>, dt: f64) -> Vector2<f64> {
    let force = if is_finite(&force) {
        clamp_magnitude(force, agent.max_force())
    } else {
        warn!(agent = agent.id(), ?force, "discarding non-finite steering force");
        Vector2::zeros()
    };

    let velocity = clamp_magnitude(agent.velocity.planar() + force * dt, agent.max_speed());
    let position = agent.position.planar() + velocity * dt;

    if !is_finite(&velocity) || !is_finite(&position) {
        warn!(agent = agent.id(), dt, "integration produced non-finite state, step skipped");
        return Vector2::zeros();
    }

    agent.velocity = agent.velocity.with_planar(velocity);
    agent.position = agent.position.with_planar(position);
    force
}

/// Steers and integrates `agent` for one tick, reading neighbors from
/// `agents`. Returns the applied force.
///
/// `agents` is the read buffer: pass a snapshot taken at the start of the
/// tick to keep the result independent of update order.
pub fn advance(
    agent: &mut Agent,
    agents: &[Agent],
    dt: f64,
    direction: AvoidanceDirection,
) -> Vector2<f64> {
    agent.goal = agent.target - agent.position;
    let force = steering_force(agent, agents, direction);
    apply_force(agent, force, dt)
}
