//! # Time-to-Collision
//!
//! Continuous swept-sphere test between two agents under constant-velocity
//! extrapolation. Works on the ground plane only.
//!
//! With `w` the relative position, `v` the relative velocity and `r` the
//! combined radius, contact happens when `|w - v t| = r`, i.e. when
//! `a t² - 2 b t + c = 0` with `a = v·v`, `b = w·v`, `c = w·w - r²`.
//! The earliest root is `(b - sqrt(b² - a c)) / a`.

use crate::structs::Agent;

/// Relative speeds below this (squared) are treated as no relative motion.
const MIN_RELATIVE_SPEED_SQ: f64 = 1e-12;

/// Earliest non-negative time at which `agent` and `neighbor` touch, `0.0`
/// if they already overlap, or `f64::INFINITY` if they never will.
pub fn time_to_collision(agent: &Agent, neighbor: &Agent) -> f64 {
    let r = agent.radius() + neighbor.radius();
    let w = neighbor.position().planar() - agent.position().planar();

    let c = w.dot(&w) - r * r;
    if !c.is_finite() {
        return f64::INFINITY;
    }
    if c < 0.0 {
        return 0.0;
    }

    let v = agent.velocity().planar() - neighbor.velocity().planar();
    let a = v.dot(&v);
    if a < MIN_RELATIVE_SPEED_SQ {
        return f64::INFINITY;
    }

    let b = w.dot(&v);
    let discriminant = b * b - a * c;
    if discriminant <= 0.0 {
        return f64::INFINITY;
    }

    let tau = (b - discriminant.sqrt()) / a;
    if tau >= 0.0 {
        tau
    } else {
        f64::INFINITY
    }
}
