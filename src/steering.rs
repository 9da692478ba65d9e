//! # Steering Force Synthesis
//!
//! The force on an agent is the sum of three terms:
//!
//! 1. **Goal**: `k * ((target - position) - velocity)`, a proportional
//!    controller on velocity that fades out as the agent arrives.
//! 2. **Avoidance**: for each neighbor whose time-to-collision `t` falls in
//!    `[0, horizon]`, a push along the separation direction scaled by the
//!    urgency `(horizon - t) / (t + ε)`.
//! 3. **Sidestep**: a lateral push with the same urgency, perpendicular to
//!    the separation direction, on the flank the neighbor is not moving
//!    into. Breaks the symmetric head-on standoff where pure avoidance just
//!    brakes both agents.
//!
//! A yielding agent multiplies each neighbor's avoidance and sidestep
//! contribution by its `yield_factor`.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::collision::time_to_collision;
use crate::structs::Agent;

/// Keeps urgency finite when the predicted collision is now.
pub const URGENCY_EPSILON: f64 = 1e-3;

/// Separation vectors shorter than this contribute nothing.
const MIN_SEPARATION: f64 = 1e-12;

/// Which separation direction the avoidance term pushes along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvoidanceDirection {
    /// Separation of the two centers extrapolated to the collision instant.
    #[default]
    Predicted,
    /// Separation of the two centers now.
    Current,
}

/// Per-term breakdown of a steering force, all on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringForces {
    pub goal: Vector2<f64>,
    pub avoid: Vector2<f64>,
    pub sidestep: Vector2<f64>,
}

impl SteeringForces {
    pub fn total(&self) -> Vector2<f64> {
        self.goal + self.avoid + self.sidestep
    }
}

/// Urgency of a collision predicted `t` from now, zero outside `[0, horizon]`.
pub fn urgency(t: f64, horizon: f64) -> f64 {
    if !(0.0..=horizon).contains(&t) {
        return 0.0;
    }
    (horizon - t) / (t + URGENCY_EPSILON)
}

/// Computes the steering terms for `agent` against every other agent in
/// `agents`. The slice may contain `agent` itself; it is skipped by id.
pub fn steering_forces(
    agent: &Agent,
    agents: &[Agent],
    direction: AvoidanceDirection,
) -> SteeringForces {
    let goal = agent.target.planar() - agent.position().planar();
    let velocity = agent.velocity().planar();
    let force_goal = (goal - velocity) * agent.k();

    let mut force_avoid = Vector2::zeros();
    let mut force_sidestep = Vector2::zeros();

    let yield_scale = if agent.yielding {
        agent.yield_factor()
    } else {
        1.0
    };

    for neighbor in agents.iter().filter(|n| n.id() != agent.id()) {
        let t = time_to_collision(agent, neighbor);
        let w = urgency(t, agent.horizon());
        if w == 0.0 {
            continue;
        }

        let Some(dir) = separation_direction(agent, neighbor, t, direction) else {
            continue;
        };

        let scale = w * yield_scale;
        force_avoid += dir * (agent.avoid_weight() * scale);

        let flank = sidestep_flank(dir, neighbor.velocity().planar());
        force_sidestep += flank * (agent.sidestep_weight() * scale);
    }

    SteeringForces {
        goal: force_goal,
        avoid: force_avoid,
        sidestep: force_sidestep,
    }
}

/// Total steering force, see [`steering_forces`].
pub fn steering_force(
    agent: &Agent,
    agents: &[Agent],
    direction: AvoidanceDirection,
) -> Vector2<f64> {
    steering_forces(agent, agents, direction).total()
}

/// Unit vector pointing from `neighbor` to `agent`, or `None` when the two
/// centers coincide.
fn separation_direction(
    agent: &Agent,
    neighbor: &Agent,
    t: f64,
    direction: AvoidanceDirection,
) -> Option<Vector2<f64>> {
    let separation = match direction {
        AvoidanceDirection::Predicted => {
            let ahead = agent.position().planar() + agent.velocity().planar() * t;
            let other = neighbor.position().planar() + neighbor.velocity().planar() * t;
            ahead - other
        }
        AvoidanceDirection::Current => agent.position().planar() - neighbor.position().planar(),
    };
    separation.try_normalize(MIN_SEPARATION)
}

/// Picks the lateral direction to slide toward, given the unit separation
/// direction and the neighbor's velocity.
///
/// `left` and `right` are `dir` rotated by ±90° about the vertical axis.
/// A flank with a negative dot against the neighbor's velocity is one the
/// neighbor is not moving into; if both qualify the more negative wins, if
/// neither does `left` is used.
pub fn sidestep_flank(dir: Vector2<f64>, neighbor_velocity: Vector2<f64>) -> Vector2<f64> {
    let left = Vector2::new(-dir.y, dir.x);
    let right = Vector2::new(dir.y, -dir.x);

    let left_dot = left.dot(&neighbor_velocity);
    let right_dot = right.dot(&neighbor_velocity);

    match (left_dot < 0.0, right_dot < 0.0) {
        (true, true) => {
            if left_dot <= right_dot {
                left
            } else {
                right
            }
        }
        (true, false) => left,
        (false, true) => right,
        (false, false) => left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{AgentParams, Vector3D};
    use approx::assert_relative_eq;

    fn make_agent(id: usize, pos: (f64, f64), vel: (f64, f64), target: (f64, f64)) -> Agent {
        Agent::new(
            id,
            Vector3D::new(pos.0, 0.0, pos.1),
            Vector3D::new(vel.0, 0.0, vel.1),
            Vector3D::new(target.0, 0.0, target.1),
            AgentParams::new(0.5, 2.0, 20.0, 5.0, 2.0).with_weights(1.0, 1.0),
        )
        .unwrap()
    }

    // --- urgency ---

    #[test]
    fn test_urgency_profile() {
        assert_eq!(urgency(f64::INFINITY, 5.0), 0.0);
        assert_eq!(urgency(6.0, 5.0), 0.0);
        assert_eq!(urgency(-1.0, 5.0), 0.0);
        assert_eq!(urgency(5.0, 5.0), 0.0);
        assert_relative_eq!(urgency(0.0, 5.0), 5.0 / URGENCY_EPSILON);
        assert!(urgency(0.5, 5.0) > urgency(1.0, 5.0));
        assert!(urgency(1.0, 5.0) > urgency(4.0, 5.0));
    }

    // --- goal force ---

    #[test]
    fn test_goal_force_alone() {
        let agent = make_agent(0, (0.0, 0.0), (1.0, 0.0), (4.0, 3.0));
        let forces = steering_forces(&agent, &[agent.clone()], AvoidanceDirection::Predicted);

        // k * (goal - velocity) = 2 * ((4, 3) - (1, 0))
        assert_relative_eq!(forces.goal.x, 6.0);
        assert_relative_eq!(forces.goal.y, 6.0);
        assert_eq!(forces.avoid, Vector2::zeros());
        assert_eq!(forces.sidestep, Vector2::zeros());
        assert_eq!(forces.total(), forces.goal);
    }

    #[test]
    fn test_goal_force_zero_at_rest_on_target() {
        let agent = make_agent(0, (3.0, 3.0), (0.0, 0.0), (3.0, 3.0));
        let force = steering_force(&agent, &[], AvoidanceDirection::Predicted);
        assert_eq!(force, Vector2::zeros());
    }

    #[test]
    fn test_goal_ignores_height() {
        let mut agent = make_agent(0, (0.0, 0.0), (0.0, 0.0), (1.0, 0.0));
        agent.target = Vector3D::new(1.0, 50.0, 0.0);
        let force = steering_force(&agent, &[], AvoidanceDirection::Predicted);
        assert_relative_eq!(force.x, 2.0);
        assert_relative_eq!(force.y, 0.0);
    }

    // --- avoidance ---

    #[test]
    fn test_head_on_avoidance_pushes_back() {
        let a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (0.0, 0.0));
        let b = make_agent(1, (4.0, 0.0), (-1.0, 0.0), (0.0, 0.0));
        let agents = vec![a.clone(), b];

        let forces = steering_forces(&a, &agents, AvoidanceDirection::Predicted);
        // t = (4 - 1) / 2 = 1.5, inside horizon 5
        let expected = urgency(1.5, 5.0);
        assert_relative_eq!(forces.avoid.x, -expected, epsilon = 1e-9);
        assert_relative_eq!(forces.avoid.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_beyond_horizon_is_ignored() {
        let a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (0.0, 0.0));
        let b = make_agent(1, (40.0, 0.0), (-1.0, 0.0), (0.0, 0.0));
        let forces = steering_forces(&a, &[a.clone(), b], AvoidanceDirection::Predicted);
        assert_eq!(forces.avoid, Vector2::zeros());
        assert_eq!(forces.sidestep, Vector2::zeros());
    }

    #[test]
    fn test_self_excluded_by_id() {
        let a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (0.0, 0.0));
        // A distinct copy with the same id at an overlapping position
        let mut twin = a.clone();
        twin.position = Vector3D::new(0.2, 0.0, 0.0);
        let forces = steering_forces(&a, &[a.clone(), twin], AvoidanceDirection::Current);
        assert_eq!(forces.avoid, Vector2::zeros());
    }

    #[test]
    fn test_coincident_agents_contribute_zero() {
        let a = make_agent(0, (1.0, 1.0), (0.0, 0.0), (1.0, 1.0));
        let b = make_agent(1, (1.0, 1.0), (0.0, 0.0), (1.0, 1.0));
        let agents = vec![a.clone(), b];

        for direction in [AvoidanceDirection::Predicted, AvoidanceDirection::Current] {
            let forces = steering_forces(&a, &agents, direction);
            assert_eq!(forces.avoid, Vector2::zeros());
            assert_eq!(forces.sidestep, Vector2::zeros());
            assert!(forces.total().x.is_finite() && forces.total().y.is_finite());
        }
    }

    #[test]
    fn test_overlap_uses_current_separation() {
        // t = 0, so the predicted direction equals the current one
        let a = make_agent(0, (0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
        let b = make_agent(1, (0.0, 0.6), (0.0, 0.0), (0.0, 0.6));
        let agents = vec![a.clone(), b];

        let predicted = steering_forces(&a, &agents, AvoidanceDirection::Predicted);
        let current = steering_forces(&a, &agents, AvoidanceDirection::Current);
        assert_eq!(predicted.avoid, current.avoid);
        assert!(predicted.avoid.y < 0.0, "should push away along -z");
    }

    #[test]
    fn test_predicted_and_current_directions_differ_for_crossing() {
        let a = make_agent(0, (-3.0, 0.0), (1.0, 0.0), (10.0, 0.0));
        let b = make_agent(1, (0.0, -4.0), (0.0, 1.5), (0.0, 10.0));
        let agents = vec![a.clone(), b];

        let predicted = steering_forces(&a, &agents, AvoidanceDirection::Predicted);
        let current = steering_forces(&a, &agents, AvoidanceDirection::Current);
        assert!(predicted.avoid.norm() > 0.0);
        assert!(current.avoid.norm() > 0.0);
        // Same urgency, different directions
        assert_relative_eq!(predicted.avoid.norm(), current.avoid.norm(), epsilon = 1e-9);
        assert!((predicted.avoid - current.avoid).norm() > 1e-6);
    }

    #[test]
    fn test_avoid_weight_scales_linearly() {
        let a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (0.0, 0.0));
        let b = make_agent(1, (4.0, 0.0), (-1.0, 0.0), (0.0, 0.0));
        let base = steering_forces(&a, &[a.clone(), b.clone()], AvoidanceDirection::Predicted);

        let mut heavy = a.clone();
        heavy.set_avoid_weight(3.0).unwrap();
        let scaled = steering_forces(&heavy, &[heavy.clone(), b], AvoidanceDirection::Predicted);
        assert_relative_eq!(scaled.avoid.x, base.avoid.x * 3.0, epsilon = 1e-9);
    }

    // --- sidestep ---

    #[test]
    fn test_sidestep_flank_rules() {
        let dir = Vector2::new(1.0, 0.0);
        let left = Vector2::new(0.0, 1.0);
        let right = Vector2::new(0.0, -1.0);

        // Neighbor drifting toward +z: left·v > 0, right·v < 0 -> right
        assert_eq!(sidestep_flank(dir, Vector2::new(0.0, 2.0)), right);
        // Neighbor drifting toward -z -> left
        assert_eq!(sidestep_flank(dir, Vector2::new(0.0, -2.0)), left);
        // No lateral motion -> default left
        assert_eq!(sidestep_flank(dir, Vector2::new(-3.0, 0.0)), left);
        assert_eq!(sidestep_flank(dir, Vector2::zeros()), left);
    }

    #[test]
    fn test_symmetric_head_on_sidesteps_opposite_ways() {
        let a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (10.0, 0.0));
        let b = make_agent(1, (4.0, 0.0), (-1.0, 0.0), (-6.0, 0.0));
        let agents = vec![a.clone(), b.clone()];

        let fa = steering_forces(&a, &agents, AvoidanceDirection::Predicted);
        let fb = steering_forces(&b, &agents, AvoidanceDirection::Predicted);

        assert!(fa.sidestep.y.abs() > 0.0);
        assert!(fb.sidestep.y.abs() > 0.0);
        assert!(
            fa.sidestep.y * fb.sidestep.y < 0.0,
            "agents should slide to opposite sides: {:?} vs {:?}",
            fa.sidestep,
            fb.sidestep
        );
        // Mirror images of each other
        assert_relative_eq!(fa.sidestep.y, -fb.sidestep.y, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_sidestep_weight_disables_sidestep() {
        let mut a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (10.0, 0.0));
        a.set_sidestep_weight(0.0).unwrap();
        let b = make_agent(1, (4.0, 0.0), (-1.0, 0.0), (-6.0, 0.0));
        let forces = steering_forces(&a, &[a.clone(), b], AvoidanceDirection::Predicted);
        assert_eq!(forces.sidestep, Vector2::zeros());
        assert!(forces.avoid.norm() > 0.0);
    }

    // --- yield ---

    #[test]
    fn test_yielding_amplifies_avoidance() {
        let a = make_agent(0, (0.0, 0.0), (1.0, 0.0), (10.0, 0.0));
        let b = make_agent(1, (4.0, 0.0), (-1.0, 0.0), (-6.0, 0.0));

        let normal = steering_forces(&a, &[a.clone(), b.clone()], AvoidanceDirection::Predicted);

        let mut yielding = a.clone();
        yielding.yielding = true;
        yielding.set_yield_factor(2.5).unwrap();
        let amplified =
            steering_forces(&yielding, &[yielding.clone(), b], AvoidanceDirection::Predicted);

        assert_relative_eq!(amplified.avoid.x, normal.avoid.x * 2.5, epsilon = 1e-9);
        assert_relative_eq!(amplified.sidestep.y, normal.sidestep.y * 2.5, epsilon = 1e-9);
        assert_eq!(amplified.goal, normal.goal, "yield must not affect the goal term");
    }

    #[test]
    fn test_multiple_neighbors_accumulate() {
        let a = make_agent(0, (0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
        // Two stationary neighbors on either side, both overlapping a
        let left = make_agent(1, (-0.8, 0.0), (0.0, 0.0), (-0.8, 0.0));
        let right = make_agent(2, (0.8, 0.0), (0.0, 0.0), (0.8, 0.0));
        let forces = steering_forces(&a, &[left, a.clone(), right], AvoidanceDirection::Current);
        assert_relative_eq!(forces.avoid.x, 0.0, epsilon = 1e-9);
    }
}
