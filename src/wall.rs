//! # Walls
//!
//! Axis-aligned boxes used for positional collision response. A wall never
//! steers agents; after integration each agent that penetrates a wall is
//! moved back out along the shortest direction, leaving its velocity alone.
//!
//! Contact is evaluated on the ground-plane footprint of the box. The
//! height is kept as part of the box geometry for presentation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::error::{CrowdError, Result};
use crate::structs::{Agent, Vector3D};

pub const DEFAULT_THICKNESS: f64 = 0.5;

/// Direction of a wall's long side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallAxis {
    X,
    Z,
}

impl WallAxis {
    /// Maps the scenario-level `vertical` flag: vertical walls run along X.
    pub fn from_vertical(vertical: bool) -> Self {
        if vertical {
            WallAxis::X
        } else {
            WallAxis::Z
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    center: Vector3D,
    width: f64,
    height: f64,
    thickness: f64,
    axis: WallAxis,
}

fn require_dimension(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CrowdError::InvalidWall { name, value })
    }
}

impl Wall {
    pub fn new(width: f64, height: f64, axis: WallAxis, position: Vector3D) -> Result<Self> {
        Wall::with_thickness(width, height, DEFAULT_THICKNESS, axis, position)
    }

    pub fn with_thickness(
        width: f64,
        height: f64,
        thickness: f64,
        axis: WallAxis,
        position: Vector3D,
    ) -> Result<Self> {
        require_dimension("width", width)?;
        require_dimension("height", height)?;
        require_dimension("thickness", thickness)?;
        if !position.is_finite() {
            return Err(CrowdError::InvalidWall {
                name: "position",
                value: f64::NAN,
            });
        }
        Ok(Wall {
            center: position,
            width,
            height,
            thickness,
            axis,
        })
    }

    pub fn center(&self) -> Vector3D {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn axis(&self) -> WallAxis {
        self.axis
    }

    /// Moves the wall; used by scenarios that animate doors.
    pub fn set_position(&mut self, position: Vector3D) {
        self.center = position;
    }

    fn half_extents(&self) -> Vector3D {
        match self.axis {
            WallAxis::X => Vector3D::new(self.width, self.height, self.thickness) * 0.5,
            WallAxis::Z => Vector3D::new(self.thickness, self.height, self.width) * 0.5,
        }
    }

    pub fn min(&self) -> Vector3D {
        self.center - self.half_extents()
    }

    pub fn max(&self) -> Vector3D {
        self.center + self.half_extents()
    }

    /// Closest point of the footprint to `point`, at `point`'s height.
    pub fn closest_point(&self, point: Vector3D) -> Vector3D {
        let (min, max) = (self.min(), self.max());
        Vector3D::new(
            point.x.clamp(min.x, max.x),
            point.y,
            point.z.clamp(min.z, max.z),
        )
    }

    /// Whether a disc of `radius` at `center` overlaps the footprint.
    /// Touching does not count.
    pub fn intersects_sphere(&self, center: Vector3D, radius: f64) -> bool {
        let closest = self.closest_point(center);
        (center - closest).planar().norm_squared() < radius * radius
    }

    /// Pushes `agent` out of the wall if its footprint overlaps it.
    /// Returns whether the agent was moved.
    pub fn resolve(&self, agent: &mut Agent) -> bool {
        let position = agent.position;
        let radius = agent.radius();
        if !self.intersects_sphere(position, radius) {
            return false;
        }

        let closest = self.closest_point(position);
        let push = (position - closest).planar();
        let distance = push.norm();

        // Moving by the penetration depth along the push leaves the center
        // exactly `radius` from the closest point.
        let corrected = if distance > 0.0 {
            closest.planar() + push * (radius / distance)
        } else {
            self.eject_from_inside(position, radius)
        };

        trace!(
            agent = agent.id(),
            depth = radius - distance,
            "resolved wall penetration"
        );
        agent.position = position.with_planar(corrected);
        true
    }

    /// Center on or inside the footprint: leave through the nearest face.
    fn eject_from_inside(&self, position: Vector3D, radius: f64) -> nalgebra::Vector2<f64> {
        let (min, max) = (self.min(), self.max());
        let mut out = position.planar();

        let exits = [
            (position.x - min.x, 0usize, min.x - radius),
            (max.x - position.x, 0usize, max.x + radius),
            (position.z - min.z, 1usize, min.z - radius),
            (max.z - position.z, 1usize, max.z + radius),
        ];

        let mut best = exits[0];
        for exit in &exits[1..] {
            if exit.0 < best.0 {
                best = *exit;
            }
        }
        out[best.1] = best.2;
        out
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wall(center={}, {:.2}x{:.2}x{:.2}, {:?})",
            self.center, self.width, self.height, self.thickness, self.axis
        )
    }
}
