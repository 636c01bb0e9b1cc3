//! Motion policies and node placement.
//!
//! Placement binds the i-th layout position to the i-th node. What happens
//! to the node afterwards belongs to the simulator's mobility model.

use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::error::ScenarioError;
use crate::node::{NodeId, NodePopulation};
use crate::sim::SimulatorBackend;
use crate::topology::Position;

/// Axis-aligned rectangle in the XY plane, in meters
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// `[0, side] x [0, side]`
    pub fn square(side: f64) -> Self {
        Self {
            x_min: 0.0,
            x_max: side,
            y_min: 0.0,
            y_max: side,
        }
    }

    pub fn contains(&self, position: &Position) -> bool {
        (self.x_min..=self.x_max).contains(&position.x)
            && (self.y_min..=self.y_max).contains(&position.y)
    }
}

/// How nodes move after placement
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub enum MotionPolicy {
    /// Nodes stay at their initial position
    Stationary,
    /// Random direction inside `bounds` at a constant speed
    RandomDirection { speed: f64, bounds: Bounds },
}

impl MotionPolicy {
    pub fn is_stationary(&self) -> bool {
        matches!(self, MotionPolicy::Stationary)
    }
}

/// A node bound to its initial position and motion policy
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct MobilityBinding {
    pub node: NodeId,
    pub position: Position,
    pub policy: MotionPolicy,
}

/// Chooses the motion policy and places the population
#[derive(Debug, Clone, PartialEq)]
pub struct MobilityController {
    policy: MotionPolicy,
}

impl MobilityController {
    /// Stationary when the configured speed is 0, random direction otherwise
    pub fn configure(config: &ScenarioConfig) -> Self {
        let policy = if config.speed() > 0 {
            MotionPolicy::RandomDirection {
                speed: f64::from(config.speed()),
                bounds: Bounds::square(f64::from(config.area_size())),
            }
        } else {
            MotionPolicy::Stationary
        };
        Self { policy }
    }

    pub fn policy(&self) -> &MotionPolicy {
        &self.policy
    }

    /// Bind `positions[i]` to the i-th node.
    ///
    /// Fails with [`ScenarioError::TopologyMismatch`] before touching any node
    /// when the layout and the population differ in size, and with
    /// [`ScenarioError::InvalidParameter`] when moving nodes would start
    /// outside their bounds.
    pub fn place<B: SimulatorBackend + ?Sized>(
        &self,
        backend: &mut B,
        population: &NodePopulation,
        positions: &[Position],
    ) -> Result<Vec<MobilityBinding>, ScenarioError> {
        if positions.len() != population.len() {
            return Err(ScenarioError::TopologyMismatch {
                positions: positions.len(),
                nodes: population.len(),
            });
        }

        if let MotionPolicy::RandomDirection { bounds, .. } = &self.policy {
            let outside = positions.iter().filter(|p| !bounds.contains(p)).count();
            if outside > 0 {
                return Err(ScenarioError::invalid_parameter(
                    "areaSize",
                    bounds.x_max,
                    format!(
                        "{} of {} initial positions lie outside the mobility area",
                        outside,
                        positions.len()
                    ),
                ));
            }
        }

        let mut bindings = Vec::with_capacity(positions.len());
        for (node, position) in population.iter().zip(positions.iter().copied()) {
            backend.install_mobility(node, &self.policy, position)?;
            log::debug!("Placed node {} at {}", node, position);
            bindings.push(MobilityBinding {
                node,
                position,
                policy: self.policy,
            });
        }
        Ok(bindings)
    }
}
