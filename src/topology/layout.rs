//! Initial node layouts.
//!
//! Two producers exist: a fixed four-node layout and a regular N x N grid.
//! Both are pure functions of the configuration, so rebuilding a scenario
//! yields the same positions.

use serde::Serialize;
use std::fmt;

use crate::config::{ScenarioConfig, TopologyMode};

/// A point in simulation space, in meters
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Something that produces the ordered initial positions of a population
pub trait PositionProducer {
    fn positions(&self) -> Vec<Position>;
}

/// Four nodes in a diamond inside the default 200 m area: node 0 on one
/// corner, node 3 two hops away on the opposite one.
pub const FIXED_POSITIONS: [Position; 4] = [
    Position::new(100.0, 0.0, 0.0),
    Position::new(0.0, 100.0, 0.0),
    Position::new(200.0, 100.0, 0.0),
    Position::new(100.0, 200.0, 0.0),
];

/// Hard-coded layout, independent of the grid size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedLayout;

impl PositionProducer for FixedLayout {
    fn positions(&self) -> Vec<Position> {
        FIXED_POSITIONS.to_vec()
    }
}

/// Regular lattice with `side * side` nodes spaced `spacing` meters apart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub side: u32,
    pub spacing: f64,
}

impl PositionProducer for GridLayout {
    /// Row-major: index `i * side + j` sits at `(i * spacing, j * spacing, 0)`.
    fn positions(&self) -> Vec<Position> {
        let side = self.side as usize;
        let mut positions = Vec::with_capacity(side * side);
        for i in 0..self.side {
            for j in 0..self.side {
                positions.push(Position::new(
                    f64::from(i) * self.spacing,
                    f64::from(j) * self.spacing,
                    0.0,
                ));
            }
        }
        positions
    }
}

/// Layout selected by the topology mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout {
    Fixed(FixedLayout),
    Grid(GridLayout),
}

impl Layout {
    pub fn for_config(config: &ScenarioConfig) -> Self {
        match config.topology_mode() {
            TopologyMode::Fixed => Layout::Fixed(FixedLayout),
            TopologyMode::Grid => Layout::Grid(GridLayout {
                side: config.grid_size(),
                spacing: f64::from(config.distance()),
            }),
        }
    }
}

impl PositionProducer for Layout {
    fn positions(&self) -> Vec<Position> {
        match self {
            Layout::Fixed(layout) => layout.positions(),
            Layout::Grid(layout) => layout.positions(),
        }
    }
}

/// Build the ordered initial positions for a scenario
pub fn build_positions(config: &ScenarioConfig) -> Vec<Position> {
    Layout::for_config(config).positions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawParameters;

    fn config(sides: i64, distance: i64, network_type: i64) -> ScenarioConfig {
        ScenarioConfig::from_raw(&RawParameters {
            sides,
            distance,
            network_type,
            ..RawParameters::default()
        })
        .unwrap()
    }

    #[test]
    fn test_grid_two_by_two() {
        let positions = build_positions(&config(2, 100, 1));
        assert_eq!(
            positions,
            vec![
                Position::new(0.0, 0.0, 0.0),
                Position::new(0.0, 100.0, 0.0),
                Position::new(100.0, 0.0, 0.0),
                Position::new(100.0, 100.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_grid_size_and_row_major_order() {
        for side in 1..=7u32 {
            let distance = 35;
            let positions = build_positions(&config(i64::from(side), distance, 1));
            assert_eq!(positions.len(), (side * side) as usize);

            for i in 0..side {
                for j in 0..side {
                    let p = positions[(i * side + j) as usize];
                    assert_eq!(p, Position::new(f64::from(i * 35), f64::from(j * 35), 0.0));
                }
            }
        }
    }

    #[test]
    fn test_fixed_ignores_grid_size() {
        assert_eq!(build_positions(&config(2, 100, 0)), FIXED_POSITIONS.to_vec());
        assert_eq!(build_positions(&config(5, 10, 0)).len(), 4);
    }

    #[test]
    fn test_layout_selection() {
        assert_eq!(Layout::for_config(&config(3, 50, 0)), Layout::Fixed(FixedLayout));
        assert_eq!(
            Layout::for_config(&config(3, 50, 1)),
            Layout::Grid(GridLayout { side: 3, spacing: 50.0 })
        );
    }

    #[test]
    fn test_positions_are_deterministic() {
        let cfg = config(4, 25, 1);
        assert_eq!(build_positions(&cfg), build_positions(&cfg));
    }
}
