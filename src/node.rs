//! Node population.

use serde::Serialize;
use std::fmt;

use crate::error::ScenarioError;
use crate::sim::SimulatorBackend;

/// Opaque identity of a simulated host
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of nodes of one scenario, in creation order.
///
/// Created once and never resized; nodes live until the simulator is torn
/// down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePopulation {
    nodes: Vec<NodeId>,
}

impl NodePopulation {
    /// Allocate `count` nodes in the simulator
    pub fn create<B: SimulatorBackend + ?Sized>(
        backend: &mut B,
        count: usize,
    ) -> Result<Self, ScenarioError> {
        let nodes = backend.create_nodes(count)?;
        if nodes.len() != count {
            return Err(ScenarioError::rejected(
                "node creation",
                format!("asked for {} nodes, simulator created {}", count, nodes.len()),
            ));
        }
        log::debug!("Created {} nodes", nodes.len());
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EventKernel;

    #[test]
    fn test_create_sizes() {
        for count in [1usize, 4, 9, 25, 100] {
            let mut kernel = EventKernel::new();
            let population = NodePopulation::create(&mut kernel, count).unwrap();
            assert_eq!(population.len(), count);
            assert_eq!(kernel.node_count(), count);
        }
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let mut kernel = EventKernel::new();
        let population = NodePopulation::create(&mut kernel, 3).unwrap();
        let indices: Vec<u32> = population.iter().map(NodeId::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(population.get(2), Some(NodeId::new(2)));
        assert_eq!(population.get(3), None);
    }
}
