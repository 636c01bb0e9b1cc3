//! Scenario pipeline errors.
//!
//! Every variant is fatal: the pipeline has no retry or partial-run
//! semantics, so any error aborts the scenario before the clock starts.

use std::fmt::Display;

use crate::orchestrator::DriverState;

/// Errors raised while building or running a scenario
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Invalid parameter --{name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("Topology mismatch: layout provides {positions} positions for {nodes} nodes")]
    TopologyMismatch { positions: usize, nodes: usize },
    #[error("Address block {block} exhausted: {requested} devices requested, capacity is {capacity}")]
    AddressExhausted {
        block: String,
        requested: usize,
        capacity: usize,
    },
    #[error("Traffic server node {node} has no address assignment")]
    ServerUnbound { node: u32 },
    #[error("Cannot allocate {requested} simulated nodes")]
    ResourceExhausted { requested: usize },
    #[error("Simulation driver cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: DriverState,
    },
    #[error("Simulator rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
    #[error("Simulator I/O failure: {0}")]
    Backend(#[from] std::io::Error),
}

impl ScenarioError {
    pub fn invalid_parameter(
        name: &'static str,
        value: impl Display,
        reason: impl Into<String>,
    ) -> Self {
        ScenarioError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        ScenarioError::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}
