//! The simulator collaborator contract.
//!
//! The scenario pipeline never touches radio physics, routing convergence or
//! mobility kinematics itself; it drives a backend through this trait.

use std::net::Ipv4Addr;
use std::path::Path;

use super::time::SimTime;
use crate::device::{DeviceHandle, WifiSettings};
use crate::error::ScenarioError;
use crate::mobility::MotionPolicy;
use crate::node::NodeId;
use crate::routing::DsdvSettings;
use crate::topology::Position;
use crate::traffic::{EchoClient, EchoServer, OnOffDefaults};

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Events executed before the run ended
    pub executed_events: u64,
    /// Simulated time when the run ended
    pub final_time: SimTime,
    /// True when no event was left pending when the run stopped
    pub exhausted: bool,
}

/// Operations a discrete-event network simulator exposes to the pipeline.
///
/// All calls happen on one thread during setup; `run` then hands control to
/// the simulator's scheduler until the stop time.
pub trait SimulatorBackend {
    /// Allocate `count` new nodes; fails only when resources run out
    fn create_nodes(&mut self, count: usize) -> Result<Vec<NodeId>, ScenarioError>;

    /// Attach one wifi device per node on a shared channel
    fn install_wifi(
        &mut self,
        nodes: &[NodeId],
        settings: &WifiSettings,
    ) -> Result<Vec<DeviceHandle>, ScenarioError>;

    /// Write a textual trace of device activity to `path`
    fn enable_ascii_trace(&mut self, path: &Path);

    /// Capture every device to `<prefix>-<node>-<device>.pcap`
    fn enable_pcap(&mut self, prefix: &Path);

    /// Bind a node to its initial position and motion model
    fn install_mobility(
        &mut self,
        node: NodeId,
        policy: &MotionPolicy,
        position: Position,
    ) -> Result<(), ScenarioError>;

    /// Install IPv4 (and DSDV when `routing` is set) on every node
    fn install_internet_stack(
        &mut self,
        nodes: &[NodeId],
        routing: Option<&DsdvSettings>,
    ) -> Result<(), ScenarioError>;

    fn assign_address(
        &mut self,
        device: DeviceHandle,
        address: Ipv4Addr,
        mask: Ipv4Addr,
    ) -> Result<(), ScenarioError>;

    /// Defaults picked up by on/off applications created afterwards
    fn set_application_defaults(&mut self, defaults: &OnOffDefaults);

    fn install_echo_server(&mut self, server: &EchoServer) -> Result<(), ScenarioError>;

    fn install_echo_client(&mut self, client: &EchoClient) -> Result<(), ScenarioError>;

    /// Dump all routing tables to `stream` at `first`, then every `period`
    fn schedule_routing_table_dump(
        &mut self,
        first: SimTime,
        period: SimTime,
        stream: &Path,
    ) -> Result<(), ScenarioError>;

    /// Dump all neighbor caches to `stream` at `first`, then every `period`
    fn schedule_neighbor_cache_dump(
        &mut self,
        first: SimTime,
        period: SimTime,
        stream: &Path,
    ) -> Result<(), ScenarioError>;

    /// Execute events until the queue drains or `stop` is reached
    fn run(&mut self, stop: SimTime) -> Result<RunSummary, ScenarioError>;

    /// Release every node, device and application
    fn destroy(&mut self);
}
