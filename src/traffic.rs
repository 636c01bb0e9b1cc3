//! UDP echo request/response workload.
//!
//! One echo server on node 0 and one client on every other node, each
//! client sending a bounded burst of requests to the server.

use serde::Serialize;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::config::ScenarioConfig;
use crate::error::ScenarioError;
use crate::ip::AddressAssignment;
use crate::node::{NodeId, NodePopulation};
use crate::sim::{SimTime, SimulatorBackend};

/// Default UDP port of the echo server
pub const ECHO_PORT: u16 = 9;

/// Interval of simulated time during which an application runs
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub start: SimTime,
    pub stop: SimTime,
}

impl ActiveWindow {
    pub const fn new(start: SimTime, stop: SimTime) -> Self {
        Self { start, stop }
    }
}

/// Workload parameters
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TrafficSettings {
    pub port: u16,
    pub server_window: ActiveWindow,
    pub client_window: ActiveWindow,
    pub max_requests: u32,
    pub request_interval: SimTime,
    /// Echo request payload in bytes
    pub payload_size: u32,
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            port: ECHO_PORT,
            server_window: ActiveWindow::new(SimTime::from_secs(1), SimTime::from_secs(10)),
            client_window: ActiveWindow::new(SimTime::from_secs(2), SimTime::from_secs(10)),
            max_requests: 1,
            request_interval: SimTime::from_secs(1),
            payload_size: 1024,
        }
    }
}

/// Global defaults for on/off applications
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct OnOffDefaults {
    /// Bytes per packet
    pub packet_size: u32,
    pub data_rate_kbps: u32,
}

impl OnOffDefaults {
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self {
            packet_size: config.packet_size(),
            data_rate_kbps: config.data_rate_kbps(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct EchoServer {
    pub node: NodeId,
    pub address: Ipv4Addr,
    pub port: u16,
    pub window: ActiveWindow,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct EchoClient {
    pub node: NodeId,
    pub remote: SocketAddrV4,
    pub max_requests: u32,
    pub interval: SimTime,
    pub payload_size: u32,
    pub window: ActiveWindow,
}

/// The installed workload
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TrafficFlow {
    pub server: EchoServer,
    pub clients: Vec<EchoClient>,
}

#[derive(Debug, Clone, Default)]
pub struct TrafficGenerator {
    settings: TrafficSettings,
}

impl TrafficGenerator {
    pub fn new(settings: TrafficSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrafficSettings {
        &self.settings
    }

    /// Install the server on node 0 and a client on every other node
    pub fn install<B: SimulatorBackend + ?Sized>(
        &self,
        backend: &mut B,
        population: &NodePopulation,
        addresses: &AddressAssignment,
    ) -> Result<TrafficFlow, ScenarioError> {
        let server_node = population
            .get(0)
            .ok_or(ScenarioError::ServerUnbound { node: 0 })?;
        let server_address = addresses
            .address_of_node(server_node)
            .ok_or(ScenarioError::ServerUnbound {
                node: server_node.index(),
            })?;

        let server = EchoServer {
            node: server_node,
            address: server_address,
            port: self.settings.port,
            window: self.settings.server_window,
        };
        backend.install_echo_server(&server)?;

        let remote = SocketAddrV4::new(server_address, self.settings.port);
        let mut clients = Vec::with_capacity(population.len().saturating_sub(1));
        for node in population.iter().skip(1) {
            let client = EchoClient {
                node,
                remote,
                max_requests: self.settings.max_requests,
                interval: self.settings.request_interval,
                payload_size: self.settings.payload_size,
                window: self.settings.client_window,
            };
            backend.install_echo_client(&client)?;
            clients.push(client);
        }

        log::debug!("Echo server on node {} at {}, {} clients", server_node, remote, clients.len());
        Ok(TrafficFlow { server, clients })
    }
}
