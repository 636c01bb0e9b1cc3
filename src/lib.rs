//! # ManetSim - Scenario builder for DSDV mobile ad-hoc network simulations
//!
//! This library builds and drives discrete-event simulations of a wireless
//! ad-hoc network running the DSDV proactive distance-vector routing protocol.
//!
//! ## Overview
//!
//! A scenario is described by a handful of parameters (grid size, node speed,
//! packet size, data rate, node spacing, routing update interval, topology
//! mode, traffic on/off). From these the pipeline creates a node population,
//! attaches 802.11b ad-hoc devices, places and optionally moves the nodes,
//! installs DSDV and the IPv4 stack, optionally layers a UDP echo workload on
//! top, and schedules periodic routing-table and neighbor-cache dumps.
//!
//! ## Architecture
//!
//! - `config`: Validated scenario parameters
//! - `config_loader`: Scenario file loading and CLI overrides
//! - `topology`: Initial node layouts (fixed list or regular grid)
//! - `node`: Node population
//! - `device`: Wireless device installation and tracing
//! - `mobility`: Motion policies and node placement
//! - `routing`: DSDV helper and internet stack installation
//! - `ip`: IPv4 address block allocation
//! - `traffic`: UDP echo request/response workload
//! - `diagnostics`: Periodic routing and neighbor dumps
//! - `sim`: Simulator backend contract and the in-process event kernel
//! - `artifacts`: Names of every file a run produces
//! - `export`: Scenario description and address registry files
//! - `observer`: Pipeline progress reporting
//! - `orchestrator`: The simulation driver tying the pipeline together
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use manetsim::artifacts::ArtifactPaths;
//! use manetsim::config::{RawParameters, ScenarioConfig};
//! use manetsim::observer::LogObserver;
//! use manetsim::orchestrator::SimulationDriver;
//! use manetsim::sim::EventKernel;
//!
//! let config = ScenarioConfig::from_raw(&RawParameters::default())?;
//! let paths = ArtifactPaths::new("manet_output", "manet");
//! let mut driver = SimulationDriver::new(config, paths, EventKernel::new(), LogObserver);
//! driver.build()?;
//! let summary = driver.run()?;
//! println!("executed {} events", summary.executed_events);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Pipeline failures are reported as [`error::ScenarioError`]. The binary and
//! file-producing helpers use `color_eyre` for context-rich reporting.

pub mod artifacts;
pub mod config;
pub mod config_loader;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod ip;
pub mod mobility;
pub mod node;
pub mod observer;
pub mod orchestrator;
pub mod routing;
pub mod sim;
pub mod topology;
pub mod traffic;

pub use config::{RawParameters, ScenarioConfig, TopologyMode};
pub use error::ScenarioError;
pub use orchestrator::{DriverState, SimulationDriver};
