//! Scenario description and address registry files.
//!
//! The built scenario is translated into the simulator's string-keyed
//! attribute form and written next to the other artifacts, so a run can be
//! inspected or replayed by external tooling.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use crate::artifacts::ArtifactPaths;
use crate::config::ScenarioConfig;
use crate::diagnostics::DiagnosticsSchedule;
use crate::ip::AddressAssignment;
use crate::node::NodeId;
use crate::orchestrator::BuiltScenario;
use crate::sim::{global_defaults, AttributeMap, AttributeSource, SimTime};
use crate::topology::Position;

// ============================================================================
// Scenario Description Types
// ============================================================================

/// Root of `<name>.scenario.yaml`
#[derive(Serialize, Debug)]
pub struct ScenarioDescription {
    /// Run-wide settings
    pub general: GeneralSection,
    /// Process-wide attribute defaults
    pub defaults: AttributeMap,
    /// Wireless device model shared by all nodes
    pub wifi: ObjectDescription,
    /// Routing protocol installed on every node
    pub routing: ObjectDescription,
    /// Address block in CIDR notation
    pub address_block: String,
    pub nodes: Vec<NodeDescription>,
    /// Installed applications, in installation order
    pub applications: Vec<ApplicationDescription>,
    pub diagnostics: DiagnosticsSchedule,
    pub artifacts: ArtifactSection,
}

#[derive(Serialize, Debug)]
pub struct GeneralSection {
    /// Simulated stop time (e.g., "20s")
    pub stop_time: SimTime,
    pub node_count: usize,
    /// Topology mode ("fixed" or "grid")
    pub topology: String,
    pub grid_size: u32,
    /// Whether the UDP echo workload is installed
    pub traffic: bool,
}

/// A simulator object: type id plus string attributes
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ObjectDescription {
    pub type_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: AttributeMap,
}

impl ObjectDescription {
    fn of(source: &impl AttributeSource) -> Self {
        Self {
            type_id: source.type_id().to_string(),
            attributes: source.attributes(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct NodeDescription {
    pub id: NodeId,
    /// Initial position in meters
    pub position: Position,
    pub mobility: ObjectDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Ipv4Addr>,
}

#[derive(Serialize, Debug)]
pub struct ApplicationDescription {
    pub node: NodeId,
    #[serde(flatten)]
    pub object: ObjectDescription,
    pub start: SimTime,
    pub stop: SimTime,
}

/// Artifact locations
#[derive(Serialize, Debug)]
pub struct ArtifactSection {
    pub ascii_trace: PathBuf,
    /// Capture files are `<pcap_prefix>-<node>-<device>.pcap`
    pub pcap_prefix: PathBuf,
    pub routes: PathBuf,
    pub neighbor: PathBuf,
}

// ============================================================================
// Address Registry Types
// ============================================================================

/// One entry of the address registry
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct AddressRecord {
    pub node: NodeId,
    /// Device handle as `<node>-<index>`
    pub device: String,
    pub address: Ipv4Addr,
}

/// Root of `<name>.addresses.json`
#[derive(Serialize, Debug)]
pub struct AddressRegistry {
    pub block: String,
    pub addresses: Vec<AddressRecord>,
}

impl AddressRegistry {
    pub fn from_assignment(assignment: &AddressAssignment) -> Self {
        Self {
            block: assignment.block().to_string(),
            addresses: assignment
                .iter()
                .map(|entry| AddressRecord {
                    node: entry.device.node,
                    device: entry.device.to_string(),
                    address: entry.address,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Translate a built scenario into its attribute form
pub fn describe(
    config: &ScenarioConfig,
    scenario: &BuiltScenario,
    paths: &ArtifactPaths,
    stop_time: SimTime,
) -> ScenarioDescription {
    let nodes = scenario
        .bindings
        .iter()
        .map(|binding| NodeDescription {
            id: binding.node,
            position: binding.position,
            mobility: ObjectDescription::of(&binding.policy),
            address: scenario.addresses.address_of_node(binding.node),
        })
        .collect();

    let mut applications = Vec::new();
    if let Some(flow) = &scenario.traffic {
        applications.push(ApplicationDescription {
            node: flow.server.node,
            object: ObjectDescription::of(&flow.server),
            start: flow.server.window.start,
            stop: flow.server.window.stop,
        });
        applications.extend(flow.clients.iter().map(|client| ApplicationDescription {
            node: client.node,
            object: ObjectDescription::of(client),
            start: client.window.start,
            stop: client.window.stop,
        }));
    }

    ScenarioDescription {
        general: GeneralSection {
            stop_time,
            node_count: scenario.population.len(),
            topology: config.topology_mode().to_string(),
            grid_size: config.grid_size(),
            traffic: config.enable_traffic(),
        },
        defaults: global_defaults(&scenario.wifi, &scenario.app_defaults),
        wifi: ObjectDescription::of(&scenario.wifi),
        routing: ObjectDescription::of(&scenario.routing),
        address_block: scenario.addresses.block().to_string(),
        nodes,
        applications,
        diagnostics: scenario.diagnostics.clone(),
        artifacts: ArtifactSection {
            ascii_trace: paths.ascii_trace(),
            pcap_prefix: paths.base().to_path_buf(),
            routes: paths.routes(),
            neighbor: paths.neighbor(),
        },
    }
}

/// Write `<name>.scenario.yaml`
pub fn write_scenario(
    output_path: &Path,
    config: &ScenarioConfig,
    scenario: &BuiltScenario,
    paths: &ArtifactPaths,
    stop_time: SimTime,
) -> Result<()> {
    let description = describe(config, scenario, paths, stop_time);
    let yaml = serde_yaml::to_string(&description)
        .wrap_err("Failed to serialize scenario description")?;
    std::fs::write(output_path, yaml)
        .wrap_err_with(|| format!("Failed to write scenario description to '{}'", output_path.display()))?;

    info!("Wrote scenario description to {:?}", output_path);
    Ok(())
}

/// Write `<name>.addresses.json`
pub fn write_address_registry(output_path: &Path, assignment: &AddressAssignment) -> Result<()> {
    let registry = AddressRegistry::from_assignment(assignment);
    let json = serde_json::to_string_pretty(&registry)
        .wrap_err("Failed to serialize address registry")?;
    std::fs::write(output_path, json)
        .wrap_err_with(|| format!("Failed to write address registry to '{}'", output_path.display()))?;

    info!("Wrote {} addresses to {:?}", registry.addresses.len(), output_path);
    Ok(())
}
