//! DSDV routing and internet stack installation.
//!
//! The stack helper copies the routing helper's settings when the routing
//! helper is attached. Changing the routing helper afterwards has no effect
//! on nodes installed later, so DSDV parameters must be set first.

use serde::Serialize;

use crate::device::DeviceHandle;
use crate::error::ScenarioError;
use crate::ip::{AddressAssignment, Ipv4Block};
use crate::node::NodePopulation;
use crate::sim::{SimTime, SimulatorBackend};

/// Delay before a route change is advertised
pub const SETTLING_TIME: SimTime = SimTime::from_secs(6);

/// DSDV protocol parameters
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DsdvSettings {
    /// Period of full routing table broadcasts
    pub periodic_update_interval: SimTime,
    pub settling_time: SimTime,
}

impl Default for DsdvSettings {
    fn default() -> Self {
        Self {
            periodic_update_interval: SimTime::from_secs(15),
            settling_time: SimTime::from_secs(5),
        }
    }
}

/// Collects DSDV parameters before stack installation
#[derive(Debug, Clone, Default)]
pub struct DsdvHelper {
    settings: DsdvSettings,
}

impl DsdvHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_periodic_update_interval(&mut self, interval: SimTime) -> &mut Self {
        self.settings.periodic_update_interval = interval;
        self
    }

    pub fn set_settling_time(&mut self, settling_time: SimTime) -> &mut Self {
        self.settings.settling_time = settling_time;
        self
    }

    pub fn settings(&self) -> &DsdvSettings {
        &self.settings
    }
}

/// Installs IPv4 and, when set, a routing protocol on nodes
#[derive(Debug, Clone, Default)]
pub struct InternetStackHelper {
    routing: Option<DsdvSettings>,
}

impl InternetStackHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the helper's current settings for the next [`install`](Self::install)
    pub fn set_routing_helper(&mut self, helper: &DsdvHelper) -> &mut Self {
        self.routing = Some(*helper.settings());
        self
    }

    pub fn install<B: SimulatorBackend + ?Sized>(
        &self,
        backend: &mut B,
        population: &NodePopulation,
    ) -> Result<(), ScenarioError> {
        backend.install_internet_stack(population.ids(), self.routing.as_ref())
    }
}

/// DSDV + IPv4 on every node, then one address per device
#[derive(Debug, Clone, Default)]
pub struct RoutingStack {
    block: Ipv4Block,
}

impl RoutingStack {
    /// DSDV settings for a given periodic update interval
    pub fn dsdv_helper(update_interval: SimTime) -> DsdvHelper {
        let mut dsdv = DsdvHelper::new();
        dsdv.set_periodic_update_interval(update_interval)
            .set_settling_time(SETTLING_TIME);
        dsdv
    }

    pub fn install<B: SimulatorBackend + ?Sized>(
        &self,
        backend: &mut B,
        population: &NodePopulation,
        devices: &[DeviceHandle],
        update_interval: SimTime,
    ) -> Result<AddressAssignment, ScenarioError> {
        // Fails on exhaustion before the simulator is touched
        let assignment = self.block.assign(devices)?;

        let dsdv = Self::dsdv_helper(update_interval);
        let mut stack = InternetStackHelper::new();
        stack.set_routing_helper(&dsdv);
        stack.install(backend, population)?;

        for entry in assignment.iter() {
            backend.assign_address(entry.device, entry.address, self.block.mask())?;
        }

        log::debug!(
            "Installed DSDV (update {}, settling {}) on {} nodes, {} addresses from {}",
            dsdv.settings().periodic_update_interval,
            dsdv.settings().settling_time,
            population.len(),
            assignment.len(),
            self.block
        );
        Ok(assignment)
    }
}
