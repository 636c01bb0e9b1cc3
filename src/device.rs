//! Wireless device installation.
//!
//! Every node gets exactly one 802.11b ad-hoc interface on a single shared
//! channel. Rate control is the same for all devices; there is no per-node
//! override.

use serde::Serialize;
use std::fmt;

use crate::artifacts::ArtifactPaths;
use crate::error::ScenarioError;
use crate::node::{NodeId, NodePopulation};
use crate::sim::SimulatorBackend;

/// PHY standard of the wifi devices
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum WifiStandard {
    Ieee80211b,
}

/// MAC layer flavour
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum MacType {
    /// Independent BSS, no access point
    Adhoc,
}

/// Remote station manager (rate control) policy
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum RateControl {
    /// Fixed data and control modes
    ConstantRate,
}

/// Propagation channel shared by all devices
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ChannelModel {
    /// Constant-speed propagation delay with log-distance loss
    YansDefault,
}

/// Radio configuration applied uniformly to every device
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct WifiSettings {
    pub standard: WifiStandard,
    pub mac: MacType,
    pub rate_control: RateControl,
    pub channel: ChannelModel,
    /// Transmission mode for broadcast frames (DSDV updates are broadcast)
    pub non_unicast_mode: String,
    /// Frames larger than this use RTS/CTS, in bytes
    pub rts_cts_threshold: u32,
}

impl Default for WifiSettings {
    fn default() -> Self {
        Self {
            standard: WifiStandard::Ieee80211b,
            mac: MacType::Adhoc,
            rate_control: RateControl::ConstantRate,
            channel: ChannelModel::YansDefault,
            non_unicast_mode: "DsssRate11Mbps".to_string(),
            rts_cts_threshold: 2000,
        }
    }
}

/// A network interface attached to a node
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceHandle {
    pub node: NodeId,
    /// Index of the device on its node
    pub index: u32,
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.node, self.index)
    }
}

/// Installs wifi devices and their traces on a population
#[derive(Debug, Clone, Default)]
pub struct DeviceLayer {
    settings: WifiSettings,
}

impl DeviceLayer {
    pub fn settings(&self) -> &WifiSettings {
        &self.settings
    }

    /// Attach one device per node, in population order.
    ///
    /// Also enables the ASCII trace (`<name>.tr`) and one pcap capture per
    /// device (`<name>-<node>-<device>.pcap`).
    pub fn attach<B: SimulatorBackend + ?Sized>(
        &self,
        backend: &mut B,
        population: &NodePopulation,
        paths: &ArtifactPaths,
    ) -> Result<Vec<DeviceHandle>, ScenarioError> {
        let devices = backend.install_wifi(population.ids(), &self.settings)?;

        let in_order = devices.len() == population.len()
            && devices.iter().zip(population.iter()).all(|(d, n)| d.node == n);
        if !in_order {
            return Err(ScenarioError::rejected(
                "wifi installation",
                "devices do not match the population one-to-one",
            ));
        }

        backend.enable_ascii_trace(&paths.ascii_trace());
        backend.enable_pcap(paths.base());

        log::debug!("Attached {} wifi devices ({:?})", devices.len(), self.settings.standard);
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EventKernel;

    #[test]
    fn test_one_device_per_node_in_order() {
        let mut kernel = EventKernel::new();
        let population = NodePopulation::create(&mut kernel, 4).unwrap();
        let paths = ArtifactPaths::new("out", "test");

        let devices = DeviceLayer::default().attach(&mut kernel, &population, &paths).unwrap();

        assert_eq!(devices.len(), 4);
        for (device, node) in devices.iter().zip(population.iter()) {
            assert_eq!(device.node, node);
            assert_eq!(device.index, 0);
        }
        assert_eq!(kernel.ascii_trace_path(), Some(paths.ascii_trace().as_path()));
        assert_eq!(kernel.pcap_prefix(), Some(paths.base()));
    }

    #[test]
    fn test_devices_cannot_be_attached_twice() {
        let mut kernel = EventKernel::new();
        let population = NodePopulation::create(&mut kernel, 2).unwrap();
        let paths = ArtifactPaths::new("out", "test");
        let layer = DeviceLayer::default();

        layer.attach(&mut kernel, &population, &paths).unwrap();
        assert!(layer.attach(&mut kernel, &population, &paths).is_err());
    }

    #[test]
    fn test_default_radio_settings() {
        let settings = WifiSettings::default();
        assert_eq!(settings.standard, WifiStandard::Ieee80211b);
        assert_eq!(settings.mac, MacType::Adhoc);
        assert_eq!(settings.non_unicast_mode, "DsssRate11Mbps");
        assert_eq!(settings.rts_cts_threshold, 2000);
    }
}
