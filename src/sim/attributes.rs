//! Translation of typed settings into the simulator's string attributes.
//!
//! This is the only place where type ids and attribute keys appear; the rest
//! of the pipeline works with the typed structs.

use std::collections::BTreeMap;

use crate::device::{ChannelModel, MacType, RateControl, WifiSettings, WifiStandard};
use crate::mobility::MotionPolicy;
use crate::routing::DsdvSettings;
use crate::traffic::{EchoClient, EchoServer, OnOffDefaults};

pub type AttributeMap = BTreeMap<String, String>;

/// A configurable simulator object
pub trait AttributeSource {
    fn type_id(&self) -> &'static str;
    fn attributes(&self) -> AttributeMap;
}

fn attrs<const N: usize>(pairs: [(&str, String); N]) -> AttributeMap {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl AttributeSource for MotionPolicy {
    fn type_id(&self) -> &'static str {
        match self {
            MotionPolicy::Stationary => "ns3::ConstantPositionMobilityModel",
            MotionPolicy::RandomDirection { .. } => "ns3::RandomDirection2dMobilityModel",
        }
    }

    fn attributes(&self) -> AttributeMap {
        match self {
            MotionPolicy::Stationary => AttributeMap::new(),
            MotionPolicy::RandomDirection { speed, bounds } => attrs([
                ("Speed", format!("ns3::ConstantRandomVariable[Constant={}]", speed)),
                (
                    "Bounds",
                    format!("{}|{}|{}|{}", bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max),
                ),
            ]),
        }
    }
}

impl AttributeSource for DsdvSettings {
    fn type_id(&self) -> &'static str {
        "ns3::dsdv::RoutingProtocol"
    }

    fn attributes(&self) -> AttributeMap {
        attrs([
            ("PeriodicUpdateInterval", self.periodic_update_interval.to_string()),
            ("SettlingTime", self.settling_time.to_string()),
        ])
    }
}

impl AttributeSource for WifiSettings {
    fn type_id(&self) -> &'static str {
        "ns3::WifiNetDevice"
    }

    fn attributes(&self) -> AttributeMap {
        let standard = match self.standard {
            WifiStandard::Ieee80211b => "WIFI_PHY_STANDARD_80211b",
        };
        let mac = match self.mac {
            MacType::Adhoc => "ns3::AdhocWifiMac",
        };
        let manager = match self.rate_control {
            RateControl::ConstantRate => "ns3::ConstantRateWifiManager",
        };
        let (phy, channel) = match self.channel {
            ChannelModel::YansDefault => ("ns3::YansWifiPhy", "ns3::YansWifiChannel"),
        };
        attrs([
            ("Standard", standard.to_string()),
            ("Mac", mac.to_string()),
            ("RemoteStationManager", manager.to_string()),
            ("Phy", phy.to_string()),
            ("Channel", channel.to_string()),
        ])
    }
}

impl AttributeSource for EchoServer {
    fn type_id(&self) -> &'static str {
        "ns3::UdpEchoServer"
    }

    fn attributes(&self) -> AttributeMap {
        attrs([("Port", self.port.to_string())])
    }
}

impl AttributeSource for EchoClient {
    fn type_id(&self) -> &'static str {
        "ns3::UdpEchoClient"
    }

    fn attributes(&self) -> AttributeMap {
        attrs([
            ("RemoteAddress", self.remote.ip().to_string()),
            ("RemotePort", self.remote.port().to_string()),
            ("MaxPackets", self.max_requests.to_string()),
            ("Interval", self.interval.to_string()),
            ("PacketSize", self.payload_size.to_string()),
        ])
    }
}

/// Process-wide attribute defaults, keyed by fully qualified attribute path
pub fn global_defaults(wifi: &WifiSettings, on_off: &OnOffDefaults) -> AttributeMap {
    attrs([
        ("ns3::OnOffApplication::PacketSize", on_off.packet_size.to_string()),
        ("ns3::OnOffApplication::DataRate", format!("{}kbps", on_off.data_rate_kbps)),
        ("ns3::WifiRemoteStationManager::NonUnicastMode", wifi.non_unicast_mode.clone()),
        ("ns3::WifiRemoteStationManager::RtsCtsThreshold", wifi.rts_cts_threshold.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mobility::Bounds;
    use crate::node::NodeId;
    use crate::sim::SimTime;
    use crate::traffic::ActiveWindow;
    use std::net::{Ipv4Addr, SocketAddrV4};

    #[test]
    fn test_random_direction_attributes() {
        let policy = MotionPolicy::RandomDirection {
            speed: 500.0,
            bounds: Bounds::square(200.0),
        };
        assert_eq!(policy.type_id(), "ns3::RandomDirection2dMobilityModel");
        let attributes = policy.attributes();
        assert_eq!(attributes["Speed"], "ns3::ConstantRandomVariable[Constant=500]");
        assert_eq!(attributes["Bounds"], "0|200|0|200");
    }

    #[test]
    fn test_stationary_has_no_attributes() {
        assert_eq!(MotionPolicy::Stationary.type_id(), "ns3::ConstantPositionMobilityModel");
        assert!(MotionPolicy::Stationary.attributes().is_empty());
    }

    #[test]
    fn test_dsdv_attributes() {
        let settings = DsdvSettings {
            periodic_update_interval: SimTime::from_secs(6),
            settling_time: SimTime::from_secs(6),
        };
        let attributes = settings.attributes();
        assert_eq!(attributes["PeriodicUpdateInterval"], "+6s");
        assert_eq!(attributes["SettlingTime"], "+6s");
    }

    #[test]
    fn test_echo_client_attributes() {
        let client = EchoClient {
            node: NodeId::new(2),
            remote: SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 1), 9),
            max_requests: 1,
            interval: SimTime::from_secs(1),
            payload_size: 1024,
            window: ActiveWindow::new(SimTime::from_secs(2), SimTime::from_secs(10)),
        };
        let attributes = client.attributes();
        assert_eq!(attributes["RemoteAddress"], "10.1.1.1");
        assert_eq!(attributes["RemotePort"], "9");
        assert_eq!(attributes["MaxPackets"], "1");
        assert_eq!(attributes["PacketSize"], "1024");
    }

    #[test]
    fn test_global_defaults() {
        let defaults = global_defaults(
            &WifiSettings::default(),
            &OnOffDefaults { packet_size: 1000, data_rate_kbps: 8 },
        );
        assert_eq!(defaults["ns3::OnOffApplication::DataRate"], "8kbps");
        assert_eq!(defaults["ns3::OnOffApplication::PacketSize"], "1000");
        assert_eq!(defaults["ns3::WifiRemoteStationManager::RtsCtsThreshold"], "2000");
    }
}
