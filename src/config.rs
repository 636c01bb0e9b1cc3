use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScenarioError;

/// Grid side length used when no value is supplied
pub const DEFAULT_SIDES: i64 = 2;
/// Node speed in m/s used when no value is supplied
pub const DEFAULT_SPEED: i64 = 500;
/// Payload size in bytes used when no value is supplied
pub const DEFAULT_PACKAGE: i64 = 1000;
/// Link data rate in kbps used when no value is supplied
pub const DEFAULT_DATA_RATE: i64 = 8;
/// Inter-node spacing in meters used when no value is supplied
pub const DEFAULT_DISTANCE: i64 = 100;
/// Topology mode code used when no value is supplied (fixed layout)
pub const DEFAULT_NETWORK_TYPE: i64 = 0;
/// Side of the mobility bounding box in meters used when no value is supplied
pub const DEFAULT_AREA_SIZE: i64 = 200;
/// Routing update period in seconds used when no value is supplied
pub const DEFAULT_UPDATE_INTERVAL: i64 = 6;

/// Algorithm producing the initial node coordinates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TopologyMode {
    /// Hard-coded list of positions (`--networkType=0`)
    Fixed,
    /// Regular N x N lattice (`--networkType=1`)
    Grid,
}

impl TopologyMode {
    /// Decode the numeric `--networkType` value
    pub fn from_code(code: i64) -> Result<Self, ScenarioError> {
        match code {
            0 => Ok(TopologyMode::Fixed),
            1 => Ok(TopologyMode::Grid),
            other => Err(ScenarioError::invalid_parameter(
                "networkType",
                other,
                "expected 0 (fixed layout) or 1 (grid)",
            )),
        }
    }

    /// The numeric code accepted on the command line
    pub fn code(self) -> i64 {
        match self {
            TopologyMode::Fixed => 0,
            TopologyMode::Grid => 1,
        }
    }
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyMode::Fixed => write!(f, "fixed"),
            TopologyMode::Grid => write!(f, "grid"),
        }
    }
}

/// Unvalidated scenario parameters, as read from a scenario file or the CLI.
///
/// Field names follow the scenario file format (snake_case); the CLI flags
/// keep their historical camelCase spelling.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RawParameters {
    pub sides: i64,
    pub speed: i64,
    pub package: i64,
    pub data_rate: i64,
    pub distance: i64,
    pub udp: bool,
    pub network_type: i64,
    pub area_size: i64,
    pub update_interval: i64,
}

impl Default for RawParameters {
    fn default() -> Self {
        Self {
            sides: DEFAULT_SIDES,
            speed: DEFAULT_SPEED,
            package: DEFAULT_PACKAGE,
            data_rate: DEFAULT_DATA_RATE,
            distance: DEFAULT_DISTANCE,
            udp: false,
            network_type: DEFAULT_NETWORK_TYPE,
            area_size: DEFAULT_AREA_SIZE,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

/// Validated, immutable scenario configuration.
///
/// Built once from [`RawParameters`] and then passed by reference to every
/// pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    grid_size: u32,
    speed: u32,
    packet_size: u32,
    data_rate_kbps: u32,
    distance: u32,
    enable_traffic: bool,
    topology_mode: TopologyMode,
    area_size: u32,
    update_interval_secs: u32,
}

impl ScenarioConfig {
    /// Validate raw parameters into a configuration
    pub fn from_raw(raw: &RawParameters) -> Result<Self, ScenarioError> {
        Ok(Self {
            grid_size: positive("sides", raw.sides)?,
            speed: non_negative("speed", raw.speed)?,
            packet_size: positive("package", raw.package)?,
            data_rate_kbps: positive("dataRate", raw.data_rate)?,
            distance: positive("distance", raw.distance)?,
            enable_traffic: raw.udp,
            topology_mode: TopologyMode::from_code(raw.network_type)?,
            area_size: positive("areaSize", raw.area_size)?,
            update_interval_secs: positive("updateInterval", raw.update_interval)?,
        })
    }

    /// Grid side length
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Number of nodes in the population (`grid_size²`)
    pub fn node_count(&self) -> usize {
        let side = self.grid_size as usize;
        side * side
    }

    /// Mobility speed in m/s, 0 for static nodes
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Application payload size in bytes
    pub fn packet_size(&self) -> u32 {
        self.packet_size
    }

    /// Application data rate in kbps
    pub fn data_rate_kbps(&self) -> u32 {
        self.data_rate_kbps
    }

    /// Spacing between neighbouring grid nodes in meters
    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn enable_traffic(&self) -> bool {
        self.enable_traffic
    }

    pub fn topology_mode(&self) -> TopologyMode {
        self.topology_mode
    }

    /// Side of the square mobility bounding box in meters
    pub fn area_size(&self) -> u32 {
        self.area_size
    }

    /// DSDV periodic update interval in seconds
    pub fn update_interval_secs(&self) -> u32 {
        self.update_interval_secs
    }
}

/// Check a strictly positive parameter and narrow it to `u32`
fn positive(name: &'static str, value: i64) -> Result<u32, ScenarioError> {
    if value <= 0 {
        return Err(ScenarioError::invalid_parameter(name, value, "must be greater than 0"));
    }
    narrow(name, value)
}

/// Check a non-negative parameter and narrow it to `u32`
fn non_negative(name: &'static str, value: i64) -> Result<u32, ScenarioError> {
    if value < 0 {
        return Err(ScenarioError::invalid_parameter(name, value, "must not be negative"));
    }
    narrow(name, value)
}

fn narrow(name: &'static str, value: i64) -> Result<u32, ScenarioError> {
    u32::try_from(value).map_err(|_| {
        ScenarioError::invalid_parameter(name, value, format!("must not exceed {}", u32::MAX))
    })
}
