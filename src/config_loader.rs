use crate::config::RawParameters;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use std::fs::File;
use std::path::Path;

/// Load raw scenario parameters from a YAML file.
///
/// Missing fields fall back to the CLI defaults; unknown fields are an error.
/// Validation happens later, once CLI overrides have been applied.
pub fn load_parameters(config_path: &Path) -> Result<RawParameters> {
    info!("Loading scenario parameters from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open scenario file '{}'", config_path.display()))?;

    let raw: RawParameters = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse scenario file '{}'", config_path.display()))?;

    debug!("Parameters from file: {:?}", raw);
    Ok(raw)
}

/// CLI arguments that override scenario file or default values
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sides: Option<i64>,
    pub speed: Option<i64>,
    pub package: Option<i64>,
    pub data_rate: Option<i64>,
    pub distance: Option<i64>,
    pub udp: Option<bool>,
    pub network_type: Option<i64>,
    pub area_size: Option<i64>,
    pub update_interval: Option<i64>,
}

/// Apply CLI overrides on top of file or default parameters
pub fn apply_cli_overrides(raw: &mut RawParameters, overrides: &CliOverrides) {
    fn set<T: Copy + std::fmt::Debug>(name: &str, slot: &mut T, value: Option<T>) {
        if let Some(value) = value {
            debug!("CLI override --{}={:?}", name, value);
            *slot = value;
        }
    }

    set("sides", &mut raw.sides, overrides.sides);
    set("speed", &mut raw.speed, overrides.speed);
    set("package", &mut raw.package, overrides.package);
    set("dataRate", &mut raw.data_rate, overrides.data_rate);
    set("distance", &mut raw.distance, overrides.distance);
    set("udp", &mut raw.udp, overrides.udp);
    set("networkType", &mut raw.network_type, overrides.network_type);
    set("areaSize", &mut raw.area_size, overrides.area_size);
    set("updateInterval", &mut raw.update_interval, overrides.update_interval);
}
