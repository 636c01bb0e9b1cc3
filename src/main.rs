use clap::builder::BoolishValueParser;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use manetsim::artifacts::ArtifactPaths;
use manetsim::config::{RawParameters, ScenarioConfig};
use manetsim::config_loader::{apply_cli_overrides, load_parameters, CliOverrides};
use manetsim::observer::LogObserver;
use manetsim::orchestrator::SimulationDriver;
use manetsim::sim::EventKernel;

/// Scenario builder for DSDV mobile ad-hoc network simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, allow_negative_numbers = true)]
struct Args {
    /// Grid side length; the population has sides² nodes
    #[arg(long)]
    sides: Option<i64>,

    /// Mobility speed in m/s, 0 for static nodes
    #[arg(long)]
    speed: Option<i64>,

    /// Application packet size in bytes
    #[arg(long)]
    package: Option<i64>,

    /// Application data rate in kbps
    #[arg(long = "dataRate")]
    data_rate: Option<i64>,

    /// Spacing between grid nodes in meters
    #[arg(long)]
    distance: Option<i64>,

    /// Enable the UDP echo traffic generator
    #[arg(
        long,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    udp: Option<bool>,

    /// Topology mode: 0 = fixed layout, 1 = grid
    #[arg(long = "networkType")]
    network_type: Option<i64>,

    /// Side of the square mobility area in meters
    #[arg(long = "areaSize")]
    area_size: Option<i64>,

    /// DSDV periodic update interval in seconds
    #[arg(long = "updateInterval")]
    update_interval: Option<i64>,

    /// Scenario YAML file; command-line values take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base name of every artifact file
    #[arg(short, long, default_value = "manet")]
    name: String,

    /// Output directory for traces, dumps and the scenario description
    #[arg(short, long, default_value = "manet_output")]
    output: PathBuf,

    /// Build and export the scenario without running the simulation
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            sides: self.sides,
            speed: self.speed,
            package: self.package,
            data_rate: self.data_rate,
            distance: self.distance,
            udp: self.udp,
            network_type: self.network_type,
            area_size: self.area_size,
            update_interval: self.update_interval,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting ManetSim DSDV scenario builder");
    info!("Output directory: {:?}", args.output);

    let mut raw = match &args.config {
        Some(path) => load_parameters(path)?,
        None => RawParameters::default(),
    };
    apply_cli_overrides(&mut raw, &args.overrides());
    let config = ScenarioConfig::from_raw(&raw)?;

    fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", args.output.display()))?;

    let paths = ArtifactPaths::new(&args.output, &args.name);
    let mut driver = SimulationDriver::new(config, paths, EventKernel::new(), LogObserver);

    driver.build()?;
    driver.export()?;

    if args.dry_run {
        info!("Dry run requested, not starting the simulation");
        return Ok(());
    }

    let summary = driver.run()?;
    info!(
        "Simulation completed: {} events, final time {}{}",
        summary.executed_events,
        summary.final_time,
        if summary.exhausted { ", event queue drained" } else { "" }
    );
    info!("Artifacts written under {:?}", driver.paths().base());
    Ok(())
}
