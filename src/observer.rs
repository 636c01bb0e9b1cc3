//! Pipeline progress reporting.
//!
//! The driver reports every stage through a [`PipelineObserver`] instead of
//! logging directly, so embedders and tests can watch the pipeline.

use log::info;

use crate::config::ScenarioConfig;
use crate::mobility::MotionPolicy;
use crate::sim::{RunSummary, SimTime};

/// A milestone of scenario construction or execution
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Effective parameters, before anything is built
    ParametersAccepted(ScenarioConfig),
    NodesCreated { count: usize },
    DevicesAttached { count: usize },
    NodesPlaced { count: usize, policy: MotionPolicy },
    StackInstalled { addresses: usize, update_interval: SimTime },
    TrafficInstalled { server: u32, clients: usize },
    TrafficSkipped,
    DiagnosticsScheduled { period: SimTime },
    SimulationStarted { stop: SimTime },
    SimulationStopped(RunSummary),
}

pub trait PipelineObserver {
    fn on_event(&mut self, event: &PipelineEvent);
}

impl<O: PipelineObserver + ?Sized> PipelineObserver for &mut O {
    fn on_event(&mut self, event: &PipelineEvent) {
        (**self).on_event(event);
    }
}

/// Forwards pipeline events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ParametersAccepted(config) => {
                info!("Scenario parameters:");
                info!("  sides:          {} ({} nodes)", config.grid_size(), config.node_count());
                info!("  speed:          {} m/s", config.speed());
                info!("  package:        {} bytes", config.packet_size());
                info!("  dataRate:       {} kbps", config.data_rate_kbps());
                info!("  distance:       {} m", config.distance());
                info!("  udp:            {}", config.enable_traffic());
                info!("  networkType:    {}", config.topology_mode());
                info!("  areaSize:       {} m", config.area_size());
                info!("  updateInterval: {} s", config.update_interval_secs());
            }
            PipelineEvent::NodesCreated { count } => info!("Created {} nodes", count),
            PipelineEvent::DevicesAttached { count } => {
                info!("Attached {} 802.11b ad-hoc devices", count)
            }
            PipelineEvent::NodesPlaced { count, policy } => match policy {
                MotionPolicy::Stationary => info!("Placed {} stationary nodes", count),
                MotionPolicy::RandomDirection { speed, bounds } => info!(
                    "Placed {} nodes moving at {} m/s within {}x{} m",
                    count, speed, bounds.x_max, bounds.y_max
                ),
            },
            PipelineEvent::StackInstalled {
                addresses,
                update_interval,
            } => info!(
                "Installed DSDV (update interval {}) and {} IPv4 addresses",
                update_interval, addresses
            ),
            PipelineEvent::TrafficInstalled { server, clients } => {
                info!("Echo server on node {}, {} clients", server, clients)
            }
            PipelineEvent::TrafficSkipped => info!("Traffic generator disabled"),
            PipelineEvent::DiagnosticsScheduled { period } => {
                info!("Routing and neighbor dumps every {}", period)
            }
            PipelineEvent::SimulationStarted { stop } => info!("Running simulation until {}", stop),
            PipelineEvent::SimulationStopped(summary) => info!(
                "Simulation stopped at {} after {} events",
                summary.final_time, summary.executed_events
            ),
        }
    }
}

/// Keeps every event, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<PipelineEvent>,
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        self.events.push(event.clone());
    }
}
