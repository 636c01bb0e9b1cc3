//! Scenario orchestrator.
//!
//! This module coordinates the scenario pipeline: node creation, devices,
//! placement, routing and addressing, traffic and diagnostics, then hands
//! control to the simulator until the stop time.

use crate::artifacts::ArtifactPaths;
use crate::config::ScenarioConfig;
use crate::device::{DeviceHandle, DeviceLayer, WifiSettings};
use crate::diagnostics::{DiagnosticsSchedule, DiagnosticsSink};
use crate::error::ScenarioError;
use crate::export;
use crate::ip::AddressAssignment;
use crate::mobility::{MobilityBinding, MobilityController};
use crate::node::NodePopulation;
use crate::observer::{PipelineEvent, PipelineObserver};
use crate::routing::{DsdvSettings, RoutingStack};
use crate::sim::{RunSummary, SimTime, SimulatorBackend};
use crate::topology::{build_positions, Position};
use crate::traffic::{OnOffDefaults, TrafficFlow, TrafficGenerator};

/// Simulated time at which every run stops
pub const STOP_TIME: SimTime = SimTime::from_secs(20);

/// Lifecycle of a [`SimulationDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Unconfigured,
    Built,
    Running,
    Stopped,
}

/// Everything the build phase produced
#[derive(Debug, Clone)]
pub struct BuiltScenario {
    pub population: NodePopulation,
    pub devices: Vec<DeviceHandle>,
    pub positions: Vec<Position>,
    pub bindings: Vec<MobilityBinding>,
    pub addresses: AddressAssignment,
    pub traffic: Option<TrafficFlow>,
    pub diagnostics: DiagnosticsSchedule,
    pub wifi: WifiSettings,
    pub routing: DsdvSettings,
    pub app_defaults: OnOffDefaults,
}

/// Drives one scenario through `Unconfigured → Built → Running → Stopped`.
///
/// Transitions out of order fail with [`ScenarioError::InvalidState`].
/// A failed build tears the backend down and leaves the driver `Stopped`.
pub struct SimulationDriver<B: SimulatorBackend, O: PipelineObserver> {
    config: ScenarioConfig,
    paths: ArtifactPaths,
    backend: B,
    observer: O,
    state: DriverState,
    scenario: Option<BuiltScenario>,
}

impl<B: SimulatorBackend, O: PipelineObserver> SimulationDriver<B, O> {
    pub fn new(config: ScenarioConfig, paths: ArtifactPaths, backend: B, observer: O) -> Self {
        Self {
            config,
            paths,
            backend,
            observer,
            state: DriverState::Unconfigured,
            scenario: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// The built scenario; `None` before a successful build
    pub fn scenario(&self) -> Option<&BuiltScenario> {
        self.scenario.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Build the whole scenario in the simulator
    pub fn build(&mut self) -> Result<&BuiltScenario, ScenarioError> {
        self.expect_state(DriverState::Unconfigured, "build")?;

        match self.build_stages() {
            Ok(scenario) => {
                self.state = DriverState::Built;
                Ok(self.scenario.insert(scenario))
            }
            Err(e) => {
                log::error!("Scenario build failed: {}", e);
                self.backend.destroy();
                self.state = DriverState::Stopped;
                Err(e)
            }
        }
    }

    fn build_stages(&mut self) -> Result<BuiltScenario, ScenarioError> {
        let config = &self.config;
        let backend = &mut self.backend;
        let observer = &mut self.observer;

        observer.on_event(&PipelineEvent::ParametersAccepted(config.clone()));

        let population = NodePopulation::create(backend, config.node_count())?;
        observer.on_event(&PipelineEvent::NodesCreated {
            count: population.len(),
        });

        let device_layer = DeviceLayer::default();
        let devices = device_layer.attach(backend, &population, &self.paths)?;
        observer.on_event(&PipelineEvent::DevicesAttached {
            count: devices.len(),
        });

        let app_defaults = OnOffDefaults::from_config(config);
        backend.set_application_defaults(&app_defaults);

        let positions = build_positions(config);
        let mobility = MobilityController::configure(config);
        let bindings = mobility.place(backend, &population, &positions)?;
        observer.on_event(&PipelineEvent::NodesPlaced {
            count: bindings.len(),
            policy: *mobility.policy(),
        });

        let update_interval = SimTime::from_secs(u64::from(config.update_interval_secs()));
        let routing_stack = RoutingStack::default();
        let addresses = routing_stack.install(backend, &population, &devices, update_interval)?;
        observer.on_event(&PipelineEvent::StackInstalled {
            addresses: addresses.len(),
            update_interval,
        });

        let traffic = if config.enable_traffic() {
            let flow = TrafficGenerator::default().install(backend, &population, &addresses)?;
            observer.on_event(&PipelineEvent::TrafficInstalled {
                server: flow.server.node.index(),
                clients: flow.clients.len(),
            });
            Some(flow)
        } else {
            observer.on_event(&PipelineEvent::TrafficSkipped);
            None
        };

        let diagnostics = DiagnosticsSink::new(&self.paths).schedule(backend, update_interval)?;
        observer.on_event(&PipelineEvent::DiagnosticsScheduled {
            period: diagnostics.period,
        });

        Ok(BuiltScenario {
            population,
            devices,
            positions,
            bindings,
            addresses,
            traffic,
            diagnostics,
            wifi: device_layer.settings().clone(),
            routing: *RoutingStack::dsdv_helper(update_interval).settings(),
            app_defaults,
        })
    }

    /// Write the scenario description and the address registry
    pub fn export(&self) -> color_eyre::Result<()> {
        self.expect_state(DriverState::Built, "export")?;
        let scenario = self.scenario.as_ref().ok_or(ScenarioError::InvalidState {
            action: "export",
            state: self.state,
        })?;

        export::write_scenario(&self.paths.scenario(), &self.config, scenario, &self.paths, STOP_TIME)?;
        export::write_address_registry(&self.paths.addresses(), &scenario.addresses)?;
        Ok(())
    }

    /// Run the built scenario until [`STOP_TIME`], then release the simulator
    pub fn run(&mut self) -> Result<RunSummary, ScenarioError> {
        self.expect_state(DriverState::Built, "run")?;

        self.state = DriverState::Running;
        self.observer
            .on_event(&PipelineEvent::SimulationStarted { stop: STOP_TIME });

        let result = self.backend.run(STOP_TIME);

        self.backend.destroy();
        self.scenario = None;
        self.state = DriverState::Stopped;

        let summary = result?;
        self.observer
            .on_event(&PipelineEvent::SimulationStopped(summary));
        Ok(summary)
    }

    fn expect_state(&self, expected: DriverState, action: &'static str) -> Result<(), ScenarioError> {
        if self.state != expected {
            return Err(ScenarioError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawParameters;
    use crate::observer::RecordingObserver;
    use crate::sim::EventKernel;
    use tempfile::tempdir;

    fn config(raw: RawParameters) -> ScenarioConfig {
        ScenarioConfig::from_raw(&raw).unwrap()
    }

    fn grid(sides: i64, udp: bool) -> ScenarioConfig {
        config(RawParameters {
            sides,
            udp,
            speed: 0,
            network_type: 1,
            ..RawParameters::default()
        })
    }

    #[test]
    fn test_build_reports_stages_in_order() {
        let dir = tempdir().unwrap();
        let mut driver = SimulationDriver::new(
            grid(2, true),
            ArtifactPaths::new(dir.path(), "t"),
            EventKernel::new(),
            RecordingObserver::default(),
        );
        driver.build().unwrap();
        assert_eq!(driver.state(), DriverState::Built);

        let events = &driver.observer().events;
        assert!(matches!(events[0], PipelineEvent::ParametersAccepted(_)));
        assert_eq!(events[1], PipelineEvent::NodesCreated { count: 4 });
        assert_eq!(events[2], PipelineEvent::DevicesAttached { count: 4 });
        assert!(matches!(events[3], PipelineEvent::NodesPlaced { count: 4, .. }));
        assert!(matches!(events[4], PipelineEvent::StackInstalled { addresses: 4, .. }));
        assert_eq!(events[5], PipelineEvent::TrafficInstalled { server: 0, clients: 3 });
        assert!(matches!(events[6], PipelineEvent::DiagnosticsScheduled { .. }));
    }

    #[test]
    fn test_build_hands_defaults_to_backend() {
        let dir = tempdir().unwrap();
        let mut driver = SimulationDriver::new(
            config(RawParameters {
                package: 512,
                data_rate: 16,
                ..RawParameters::default()
            }),
            ArtifactPaths::new(dir.path(), "t"),
            EventKernel::new(),
            RecordingObserver::default(),
        );
        driver.build().unwrap();

        assert_eq!(
            driver.backend().application_defaults(),
            Some(&OnOffDefaults {
                packet_size: 512,
                data_rate_kbps: 16
            })
        );
        assert_eq!(driver.backend().wifi_settings(), Some(&WifiSettings::default()));
    }

    #[test]
    fn test_build_failure_stops_driver() {
        let dir = tempdir().unwrap();
        let mut driver = SimulationDriver::new(
            config(RawParameters {
                sides: 5,
                network_type: 0,
                ..RawParameters::default()
            }),
            ArtifactPaths::new(dir.path(), "t"),
            EventKernel::new(),
            RecordingObserver::default(),
        );

        let err = driver.build().unwrap_err();
        assert!(matches!(err, ScenarioError::TopologyMismatch { positions: 4, nodes: 25 }));
        assert_eq!(driver.state(), DriverState::Stopped);
        assert!(driver.scenario().is_none());
        assert_eq!(driver.backend().node_count(), 0);
        assert!(matches!(
            driver.run().unwrap_err(),
            ScenarioError::InvalidState { state: DriverState::Stopped, .. }
        ));
    }

    #[test]
    fn test_run_requires_build() {
        let dir = tempdir().unwrap();
        let mut driver = SimulationDriver::new(
            grid(2, false),
            ArtifactPaths::new(dir.path(), "t"),
            EventKernel::new(),
            RecordingObserver::default(),
        );
        let err = driver.run().unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::InvalidState {
                action: "run",
                state: DriverState::Unconfigured
            }
        ));
        assert_eq!(driver.state(), DriverState::Unconfigured);
    }

    #[test]
    fn test_full_lifecycle() {
        let dir = tempdir().unwrap();
        let mut driver = SimulationDriver::new(
            grid(2, true),
            ArtifactPaths::new(dir.path(), "t"),
            EventKernel::new(),
            RecordingObserver::default(),
        );
        driver.build().unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(summary.final_time, STOP_TIME);
        assert!(summary.executed_events > 0);
        assert!(driver.scenario().is_none());
        assert_eq!(driver.backend().node_count(), 0);
        assert!(driver.build().is_err());
        assert!(driver.run().is_err());
        assert_eq!(
            driver.observer().events.last(),
            Some(&PipelineEvent::SimulationStopped(summary))
        );
    }

    #[test]
    fn test_export_requires_built_state() {
        let dir = tempdir().unwrap();
        let driver = SimulationDriver::new(
            grid(2, false),
            ArtifactPaths::new(dir.path(), "t"),
            EventKernel::new(),
            RecordingObserver::default(),
        );
        assert!(driver.export().is_err());
        assert!(!dir.path().join("t.scenario.yaml").exists());
    }
}
