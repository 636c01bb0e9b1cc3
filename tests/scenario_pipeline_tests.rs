#[cfg(test)]
mod scenario_pipeline_tests {
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::path::Path;
    use tempfile::tempdir;

    use manetsim::artifacts::{pcap_file, ArtifactPaths};
    use manetsim::config::{RawParameters, ScenarioConfig};
    use manetsim::ip::Ipv4Block;
    use manetsim::observer::{PipelineEvent, RecordingObserver};
    use manetsim::orchestrator::{BuiltScenario, DriverState, SimulationDriver};
    use manetsim::sim::{EventKernel, SimTime};
    use manetsim::topology::Position;
    use manetsim::ScenarioError;

    type Driver = SimulationDriver<EventKernel, RecordingObserver>;

    fn driver(raw: RawParameters, dir: &Path) -> Driver {
        let config = ScenarioConfig::from_raw(&raw).unwrap();
        SimulationDriver::new(
            config,
            ArtifactPaths::new(dir, "manet"),
            EventKernel::new(),
            RecordingObserver::default(),
        )
    }

    fn build(raw: RawParameters, dir: &Path) -> (Driver, BuiltScenario) {
        let mut driver = driver(raw, dir);
        let scenario = driver.build().unwrap().clone();
        (driver, scenario)
    }

    fn static_grid(sides: i64, udp: bool) -> RawParameters {
        RawParameters {
            sides,
            speed: 0,
            distance: 100,
            network_type: 1,
            udp,
            ..RawParameters::default()
        }
    }

    /// Grid positions follow `index = i * side + j -> (i * d, j * d, 0)`
    #[test]
    fn test_grid_positions_row_major() {
        let dir = tempdir().unwrap();
        let (driver, scenario) = build(
            RawParameters {
                sides: 3,
                distance: 50,
                network_type: 1,
                ..RawParameters::default()
            },
            dir.path(),
        );

        assert_eq!(scenario.positions.len(), 9);
        for i in 0..3u32 {
            for j in 0..3u32 {
                let index = (i * 3 + j) as usize;
                let expected = Position::new(f64::from(i) * 50.0, f64::from(j) * 50.0, 0.0);
                assert_eq!(scenario.positions[index], expected);
                assert_eq!(driver.backend().position_of(scenario.population.get(index).unwrap()), Some(expected));
            }
        }
    }

    #[test]
    fn test_static_two_by_two_grid() {
        let dir = tempdir().unwrap();
        let (driver, scenario) = build(static_grid(2, false), dir.path());

        assert_eq!(
            scenario.positions,
            vec![
                Position::new(0.0, 0.0, 0.0),
                Position::new(0.0, 100.0, 0.0),
                Position::new(100.0, 0.0, 0.0),
                Position::new(100.0, 100.0, 0.0),
            ]
        );
        assert!(scenario.bindings.iter().all(|b| b.policy.is_stationary()));
        for node in scenario.population.iter() {
            assert!(driver.backend().motion_of(node).unwrap().is_stationary());
        }
    }

    #[test]
    fn test_population_sizes() {
        for sides in [1i64, 2, 3, 5, 10] {
            let dir = tempdir().unwrap();
            let (driver, scenario) = build(static_grid(sides, false), dir.path());
            let expected = (sides * sides) as usize;
            assert_eq!(scenario.population.len(), expected);
            assert_eq!(scenario.devices.len(), expected);
            assert_eq!(driver.backend().node_count(), expected);
        }
    }

    #[test]
    fn test_addresses_distinct_and_ordered() {
        let dir = tempdir().unwrap();
        let (driver, scenario) = build(static_grid(4, false), dir.path());
        let block = Ipv4Block::default();

        let mut seen = HashSet::new();
        for (i, entry) in scenario.addresses.iter().enumerate() {
            assert_eq!(entry.device, scenario.devices[i]);
            assert_eq!(entry.address, Ipv4Addr::new(10, 1, 1, i as u8 + 1));
            assert!(block.contains(entry.address));
            assert!(seen.insert(entry.address));
            assert_eq!(driver.backend().address_of(entry.device.node), Some(entry.address));
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_traffic_disabled_installs_nothing() {
        let dir = tempdir().unwrap();
        let (driver, scenario) = build(static_grid(2, false), dir.path());

        assert!(scenario.traffic.is_none());
        assert_eq!(driver.backend().application_count(), 0);
        assert!(driver.observer().events.contains(&PipelineEvent::TrafficSkipped));
    }

    #[test]
    fn test_traffic_enabled_four_nodes() {
        let dir = tempdir().unwrap();
        let (driver, scenario) = build(static_grid(2, true), dir.path());

        let flow = scenario.traffic.unwrap();
        assert_eq!(flow.server.node.index(), 0);
        assert_eq!(flow.server.window.start, SimTime::from_secs(1));
        assert_eq!(flow.server.window.stop, SimTime::from_secs(10));

        let clients: Vec<u32> = flow.clients.iter().map(|c| c.node.index()).collect();
        assert_eq!(clients, vec![1, 2, 3]);
        for client in &flow.clients {
            assert_eq!(client.window.start, SimTime::from_secs(2));
            assert_eq!(client.window.stop, SimTime::from_secs(10));
            assert_eq!(*client.remote.ip(), Ipv4Addr::new(10, 1, 1, 1));
        }
        assert_eq!(driver.backend().application_count(), 4);
    }

    #[test]
    fn test_fixed_layout_rejects_larger_grid() {
        let dir = tempdir().unwrap();
        let mut driver = driver(
            RawParameters {
                sides: 5,
                network_type: 0,
                ..RawParameters::default()
            },
            dir.path(),
        );

        let err = driver.build().unwrap_err();
        assert!(matches!(err, ScenarioError::TopologyMismatch { positions: 4, nodes: 25 }));
        assert_eq!(driver.state(), DriverState::Stopped);

        // Nothing was written for the failed scenario
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_no_dump_rescheduled_onto_stop_time() {
        let dir = tempdir().unwrap();
        let (mut driver, _) = build(
            RawParameters {
                update_interval: 10,
                ..RawParameters::default()
            },
            dir.path(),
        );
        driver.run().unwrap();

        let routes = std::fs::read_to_string(driver.paths().routes()).unwrap();
        let headers: Vec<&str> = routes.lines().filter(|l| l.starts_with("Node: 0,")).collect();
        assert_eq!(headers, vec!["Node: 0, Time: +10s, DSDV Routing table"]);

        let neighbor = std::fs::read_to_string(driver.paths().neighbor()).unwrap();
        assert_eq!(neighbor.matches("ARP Cache of node 0 ").count(), 1);
    }

    #[test]
    fn test_moving_nodes_outside_area_fail_build() {
        let dir = tempdir().unwrap();
        let mut driver = driver(
            RawParameters {
                speed: 500,
                network_type: 0,
                area_size: 50,
                ..RawParameters::default()
            },
            dir.path(),
        );

        let err = driver.build().unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidParameter { name: "areaSize", .. }));
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_invalid_parameters_fail_before_build() {
        let cases = [
            RawParameters { sides: 0, ..RawParameters::default() },
            RawParameters { speed: -1, ..RawParameters::default() },
            RawParameters { network_type: 2, ..RawParameters::default() },
            RawParameters { update_interval: 0, ..RawParameters::default() },
        ];
        for raw in cases {
            let err = ScenarioConfig::from_raw(&raw).unwrap_err();
            assert!(matches!(err, ScenarioError::InvalidParameter { .. }), "{:?}", raw);
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let first_dir = tempdir().unwrap();
        let second_dir = tempdir().unwrap();
        let raw = RawParameters {
            sides: 3,
            network_type: 1,
            udp: true,
            ..RawParameters::default()
        };

        let (_, first) = build(raw.clone(), first_dir.path());
        let (_, second) = build(raw, second_dir.path());

        assert_eq!(first.positions, second.positions);
        assert_eq!(first.addresses, second.addresses);
        assert_eq!(first.traffic, second.traffic);
    }

    #[test]
    fn test_run_writes_artifacts() {
        let dir = tempdir().unwrap();
        let (mut driver, scenario) = build(static_grid(2, true), dir.path());
        driver.export().unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(summary.final_time, SimTime::from_secs(20));

        let paths = driver.paths();
        for path in [
            paths.ascii_trace(),
            paths.routes(),
            paths.neighbor(),
            paths.scenario(),
            paths.addresses(),
        ] {
            assert!(path.exists(), "missing {:?}", path);
        }
        for device in &scenario.devices {
            assert!(pcap_file(paths.base(), device.node.index(), device.index).exists());
        }

        // Dumps at 6, 12 and 18 s with the default update interval
        let routes = std::fs::read_to_string(paths.routes()).unwrap();
        assert_eq!(routes.matches("Node: 0, Time: ").count(), 3);

        // One echo request per client
        let trace = std::fs::read_to_string(paths.ascii_trace()).unwrap();
        assert_eq!(trace.lines().filter(|l| l.contains("UdpEchoClient Tx")).count(), 3);
    }
}
