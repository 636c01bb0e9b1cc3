//! In-process discrete-event kernel.
//!
//! `EventKernel` records everything the pipeline installs, checks the
//! one-device/one-binding/one-stack-per-node invariants, and replays the
//! scheduled application and diagnostic events in time order.
//!
//! It does not model radio propagation, routing convergence or node motion.
//! Routing-table dumps therefore list each node's local routes only,
//! neighbor caches stay empty, and pcap files hold a header and no frames.
//!
//! Artifact files are opened when [`run`](SimulatorBackend::run) starts, so a
//! scenario that fails during setup leaves nothing behind.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use super::attributes::AttributeSource;
use super::backend::{RunSummary, SimulatorBackend};
use super::scheduler::EventQueue;
use super::time::SimTime;
use crate::artifacts::pcap_file;
use crate::device::{DeviceHandle, WifiSettings};
use crate::error::ScenarioError;
use crate::mobility::MotionPolicy;
use crate::node::NodeId;
use crate::routing::DsdvSettings;
use crate::topology::Position;
use crate::traffic::{ActiveWindow, EchoClient, EchoServer, OnOffDefaults};

/// pcap link type for raw 802.11 frames
const LINKTYPE_IEEE802_11: u32 = 105;
const PCAP_SNAPLEN: u32 = 65535;

/// Which table a periodic dump writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    RoutingTable,
    NeighborCache,
}

/// A registered periodic dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRequest {
    pub kind: DumpKind,
    pub first: SimTime,
    pub period: SimTime,
    pub stream: PathBuf,
}

/// An installed application
#[derive(Debug, Clone, PartialEq, Eq)]
enum Application {
    EchoServer(EchoServer),
    EchoClient(EchoClient),
}

impl Application {
    fn node(&self) -> NodeId {
        match self {
            Application::EchoServer(server) => server.node,
            Application::EchoClient(client) => client.node,
        }
    }

    fn window(&self) -> ActiveWindow {
        match self {
            Application::EchoServer(server) => server.window,
            Application::EchoClient(client) => client.window,
        }
    }

    fn type_id(&self) -> &'static str {
        match self {
            Application::EchoServer(server) => server.type_id(),
            Application::EchoClient(client) => client.type_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    StartApplication(usize),
    StopApplication(usize),
    SendRequest(usize),
    Dump(usize),
    Stop,
}

/// Internet stack state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stack {
    Static,
    Dsdv(DsdvSettings),
}

#[derive(Debug, Default)]
struct NodeState {
    device: Option<DeviceHandle>,
    mobility: Option<(MotionPolicy, Position)>,
    stack: Option<Stack>,
    address: Option<(Ipv4Addr, Ipv4Addr)>,
    applications: u32,
}

#[derive(Debug)]
struct AppRuntime {
    app: Application,
    /// Index in the node's application list
    slot: u32,
    running: bool,
    sent: u32,
}

/// Output files of one run
struct Streams {
    trace: Option<BufWriter<File>>,
    dumps: Vec<BufWriter<File>>,
}

impl Streams {
    fn flush(&mut self) -> io::Result<()> {
        if let Some(trace) = &mut self.trace {
            trace.flush()?;
        }
        for dump in &mut self.dumps {
            dump.flush()?;
        }
        Ok(())
    }
}

/// Deterministic single-threaded simulator backend
#[derive(Debug, Default)]
pub struct EventKernel {
    nodes: Vec<NodeState>,
    wifi: Option<WifiSettings>,
    defaults: Option<OnOffDefaults>,
    applications: Vec<AppRuntime>,
    ascii_trace: Option<PathBuf>,
    pcap_prefix: Option<PathBuf>,
    dumps: Vec<DumpRequest>,
    queue: EventQueue<Event>,
    now: SimTime,
}

impl EventKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn position_of(&self, node: NodeId) -> Option<Position> {
        self.state(node).and_then(|s| s.mobility).map(|(_, position)| position)
    }

    pub fn motion_of(&self, node: NodeId) -> Option<MotionPolicy> {
        self.state(node).and_then(|s| s.mobility).map(|(policy, _)| policy)
    }

    pub fn has_stack(&self, node: NodeId) -> bool {
        self.state(node).is_some_and(|s| s.stack.is_some())
    }

    /// DSDV settings installed on `node`, if any
    pub fn routing_of(&self, node: NodeId) -> Option<DsdvSettings> {
        match self.state(node)?.stack? {
            Stack::Dsdv(settings) => Some(settings),
            Stack::Static => None,
        }
    }

    pub fn address_of(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.state(node).and_then(|s| s.address).map(|(address, _)| address)
    }

    pub fn wifi_settings(&self) -> Option<&WifiSettings> {
        self.wifi.as_ref()
    }

    pub fn application_defaults(&self) -> Option<&OnOffDefaults> {
        self.defaults.as_ref()
    }

    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    pub fn ascii_trace_path(&self) -> Option<&Path> {
        self.ascii_trace.as_deref()
    }

    pub fn pcap_prefix(&self) -> Option<&Path> {
        self.pcap_prefix.as_deref()
    }

    pub fn dumps(&self) -> impl Iterator<Item = &DumpRequest> {
        self.dumps.iter()
    }

    fn state(&self, node: NodeId) -> Option<&NodeState> {
        self.nodes.get(node.index() as usize)
    }

    fn state_mut(
        &mut self,
        node: NodeId,
        operation: &'static str,
    ) -> Result<&mut NodeState, ScenarioError> {
        self.nodes
            .get_mut(node.index() as usize)
            .ok_or_else(|| ScenarioError::rejected(operation, format!("node {} does not exist", node)))
    }

    fn require_stack(&self, node: NodeId, operation: &'static str) -> Result<(), ScenarioError> {
        match self.state(node) {
            None => Err(ScenarioError::rejected(operation, format!("node {} does not exist", node))),
            Some(state) if state.stack.is_none() => Err(ScenarioError::rejected(
                operation,
                format!("node {} has no internet stack", node),
            )),
            Some(_) => Ok(()),
        }
    }

    fn add_application(&mut self, app: Application) -> Result<(), ScenarioError> {
        let window = app.window();
        if window.stop < window.start {
            return Err(ScenarioError::rejected(
                "application installation",
                format!("stop time {} precedes start time {}", window.stop, window.start),
            ));
        }

        let state = self.state_mut(app.node(), "application installation")?;
        let slot = state.applications;
        state.applications += 1;

        let index = self.applications.len();
        self.applications.push(AppRuntime {
            app,
            slot,
            running: false,
            sent: 0,
        });
        self.queue.schedule(window.start, Event::StartApplication(index));
        self.queue.schedule(window.stop, Event::StopApplication(index));
        Ok(())
    }

    fn add_dump(
        &mut self,
        kind: DumpKind,
        first: SimTime,
        period: SimTime,
        stream: &Path,
    ) -> Result<(), ScenarioError> {
        if period == SimTime::ZERO {
            return Err(ScenarioError::rejected("dump scheduling", "period must be positive"));
        }
        let index = self.dumps.len();
        self.dumps.push(DumpRequest {
            kind,
            first,
            period,
            stream: stream.to_path_buf(),
        });
        self.queue.schedule(first, Event::Dump(index));
        Ok(())
    }

    fn open_streams(&self) -> io::Result<Streams> {
        let trace = match &self.ascii_trace {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };

        if let Some(prefix) = &self.pcap_prefix {
            for device in self.nodes.iter().filter_map(|s| s.device) {
                let mut file = File::create(pcap_file(prefix, device.node.index(), device.index))?;
                write_pcap_header(&mut file)?;
            }
        }

        let dumps = self
            .dumps
            .iter()
            .map(|dump| File::create(&dump.stream).map(BufWriter::new))
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Streams { trace, dumps })
    }

    fn handle(&mut self, event: Event, stop: SimTime, streams: &mut Streams) -> io::Result<()> {
        match event {
            Event::StartApplication(index) => {
                let runtime = &mut self.applications[index];
                runtime.running = true;
                if let Application::EchoClient(_) = runtime.app {
                    self.queue.schedule(self.now, Event::SendRequest(index));
                }
                self.trace_application(streams, index, "Start")?;
            }
            Event::StopApplication(index) => {
                self.applications[index].running = false;
                self.trace_application(streams, index, "Stop")?;
            }
            Event::SendRequest(index) => {
                let runtime = &mut self.applications[index];
                let Application::EchoClient(client) = runtime.app else {
                    return Ok(());
                };
                if !runtime.running || runtime.sent >= client.max_requests {
                    return Ok(());
                }
                runtime.sent += 1;
                if runtime.sent < client.max_requests {
                    self.queue.schedule(self.now + client.interval, Event::SendRequest(index));
                }
                let what = format!("Tx {} bytes to {}", client.payload_size, client.remote);
                self.trace_application(streams, index, &what)?;
            }
            Event::Stop => {}
            Event::Dump(index) => {
                let dump = &self.dumps[index];
                let next = self.now + dump.period;
                let out = &mut streams.dumps[index];
                match dump.kind {
                    DumpKind::RoutingTable => self.write_routing_tables(out)?,
                    DumpKind::NeighborCache => self.write_neighbor_caches(out)?,
                }
                if next <= stop {
                    self.queue.schedule(next, Event::Dump(index));
                }
            }
        }
        Ok(())
    }

    fn trace_application(&self, streams: &mut Streams, index: usize, what: &str) -> io::Result<()> {
        let Some(trace) = &mut streams.trace else {
            return Ok(());
        };
        let runtime = &self.applications[index];
        writeln!(
            trace,
            "a {:.9} /NodeList/{}/ApplicationList/{}/${} {}",
            self.now.as_secs_f64(),
            runtime.app.node(),
            runtime.slot,
            runtime.app.type_id(),
            what
        )
    }

    fn write_routing_tables(&self, out: &mut impl Write) -> io::Result<()> {
        for (index, state) in self.nodes.iter().enumerate() {
            writeln!(out, "Node: {}, Time: {}, DSDV Routing table", index, self.now)?;
            match state.stack {
                Some(Stack::Dsdv(_)) => {
                    writeln!(
                        out,
                        "{:<16}{:<16}{:<16}{:<10}{}",
                        "Destination", "Gateway", "Interface", "HopCount", "SeqNum"
                    )?;
                    let mut local = vec![Ipv4Addr::LOCALHOST];
                    local.extend(state.address.map(|(address, _)| address));
                    for address in local {
                        let address = address.to_string();
                        writeln!(out, "{:<16}{:<16}{:<16}{:<10}{}", address, address, address, 0, 0)?;
                    }
                }
                Some(Stack::Static) => writeln!(out, "No routing protocol installed")?,
                None => writeln!(out, "No internet stack installed")?,
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_neighbor_caches(&self, out: &mut impl Write) -> io::Result<()> {
        for index in 0..self.nodes.len() {
            writeln!(out, "ARP Cache of node {} at time {}", index, self.now.as_secs_f64())?;
        }
        Ok(())
    }
}

fn write_pcap_header(out: &mut impl Write) -> io::Result<()> {
    out.write_all(&0xa1b2_c3d4u32.to_le_bytes())?;
    out.write_all(&2u16.to_le_bytes())?;
    out.write_all(&4u16.to_le_bytes())?;
    out.write_all(&0i32.to_le_bytes())?; // thiszone
    out.write_all(&0u32.to_le_bytes())?; // sigfigs
    out.write_all(&PCAP_SNAPLEN.to_le_bytes())?;
    out.write_all(&LINKTYPE_IEEE802_11.to_le_bytes())
}

impl SimulatorBackend for EventKernel {
    fn create_nodes(&mut self, count: usize) -> Result<Vec<NodeId>, ScenarioError> {
        let exhausted = || ScenarioError::ResourceExhausted { requested: count };
        let start = self.nodes.len();
        let end = start
            .checked_add(count)
            .and_then(|end| u32::try_from(end).ok())
            .ok_or_else(exhausted)?;
        self.nodes.try_reserve_exact(count).map_err(|_| exhausted())?;
        self.nodes.resize_with(start + count, NodeState::default);

        Ok((start as u32..end).map(NodeId::new).collect())
    }

    fn install_wifi(
        &mut self,
        nodes: &[NodeId],
        settings: &WifiSettings,
    ) -> Result<Vec<DeviceHandle>, ScenarioError> {
        for &node in nodes {
            let state = self
                .state(node)
                .ok_or_else(|| ScenarioError::rejected("wifi installation", format!("node {} does not exist", node)))?;
            if state.device.is_some() {
                return Err(ScenarioError::rejected(
                    "wifi installation",
                    format!("node {} already has a device", node),
                ));
            }
        }

        let mut devices = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let device = DeviceHandle { node, index: 0 };
            self.state_mut(node, "wifi installation")?.device = Some(device);
            devices.push(device);
        }
        self.wifi = Some(settings.clone());
        Ok(devices)
    }

    fn enable_ascii_trace(&mut self, path: &Path) {
        self.ascii_trace = Some(path.to_path_buf());
    }

    fn enable_pcap(&mut self, prefix: &Path) {
        self.pcap_prefix = Some(prefix.to_path_buf());
    }

    fn install_mobility(
        &mut self,
        node: NodeId,
        policy: &MotionPolicy,
        position: Position,
    ) -> Result<(), ScenarioError> {
        let state = self.state_mut(node, "mobility installation")?;
        if state.mobility.is_some() {
            return Err(ScenarioError::rejected(
                "mobility installation",
                format!("node {} is already placed", node),
            ));
        }
        state.mobility = Some((*policy, position));
        Ok(())
    }

    fn install_internet_stack(
        &mut self,
        nodes: &[NodeId],
        routing: Option<&DsdvSettings>,
    ) -> Result<(), ScenarioError> {
        let stack = match routing {
            Some(settings) => Stack::Dsdv(*settings),
            None => Stack::Static,
        };
        for &node in nodes {
            let state = self.state_mut(node, "stack installation")?;
            if state.stack.is_some() {
                return Err(ScenarioError::rejected(
                    "stack installation",
                    format!("node {} already has an internet stack", node),
                ));
            }
            state.stack = Some(stack);
        }
        Ok(())
    }

    fn assign_address(
        &mut self,
        device: DeviceHandle,
        address: Ipv4Addr,
        mask: Ipv4Addr,
    ) -> Result<(), ScenarioError> {
        self.require_stack(device.node, "address assignment")?;
        let state = self.state_mut(device.node, "address assignment")?;
        if state.device != Some(device) {
            return Err(ScenarioError::rejected(
                "address assignment",
                format!("device {} is not installed", device),
            ));
        }
        if let Some((existing, _)) = state.address {
            return Err(ScenarioError::rejected(
                "address assignment",
                format!("device {} already has address {}", device, existing),
            ));
        }
        state.address = Some((address, mask));
        Ok(())
    }

    fn set_application_defaults(&mut self, defaults: &OnOffDefaults) {
        self.defaults = Some(*defaults);
    }

    fn install_echo_server(&mut self, server: &EchoServer) -> Result<(), ScenarioError> {
        self.require_stack(server.node, "echo server installation")?;
        self.add_application(Application::EchoServer(*server))
    }

    fn install_echo_client(&mut self, client: &EchoClient) -> Result<(), ScenarioError> {
        self.require_stack(client.node, "echo client installation")?;
        self.add_application(Application::EchoClient(*client))
    }

    fn schedule_routing_table_dump(
        &mut self,
        first: SimTime,
        period: SimTime,
        stream: &Path,
    ) -> Result<(), ScenarioError> {
        self.add_dump(DumpKind::RoutingTable, first, period, stream)
    }

    fn schedule_neighbor_cache_dump(
        &mut self,
        first: SimTime,
        period: SimTime,
        stream: &Path,
    ) -> Result<(), ScenarioError> {
        self.add_dump(DumpKind::NeighborCache, first, period, stream)
    }

    fn run(&mut self, stop: SimTime) -> Result<RunSummary, ScenarioError> {
        let mut streams = self.open_streams()?;
        let mut executed_events = 0u64;

        // Queued behind everything scheduled during setup, so setup events at
        // `stop` still run while events rescheduled for `stop` do not.
        let stop = stop.max(self.now);
        self.queue.schedule(stop, Event::Stop);

        while let Some(scheduled) = self.queue.pop_earliest() {
            self.now = scheduled.time();
            match scheduled.into_event() {
                Event::Stop => break,
                event => self.handle(event, stop, &mut streams)?,
            }
            executed_events += 1;
        }
        let exhausted = self.queue.is_empty();
        streams.flush()?;

        log::debug!(
            "Kernel executed {} events, clock at {}{}",
            executed_events,
            self.now,
            if exhausted { " (queue drained)" } else { "" }
        );
        Ok(RunSummary {
            executed_events,
            final_time: self.now,
            exhausted,
        })
    }

    fn destroy(&mut self) {
        *self = EventKernel::new();
    }
}
