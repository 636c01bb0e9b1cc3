//! Periodic routing-table and neighbor-cache dumps.

use serde::Serialize;
use std::path::PathBuf;

use crate::artifacts::ArtifactPaths;
use crate::error::ScenarioError;
use crate::sim::{SimTime, SimulatorBackend};

/// When and where the dumps are written
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DiagnosticsSchedule {
    pub first: SimTime,
    pub period: SimTime,
    pub routes: PathBuf,
    pub neighbor: PathBuf,
}

/// Schedules the dumps; purely observational
#[derive(Debug, Clone)]
pub struct DiagnosticsSink {
    routes: PathBuf,
    neighbor: PathBuf,
}

impl DiagnosticsSink {
    pub fn new(paths: &ArtifactPaths) -> Self {
        Self {
            routes: paths.routes(),
            neighbor: paths.neighbor(),
        }
    }

    /// Dump every node's tables at `interval`, `2 * interval`, ... until the run stops
    pub fn schedule<B: SimulatorBackend + ?Sized>(
        &self,
        backend: &mut B,
        interval: SimTime,
    ) -> Result<DiagnosticsSchedule, ScenarioError> {
        if interval == SimTime::ZERO {
            return Err(ScenarioError::invalid_parameter(
                "updateInterval",
                0,
                "diagnostics period must be greater than 0",
            ));
        }

        backend.schedule_routing_table_dump(interval, interval, &self.routes)?;
        backend.schedule_neighbor_cache_dump(interval, interval, &self.neighbor)?;

        Ok(DiagnosticsSchedule {
            first: interval,
            period: interval,
            routes: self.routes.clone(),
            neighbor: self.neighbor.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DumpKind, EventKernel};

    #[test]
    fn test_schedule_both_streams() {
        let mut kernel = EventKernel::new();
        let paths = ArtifactPaths::new("out", "diag");

        let schedule = DiagnosticsSink::new(&paths)
            .schedule(&mut kernel, SimTime::from_secs(4))
            .unwrap();

        assert_eq!(schedule.first, SimTime::from_secs(4));
        assert_eq!(schedule.period, SimTime::from_secs(4));
        assert_eq!(schedule.routes, paths.routes());
        assert_eq!(schedule.neighbor, paths.neighbor());

        let kinds: Vec<DumpKind> = kernel.dumps().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DumpKind::RoutingTable, DumpKind::NeighborCache]);
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let mut kernel = EventKernel::new();
        let sink = DiagnosticsSink::new(&ArtifactPaths::new("out", "diag"));
        assert!(sink.schedule(&mut kernel, SimTime::ZERO).is_err());
    }
}
