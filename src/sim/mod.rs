//! Simulator backend module.
//!
//! The pipeline talks to a discrete-event network simulator through the
//! [`SimulatorBackend`] trait. [`EventKernel`] is the in-process
//! implementation used by the binary and the tests.

pub mod attributes;
pub mod backend;
pub mod kernel;
pub mod scheduler;
pub mod time;

// Re-export commonly used types
pub use attributes::{global_defaults, AttributeMap, AttributeSource};
pub use backend::{RunSummary, SimulatorBackend};
pub use kernel::{DumpKind, DumpRequest, EventKernel};
pub use scheduler::{EventQueue, ScheduledEvent};
pub use time::SimTime;
