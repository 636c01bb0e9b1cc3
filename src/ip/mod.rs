//! IPv4 address allocation module.
//!
//! Addresses come from a single contiguous block and are handed out to
//! devices in installation order.

pub mod allocator;
pub mod registry;

// Re-export commonly used types
pub use allocator::{Ipv4Block, DEFAULT_BASE, DEFAULT_MASK};
pub use registry::{AddressAssignment, AddressEntry};
