//! Address assignment registry.
//!
//! Records which address each device received. Written once at stack
//! installation and read-only afterwards.

use serde::Serialize;
use std::net::Ipv4Addr;

use super::allocator::Ipv4Block;
use crate::device::DeviceHandle;
use crate::node::NodeId;

/// One device-to-address binding
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct AddressEntry {
    pub device: DeviceHandle,
    pub address: Ipv4Addr,
}

/// Bijection from devices to addresses, in device installation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressAssignment {
    block: Ipv4Block,
    entries: Vec<AddressEntry>,
}

impl AddressAssignment {
    pub(super) fn new(block: Ipv4Block, entries: Vec<AddressEntry>) -> Self {
        Self { block, entries }
    }

    pub fn block(&self) -> &Ipv4Block {
        &self.block
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressEntry> {
        self.entries.iter()
    }

    pub fn address_of(&self, device: DeviceHandle) -> Option<Ipv4Addr> {
        self.entries
            .iter()
            .find(|entry| entry.device == device)
            .map(|entry| entry.address)
    }

    /// Address of the first device on `node`
    pub fn address_of_node(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.entries
            .iter()
            .find(|entry| entry.device.node == node)
            .map(|entry| entry.address)
    }
}
