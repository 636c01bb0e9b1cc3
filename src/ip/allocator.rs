//! Contiguous IPv4 block allocation.

use std::fmt;
use std::net::Ipv4Addr;

use super::registry::{AddressAssignment, AddressEntry};
use crate::device::DeviceHandle;
use crate::error::ScenarioError;

/// Network address of the scenario block
pub const DEFAULT_BASE: Ipv4Addr = Ipv4Addr::new(10, 1, 1, 0);
/// Netmask of the scenario block (/24)
pub const DEFAULT_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// A network block from which host addresses are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Block {
    network: Ipv4Addr,
    mask: Ipv4Addr,
}

impl Ipv4Block {
    /// Create a block; host bits of `base` must be zero and `mask` contiguous
    pub fn new(base: Ipv4Addr, mask: Ipv4Addr) -> Result<Self, ScenarioError> {
        let mask_bits = u32::from(mask);
        if mask_bits.leading_ones() + mask_bits.trailing_zeros() != 32 {
            return Err(ScenarioError::rejected(
                "address block",
                format!("netmask {} is not contiguous", mask),
            ));
        }
        if u32::from(base) & !mask_bits != 0 {
            return Err(ScenarioError::rejected(
                "address block",
                format!("base {} has host bits set for mask {}", base, mask),
            ));
        }
        Ok(Self { network: base, mask })
    }

    pub fn mask(&self) -> Ipv4Addr {
        self.mask
    }

    pub fn prefix_len(&self) -> u32 {
        u32::from(self.mask).leading_ones()
    }

    /// Number of assignable hosts (network and broadcast excluded)
    pub fn capacity(&self) -> usize {
        let host_bits = 32 - self.prefix_len();
        match host_bits {
            0 | 1 => 0,
            bits => ((1u64 << bits) - 2) as usize,
        }
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & u32::from(self.mask) == u32::from(self.network)
    }

    /// Host address at `offset` (1-based) within the block
    fn host(&self, offset: usize) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) + offset as u32)
    }

    /// Assign one address per device, in order, starting at offset 1.
    ///
    /// Fails with [`ScenarioError::AddressExhausted`] before assigning
    /// anything when the devices do not fit.
    pub fn assign(&self, devices: &[DeviceHandle]) -> Result<AddressAssignment, ScenarioError> {
        let capacity = self.capacity();
        if devices.len() > capacity {
            return Err(ScenarioError::AddressExhausted {
                block: self.to_string(),
                requested: devices.len(),
                capacity,
            });
        }

        let entries = devices
            .iter()
            .enumerate()
            .map(|(i, device)| AddressEntry {
                device: *device,
                address: self.host(i + 1),
            })
            .collect();
        Ok(AddressAssignment::new(*self, entries))
    }
}

impl Default for Ipv4Block {
    fn default() -> Self {
        Self {
            network: DEFAULT_BASE,
            mask: DEFAULT_MASK,
        }
    }
}

impl fmt::Display for Ipv4Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len())
    }
}
