//! Network topology module.
//!
//! This module turns the configured topology mode into the ordered list of
//! initial node positions consumed at placement time.

pub mod layout;

// Re-export key types and functions for easier access
pub use layout::{build_positions, FixedLayout, GridLayout, Layout, Position, PositionProducer};
