//! # Types
//!
//! Platform-agnostic types shared by the backends, the scanner, and the
//! offset-chain resolver.

pub mod address;
pub mod process;
pub mod region;

// Re-export all public types
pub use address::Address;
pub use process::{AccessMode, ProcessId};
pub use region::{MemoryRegion, RegionFlags};
