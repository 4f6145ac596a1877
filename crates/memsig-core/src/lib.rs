//! # memsig-core
//!
//! Process memory inspection and patching for memsig.
//!
//! This crate provides:
//! - Process discovery by name and memory region enumeration
//! - Classification of a process image into code, read-only data, and
//!   read-write data segments
//! - Read-only and read-write memory channels
//! - Signature patterns with per-nibble wildcards
//! - A streaming scanner that matches across chunk boundaries
//! - Offset-chain parsing and resolution
//!
//! ## Platform Support
//!
//! - **Linux**: procfs (`/proc/<pid>/status`, `/proc/<pid>/maps`, `/proc/<pid>/mem`)
//! - Other platforms: bring your own [`ProcessBackend`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use memsig_core::{create_backend, find_signature, AccessMode, MemoryChannel, ProcessContext, SearchMode};
//!
//! let process = ProcessContext::attach(create_backend()?, "game.exe")?;
//! let mut peek = process.open_channel(AccessMode::Peek)?;
//! let mut poke = process.open_channel(AccessMode::Poke)?;
//!
//! for address in find_signature(&process, &mut peek, "F6 47 3B 02 ?? 3E", SearchMode::Code)? {
//!     if peek.read_u8(address + 4)? == 0x74 {
//!         poke.write(address + 4, &[0xEB])?;
//!     }
//! }
//! # Ok::<(), memsig_core::MemError>(())
//! ```

pub mod backend;
pub mod channel;
pub mod error;
pub mod offset;
pub mod platform;
pub mod process;
pub mod scanner;
pub mod signature;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::ProcessBackend;
#[cfg(target_os = "linux")]
pub use backend::{create_backend, NativeBackend};
pub use channel::MemoryChannel;
pub use error::{ErrorKind, MemError, Result};
pub use offset::OffsetChain;
#[cfg(target_os = "linux")]
pub use platform::linux::LinuxBackend;
pub use process::{loader_layout_segments, ProcessContext, SegmentStrategy, Segments};
pub use scanner::{find_signature, ScanOptions, Scanner, SearchMode};
pub use signature::Signature;
pub use types::{AccessMode, Address, MemoryRegion, ProcessId, RegionFlags};
