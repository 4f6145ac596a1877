//! # Process Backend
//!
//! The capability interface every OS backend implements.
//!
//! Process discovery, region enumeration, and channel creation are the only
//! platform-specific operations. The signature codec, the scanner, and
//! offset-chain resolution are written against this trait and never touch
//! OS details directly.
//!
//! - **Linux**: procfs (`/proc/<pid>/status`, `maps`, `mem`)
//! - Other platforms: no backend yet

use crate::channel::MemoryChannel;
use crate::error::Result;
use crate::types::{AccessMode, MemoryRegion, ProcessId};

/// OS-specific access to processes
pub trait ProcessBackend
{
    /// Channel type produced by [`open_channel`](ProcessBackend::open_channel)
    type Channel: MemoryChannel;

    /// Resolve a process ID by name
    ///
    /// An exact name match wins. Otherwise the first process whose name
    /// starts with `name` is returned.
    ///
    /// ## Errors
    ///
    /// - `ProcessNotFound`: no process matched at all
    fn find_process(&self, name: &str) -> Result<ProcessId>;

    /// Enumerate the process's mapped regions in address-map order
    fn regions(&self, pid: ProcessId) -> Result<Vec<MemoryRegion>>;

    /// Open a memory channel into the process
    ///
    /// ## Errors
    ///
    /// - `ChannelOpen`: the OS refused the handle (permissions, process gone)
    fn open_channel(&self, pid: ProcessId, mode: AccessMode) -> Result<Self::Channel>;
}

/// Native backend for the current platform
#[cfg(target_os = "linux")]
pub type NativeBackend = crate::platform::linux::LinuxBackend;

/// Create the backend for the current platform
///
/// Only Linux has a backend today; callers on other platforms must supply
/// their own [`ProcessBackend`].
///
/// ## Errors
///
/// Never fails on Linux.
#[cfg(target_os = "linux")]
#[allow(clippy::unnecessary_wraps)]
pub fn create_backend() -> Result<NativeBackend>
{
    Ok(crate::platform::linux::LinuxBackend::new())
}
