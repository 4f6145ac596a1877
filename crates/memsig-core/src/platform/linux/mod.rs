//! # Linux Backend
//!
//! Process access through procfs.
//!
//! ## Files used
//!
//! - `/proc/<pid>/status`: first line carries the process name
//! - `/proc/<pid>/maps`: one line per mapped region
//! - `/proc/<pid>/mem`: the target's address space, addressed by absolute offset
//!
//! Reading or writing another process's `mem` requires ptrace access to it
//! (same user with a permissive `ptrace_scope`, or `CAP_SYS_PTRACE`).
//!
//! The procfs root is configurable so tests can point the backend at a
//! synthetic tree.

pub mod maps;
pub mod mem;
pub mod procfs;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use self::mem::ProcMemChannel;
use crate::backend::ProcessBackend;
use crate::error::Result;
use crate::types::{AccessMode, MemoryRegion, ProcessId};

/// Default procfs mount point.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// procfs-based [`ProcessBackend`]
///
/// ## Example
///
/// ```rust,no_run
/// use memsig_core::backend::ProcessBackend;
/// use memsig_core::platform::linux::LinuxBackend;
///
/// let backend = LinuxBackend::new();
/// let pid = backend.find_process("game.exe")?;
/// for region in backend.regions(pid)? {
///     println!("{region}");
/// }
/// # Ok::<(), memsig_core::error::MemError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LinuxBackend
{
    proc_root: PathBuf,
}

impl Default for LinuxBackend
{
    fn default() -> Self
    {
        Self::with_proc_root(DEFAULT_PROC_ROOT)
    }
}

impl LinuxBackend
{
    /// Backend over the system's `/proc`
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Backend over an alternative procfs root
    pub fn with_proc_root(root: impl Into<PathBuf>) -> Self
    {
        Self { proc_root: root.into() }
    }

    /// procfs root this backend reads from
    pub fn proc_root(&self) -> &Path
    {
        &self.proc_root
    }

    /// Path of the memory file for `pid`
    pub fn mem_path(&self, pid: ProcessId) -> PathBuf
    {
        self.proc_root.join(pid.to_string()).join("mem")
    }

    fn maps_path(&self, pid: ProcessId) -> PathBuf
    {
        self.proc_root.join(pid.to_string()).join("maps")
    }
}

impl ProcessBackend for LinuxBackend
{
    type Channel = ProcMemChannel;

    fn find_process(&self, name: &str) -> Result<ProcessId>
    {
        let pid = procfs::find_pid_by_name(&self.proc_root, name)?;
        debug!(%pid, name, "resolved process");
        Ok(pid)
    }

    fn regions(&self, pid: ProcessId) -> Result<Vec<MemoryRegion>>
    {
        let content = fs::read_to_string(self.maps_path(pid))?;
        Ok(maps::parse_maps(&content))
    }

    fn open_channel(&self, pid: ProcessId, mode: AccessMode) -> Result<Self::Channel>
    {
        ProcMemChannel::open(self.mem_path(pid), mode)
    }
}
