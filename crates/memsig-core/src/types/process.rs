//! Process identifier and channel access mode.

use std::fmt;

/// Process identifier (PID)
///
/// A newtype over the kernel's numeric PID so it cannot be mixed up with
/// other integers flowing through the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Access mode a memory channel is opened with
///
/// - `Peek`: read-only
/// - `Poke`: read-write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode
{
    /// Read-only access
    Peek,
    /// Read-write access
    Poke,
}

impl AccessMode
{
    /// Whether writes are permitted in this mode
    pub const fn is_writable(self) -> bool
    {
        matches!(self, AccessMode::Poke)
    }
}

impl fmt::Display for AccessMode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            AccessMode::Peek => f.write_str("reading"),
            AccessMode::Poke => f.write_str("writing"),
        }
    }
}
