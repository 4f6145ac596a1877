//! # Error Types
//!
//! Error handling for process discovery, memory access, and signature work.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and readable messages.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AccessMode, Address};

/// Main error type for memsig operations
///
/// ## Error Categories
///
/// 1. **Process errors**: `ProcessNotFound`, `Process` (a required segment could not be located)
/// 2. **Channel errors**: `ChannelOpen`, `Peek`, `Poke`
/// 3. **Input errors**: `Logic` (signature length, scan configuration), `Parse` (malformed text)
/// 4. **I/O errors**: `Io` (procfs metadata)
///
/// Nothing in this crate retries on error. The only condition recovered
/// locally is an unreadable chunk during a signature scan, which never
/// surfaces as a `MemError`.
#[derive(Error, Debug)]
pub enum MemError
{
    /// No running process has a name equal to (or starting with) the requested name
    #[error("Failed to find process: {0}")]
    ProcessNotFound(String),

    /// The process exists but could not be used
    ///
    /// Raised when segment classification cannot locate the code or
    /// read-write data segment of the main image.
    #[error("Process error: {0}")]
    Process(String),

    /// The OS-level memory handle could not be opened
    #[error("Failed to open memory for {mode} ({}): {source}", path.display())]
    ChannelOpen
    {
        /// Path of the memory file that was opened
        path: PathBuf,
        /// Requested access mode
        mode: AccessMode,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// Seeking to or reading from the target's memory failed
    #[error("Failed to read process memory at offset 0x{:X}: {message}", offset.value())]
    Peek
    {
        /// Absolute address that was being read
        offset: Address,
        /// OS error text
        message: String,
    },

    /// Seeking to or writing into the target's memory failed
    #[error("Failed to write process memory at offset 0x{:X}: {message}", offset.value())]
    Poke
    {
        /// Absolute address that was being written
        offset: Address,
        /// OS error text
        message: String,
    },

    /// Internal contract violated (signature too long, bad scan configuration)
    #[error("Logic error: {0}")]
    Logic(String),

    /// Malformed signature or offset-chain text
    #[error("Malformed input '{input}': {reason}")]
    Parse
    {
        /// The offending substring
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// I/O error while reading procfs metadata
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`MemError`]
///
/// Lets callers branch on the kind of failure without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind
{
    /// Process lookup or segment classification failed
    Process,
    /// Memory handle could not be opened
    Channel,
    /// Read path failure
    Peek,
    /// Write path failure
    Poke,
    /// Contract violation
    Logic,
    /// Malformed textual input
    Parse,
    /// Other I/O failure
    Io,
}

impl fmt::Display for ErrorKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            ErrorKind::Process => "process",
            ErrorKind::Channel => "channel",
            ErrorKind::Peek => "peek",
            ErrorKind::Poke => "poke",
            ErrorKind::Logic => "logic",
            ErrorKind::Parse => "parse",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

impl MemError
{
    /// Classify this error
    pub fn kind(&self) -> ErrorKind
    {
        match self {
            MemError::ProcessNotFound(_) | MemError::Process(_) => ErrorKind::Process,
            MemError::ChannelOpen { .. } => ErrorKind::Channel,
            MemError::Peek { .. } => ErrorKind::Peek,
            MemError::Poke { .. } => ErrorKind::Poke,
            MemError::Logic(_) => ErrorKind::Logic,
            MemError::Parse { .. } => ErrorKind::Parse,
            MemError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self
    {
        MemError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for `Result<T, MemError>`
///
/// ```rust
/// use memsig_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MemError>;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_peek_message_has_hex_offset()
    {
        let err = MemError::Peek {
            offset: Address::new(0x7ff0_1234),
            message: "Input/output error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read process memory at offset 0x7FF01234: Input/output error"
        );
        assert_eq!(err.kind(), ErrorKind::Peek);
    }

    #[test]
    fn test_kinds()
    {
        assert_eq!(MemError::ProcessNotFound("x".into()).kind(), ErrorKind::Process);
        assert_eq!(MemError::Process("x".into()).kind(), ErrorKind::Process);
        assert_eq!(MemError::Logic("x".into()).kind(), ErrorKind::Logic);
        assert_eq!(MemError::parse("1,,2", "empty token").kind(), ErrorKind::Parse);
    }
}
