//! # Memory Channel
//!
//! A scoped, mode-tagged conduit for byte-level access into another
//! process's address space.
//!
//! A channel exclusively owns one OS-level handle. The handle is released
//! when the channel is dropped, on every exit path, so callers never close
//! anything by hand.
//!
//! Every transfer is a seek to the absolute address followed by one read or
//! write. Channels are used from a single thread and perform one transfer at
//! a time.

use crate::error::Result;
use crate::types::{AccessMode, Address};

/// Byte-level access to a target process's memory
///
/// Platform backends implement [`read_into`](MemoryChannel::read_into) and
/// [`write`](MemoryChannel::write); the sized helpers are provided on top.
///
/// ## Errors
///
/// - `Peek`: the seek or read failed (unmapped or protected address, process gone)
/// - `Poke`: the seek or write failed, or the channel was opened with
///   [`AccessMode::Peek`]
pub trait MemoryChannel
{
    /// Mode this channel was opened with
    fn mode(&self) -> AccessMode;

    /// Fill `buf` with the bytes starting at `offset`
    fn read_into(&mut self, offset: Address, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `offset`
    ///
    /// This mutates the target process's memory.
    fn write(&mut self, offset: Address, data: &[u8]) -> Result<()>;

    /// Read `len` bytes starting at `offset`
    fn read(&mut self, offset: Address, len: usize) -> Result<Vec<u8>>
    {
        let mut buf = vec![0u8; len];
        self.read_into(offset, &mut buf)?;
        Ok(buf)
    }

    /// Read one byte
    fn read_u8(&mut self, offset: Address) -> Result<u8>
    {
        let mut buf = [0u8; 1];
        self.read_into(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a native-endian `u16`
    fn read_u16(&mut self, offset: Address) -> Result<u16>
    {
        let mut buf = [0u8; 2];
        self.read_into(offset, &mut buf)?;
        Ok(u16::from_ne_bytes(buf))
    }

    /// Read a native-endian `u32`
    fn read_u32(&mut self, offset: Address) -> Result<u32>
    {
        let mut buf = [0u8; 4];
        self.read_into(offset, &mut buf)?;
        Ok(u32::from_ne_bytes(buf))
    }

    /// Read a native-endian `u64`
    ///
    /// This is the pointer-sized read used by offset-chain resolution.
    fn read_u64(&mut self, offset: Address) -> Result<u64>
    {
        let mut buf = [0u8; 8];
        self.read_into(offset, &mut buf)?;
        Ok(u64::from_ne_bytes(buf))
    }
}
