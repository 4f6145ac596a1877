//! Memory region records produced by region enumeration.

use std::fmt;

use bitflags::bitflags;

use super::Address;

bitflags! {
    /// Access permissions of a mapped region.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u8 {
        const READ    = 0b001;
        const WRITE   = 0b010;
        const EXECUTE = 0b100;
    }
}

impl RegionFlags
{
    /// Parse the leading `rwx` characters of a permission string
    ///
    /// Any character other than the expected letter in a position leaves
    /// that permission unset, so `"r-xp"` and `"r-x"` both give
    /// `READ | EXECUTE`. A fourth character is ignored here; see
    /// [`MemoryRegion::shared`].
    ///
    /// ```rust
    /// use memsig_core::types::RegionFlags;
    ///
    /// assert_eq!(RegionFlags::from_permissions("r-xp"), RegionFlags::READ | RegionFlags::EXECUTE);
    /// assert_eq!(RegionFlags::from_permissions("rw-p"), RegionFlags::READ | RegionFlags::WRITE);
    /// ```
    pub fn from_permissions(perms: &str) -> Self
    {
        let bytes = perms.as_bytes();
        let mut flags = RegionFlags::empty();
        if bytes.first() == Some(&b'r') {
            flags |= RegionFlags::READ;
        }
        if bytes.get(1) == Some(&b'w') {
            flags |= RegionFlags::WRITE;
        }
        if bytes.get(2) == Some(&b'x') {
            flags |= RegionFlags::EXECUTE;
        }
        flags
    }
}

impl fmt::Display for RegionFlags
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let r = if self.contains(RegionFlags::READ) { 'r' } else { '-' };
        let w = if self.contains(RegionFlags::WRITE) { 'w' } else { '-' };
        let x = if self.contains(RegionFlags::EXECUTE) { 'x' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}

/// A contiguous range of the target's address space
///
/// Regions are produced fresh by every enumeration and never cached by the
/// backend. `start <= end` always holds for regions coming out of a backend.
///
/// ## Example
///
/// ```rust
/// use memsig_core::types::{Address, MemoryRegion, RegionFlags};
///
/// let text = MemoryRegion::new(
///     Address::new(0x1000),
///     Address::new(0x3000),
///     RegionFlags::READ | RegionFlags::EXECUTE,
/// )
/// .with_file("game.exe");
///
/// assert_eq!(text.size(), 0x2000);
/// assert!(text.mapped);
/// assert!(text.contains(Address::new(0x2fff)));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryRegion
{
    /// Start address (inclusive)
    pub start: Address,
    /// End address (exclusive)
    pub end: Address,
    /// Read/write/execute permissions
    pub flags: RegionFlags,
    /// `true` for shared mappings (`s` in the permission string)
    pub shared: bool,
    /// `true` when the region is backed by a file rather than anonymous memory
    pub mapped: bool,
    /// Base name of the backing file; empty for anonymous regions
    pub filename: String,
}

impl MemoryRegion
{
    /// Create an anonymous, private region
    pub fn new(start: Address, end: Address, flags: RegionFlags) -> Self
    {
        Self {
            start,
            end,
            flags,
            ..Self::default()
        }
    }

    /// Mark the region as file-backed by `filename`
    #[must_use]
    pub fn with_file(mut self, filename: impl Into<String>) -> Self
    {
        self.mapped = true;
        self.filename = filename.into();
        self
    }

    /// Size of the region in bytes (0 if `end <= start`)
    pub fn size(&self) -> u64
    {
        self.end.value().saturating_sub(self.start.value())
    }

    /// Check if the region is readable
    pub fn is_readable(&self) -> bool
    {
        self.flags.contains(RegionFlags::READ)
    }

    /// Check if the region is writable
    pub fn is_writable(&self) -> bool
    {
        self.flags.contains(RegionFlags::WRITE)
    }

    /// Check if the region is executable
    pub fn is_executable(&self) -> bool
    {
        self.flags.contains(RegionFlags::EXECUTE)
    }

    /// Check if an address lies within `[start, end)`
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && address < self.end
    }
}

impl fmt::Display for MemoryRegion
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "{:012x}-{:012x} {}{}",
            self.start,
            self.end,
            self.flags,
            if self.shared { 's' } else { 'p' }
        )?;
        if !self.filename.is_empty() {
            write!(f, " {}", self.filename)?;
        }
        Ok(())
    }
}
