//! Tests for platform-agnostic types

use memsig_core::types::{AccessMode, Address, MemoryRegion, ProcessId, RegionFlags};

#[test]
fn test_process_id_conversions()
{
    let pid = ProcessId::from(12345);
    assert_eq!(pid.0, 12345);
    let value: u32 = pid.into();
    assert_eq!(value, 12345);
    assert_eq!(pid.to_string(), "12345");
}

#[test]
fn test_address_arithmetic()
{
    let base = Address::new(0x1000);
    assert_eq!(base + 0x10, Address::new(0x1010));
    assert_eq!(base - 0x10, Address::new(0x0ff0));
    assert_eq!(Address::new(0x1010) - base, 0x10);
    assert_eq!(base.offset(-0x800), Address::new(0x800));
    assert_eq!(base.offset(0x20), Address::new(0x1020));
    assert_eq!(Address::new(u64::MAX).checked_add(1), None);
    assert_eq!(Address::ZERO.checked_sub(1), None);
    assert!(Address::ZERO.is_null());
    assert!(!base.is_null());
}

#[test]
fn test_address_formatting()
{
    let address = Address::new(0x0040_1000);
    assert_eq!(address.to_string(), "0x0000000000401000");
    assert_eq!(format!("{address:X}"), "401000");
    assert_eq!(format!("{address:x}"), "401000");
}

#[test]
fn test_region_flags_from_permissions()
{
    assert_eq!(RegionFlags::from_permissions("r--p"), RegionFlags::READ);
    assert_eq!(RegionFlags::from_permissions("rwxs"), RegionFlags::all());
    assert_eq!(RegionFlags::from_permissions("---p"), RegionFlags::empty());
    // Letters out of position do not count.
    assert_eq!(RegionFlags::from_permissions("xwr-"), RegionFlags::WRITE);
    assert_eq!((RegionFlags::READ | RegionFlags::EXECUTE).to_string(), "r-x");
}

#[test]
fn test_memory_region_accessors()
{
    let region = MemoryRegion::new(
        Address::new(0x2000),
        Address::new(0x3000),
        RegionFlags::READ | RegionFlags::WRITE,
    );
    assert_eq!(region.size(), 0x1000);
    assert!(region.is_readable());
    assert!(region.is_writable());
    assert!(!region.is_executable());
    assert!(region.contains(Address::new(0x2000)));
    assert!(!region.contains(Address::new(0x3000)));
    assert!(!region.mapped);
    assert!(region.filename.is_empty());
}

#[test]
fn test_memory_region_display()
{
    let anonymous = MemoryRegion::new(Address::new(0x1000), Address::new(0x2000), RegionFlags::READ);
    assert_eq!(anonymous.to_string(), "000000001000-000000002000 r--p");

    let mut image = MemoryRegion::new(
        Address::new(0x0040_0000),
        Address::new(0x0040_1000),
        RegionFlags::READ | RegionFlags::EXECUTE,
    )
    .with_file("game.exe");
    image.shared = true;
    assert_eq!(image.to_string(), "000000400000-000000401000 r-xs game.exe");
}

#[test]
fn test_access_mode()
{
    assert!(!AccessMode::Peek.is_writable());
    assert!(AccessMode::Poke.is_writable());
    assert_eq!(AccessMode::Peek.to_string(), "reading");
    assert_eq!(AccessMode::Poke.to_string(), "writing");
}
