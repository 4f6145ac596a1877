//! # `/proc/<pid>/maps` Parsing
//!
//! Each line of the maps file describes one mapping:
//!
//! ```text
//! 00400000-00452000 r-xp 00000000 08:02 173521      /usr/bin/dbus-daemon
//! address           perms offset  dev   inode       pathname
//! ```
//!
//! Some mappings are dropped entirely rather than reported:
//!
//! - Mappings starting in the high ranges where WINE places native memory.
//!   Those addresses cannot be reached through `mem` with a plain seek.
//! - Device-special files under `/dev/`.
//! - memfd-backed mappings (`/memfd:...`).

use tracing::warn;

use crate::types::{Address, MemoryRegion, RegionFlags};

/// Start of the range WINE uses for native (non-PE) memory.
pub const NATIVE_RANGE_START: u64 = 0x7f00_0000_0000;

/// Start of the range `lseek` on `mem` cannot reach.
pub const UNSEEKABLE_RANGE_START: u64 = 0x7f00_0000_0000_0000;

/// Parse the complete contents of a maps file
///
/// Regions come back in file order. Malformed lines are logged and skipped.
pub fn parse_maps(content: &str) -> Vec<MemoryRegion>
{
    let mut regions = Vec::new();
    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        match parse_line(line) {
            Ok(Some(region)) => regions.push(region),
            Ok(None) => {}
            Err(reason) => warn!(line, reason, "skipping malformed maps line"),
        }
    }
    regions
}

/// Parse a single maps line
///
/// Returns `Ok(None)` for mappings that are excluded from enumeration.
pub fn parse_line(line: &str) -> Result<Option<MemoryRegion>, &'static str>
{
    let mut rest = line;
    let range = next_field(&mut rest).ok_or("missing address range")?;
    let perms = next_field(&mut rest).ok_or("missing permissions")?;
    let _offset = next_field(&mut rest).ok_or("missing file offset")?;
    let device = next_field(&mut rest).ok_or("missing device")?;
    let _inode = next_field(&mut rest).ok_or("missing inode")?;
    let pathname = rest.trim_start();

    let (start, end) = range.split_once('-').ok_or("malformed address range")?;
    let start = u64::from_str_radix(start, 16).map_err(|_| "malformed start address")?;
    let end = u64::from_str_radix(end, 16).map_err(|_| "malformed end address")?;
    if start > end {
        return Err("start address after end address");
    }

    if start >= NATIVE_RANGE_START || start >= UNSEEKABLE_RANGE_START {
        return Ok(None);
    }

    if perms.len() != 4 {
        return Err("permission string must be four characters");
    }

    let (major, minor) = device.split_once(':').ok_or("malformed device")?;
    let major = u32::from_str_radix(major, 16).map_err(|_| "malformed device major")?;
    let minor = u32::from_str_radix(minor, 16).map_err(|_| "malformed device minor")?;

    let mut region = MemoryRegion::new(
        Address::new(start),
        Address::new(end),
        RegionFlags::from_permissions(perms),
    );
    region.shared = perms.as_bytes()[3] == b's';

    if major != 0 || minor != 0 {
        if pathname.starts_with("/dev/") || pathname.starts_with("/memfd:") {
            return Ok(None);
        }
        let basename = pathname.rsplit_once('/').map_or(pathname, |(_, name)| name);
        region = region.with_file(basename);
    }

    Ok(Some(region))
}

/// Split off the next whitespace-delimited field, advancing `rest`.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str>
{
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (field, remainder) = trimmed.split_at(end);
    *rest = remainder;
    Some(field)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_text_segment_line()
    {
        let region = parse_line("00401000-00452000 r-xp 00001000 08:02 173521      /opt/game/game.exe")
            .unwrap()
            .unwrap();
        assert_eq!(region.start, Address::new(0x401000));
        assert_eq!(region.end, Address::new(0x452000));
        assert_eq!(region.flags, RegionFlags::READ | RegionFlags::EXECUTE);
        assert!(!region.shared);
        assert!(region.mapped);
        assert_eq!(region.filename, "game.exe");
    }

    #[test]
    fn test_anonymous_region_has_no_filename()
    {
        let region = parse_line("01e2c000-01e4d000 rw-p 00000000 00:00 0          [heap]")
            .unwrap()
            .unwrap();
        assert_eq!(region.flags, RegionFlags::READ | RegionFlags::WRITE);
        assert!(!region.mapped);
        assert!(region.filename.is_empty());
    }

    #[test]
    fn test_shared_flag()
    {
        let region = parse_line("10000000-10001000 rw-s 00000000 00:05 42 /SYSV00000000 (deleted)")
            .unwrap()
            .unwrap();
        assert!(region.shared);
        assert!(region.mapped);
        assert_eq!(region.filename, "SYSV00000000 (deleted)");
    }

    #[test]
    fn test_device_and_memfd_mappings_are_dropped()
    {
        assert_eq!(parse_line("20000000-20001000 rw-s 00000000 00:06 7 /dev/dri/card0"), Ok(None));
        assert_eq!(parse_line("20001000-20002000 rw-s 00000000 00:01 9 /memfd:wine-mapping (deleted)"), Ok(None));
    }

    #[test]
    fn test_high_ranges_are_dropped()
    {
        assert_eq!(
            parse_line("7f1234560000-7f1234561000 r-xp 00000000 08:02 11 /usr/lib/libc.so.6"),
            Ok(None)
        );
        assert_eq!(parse_line("7fff0000-80000000 r--p 00000000 00:00 0").map(|r| r.is_some()), Ok(true));
    }

    #[test]
    fn test_device_numbers_are_hex()
    {
        let region = parse_line("00400000-00401000 r--p 00000000 0a:00 5 /a/b").unwrap().unwrap();
        assert!(region.mapped);
        assert_eq!(region.filename, "b");
    }

    #[test]
    fn test_malformed_lines()
    {
        assert!(parse_line("not a maps line").is_err());
        assert!(parse_line("00400000 r-xp 00000000 08:02 1").is_err());
        assert!(parse_line("00400000-00401000 r-x 00000000 08:02 1").is_err());
        assert!(parse_line("00401000-00400000 r-xp 00000000 08:02 1").is_err());
    }

    #[test]
    fn test_parse_maps_keeps_file_order_and_skips_bad_lines()
    {
        let content = "\
00400000-00401000 r--p 00000000 08:02 1 /opt/game/game.exe
garbage
00401000-00402000 r-xp 00001000 08:02 1 /opt/game/game.exe

00402000-00403000 rw-p 00000000 00:00 0
7f0000001000-7f0000002000 r--p 00000000 00:00 0
";
        let regions = parse_maps(content);
        let starts: Vec<u64> = regions.iter().map(|r| r.start.value()).collect();
        assert_eq!(starts, vec![0x400000, 0x401000, 0x402000]);
    }
}
