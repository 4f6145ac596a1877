//! Process discovery through `/proc/<pid>/status`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::trace;

use crate::error::{MemError, Result};
use crate::types::ProcessId;

/// Find a process by name under `proc_root`
///
/// The first line of each `status` file must read `Name:<ws><name>`. An
/// exact match returns immediately; otherwise the first process whose name
/// starts with `name` is kept as a fallback. The kernel truncates names to
/// 15 bytes, which is what the prefix fallback is for.
pub fn find_pid_by_name(proc_root: &Path, name: &str) -> Result<ProcessId>
{
    let mut fallback = None;

    for entry in fs::read_dir(proc_root)? {
        let Ok(entry) = entry else { continue };
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        if pid == 0 || !entry.path().is_dir() {
            continue;
        }

        // Processes can exit mid-walk; an unreadable status file is not an error.
        let Some(process_name) = read_status_name(&entry.path().join("status")) else {
            continue;
        };

        if process_name == name {
            trace!(pid, name, "exact process name match");
            return Ok(ProcessId(pid));
        }
        if fallback.is_none() && process_name.starts_with(name) {
            trace!(pid, process_name = %process_name, "prefix process name match");
            fallback = Some(ProcessId(pid));
        }
    }

    fallback.ok_or_else(|| MemError::ProcessNotFound(name.to_string()))
}

/// Read the `Name:` field from the first line of a status file.
fn read_status_name(path: &Path) -> Option<String>
{
    let file = File::open(path).ok()?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).ok()?;
    parse_status_name(&line).map(str::to_string)
}

/// Extract the process name from a `Name:` status line.
pub(crate) fn parse_status_name(line: &str) -> Option<&str>
{
    let value = line.strip_prefix("Name:")?;
    if !value.starts_with([' ', '\t']) {
        return None;
    }
    let value = value.trim_start_matches([' ', '\t']).trim_end_matches(['\n', '\r']);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_status_name()
    {
        assert_eq!(parse_status_name("Name:\tffxiv_dx11.exe\n"), Some("ffxiv_dx11.exe"));
        assert_eq!(parse_status_name("Name:   bash"), Some("bash"));
        assert_eq!(parse_status_name("Name:\t\n"), None);
        assert_eq!(parse_status_name("Umask:\t0022\n"), None);
        assert_eq!(parse_status_name("Name:bash"), None);
    }
}
