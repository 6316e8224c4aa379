//! Map Reader
//!
//! Parses a process memory map description into an ordered region sequence.
//!
//! Each line of `/proc/<pid>/maps` looks like:
//!
//! ```text
//! 00400000-00401000 r-xp 00000000 08:01 131074    /bin/true
//! ```
//!
//! Only the address range and permission field are required. Offset, device,
//! inode and path are picked up when present. Lines come out in file order;
//! nothing is sorted, merged or deduplicated.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::region::{MemoryRegion, Permissions};
use crate::report::Reporter;
use crate::source::ProcessSource;

/// Why a single map line was rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MapLineError {
    #[error("no address range")]
    MissingRange,

    #[error("address range {0:?} has no '-' separator")]
    MissingSeparator(String),

    #[error("{0:?} is not a hexadecimal address")]
    InvalidAddress(String),

    #[error("address {0:?} does not fit in 64 bits")]
    AddressOverflow(String),

    #[error("range end {end:#x} is not above start {start:#x}")]
    EmptyRange { start: u64, end: u64 },

    #[error("no permission field")]
    MissingPermissions,

    #[error("{0:?} is not a permission field")]
    InvalidPermissions(String),
}

/// What to do with a line that does not look like a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Report the line and keep going
    #[default]
    Skip,
    /// Fail the whole read on the first bad line
    Abort,
}

/// Reads a process's memory map once, upfront
#[derive(Debug, Clone, Copy, Default)]
pub struct MapReader {
    pub policy: ParsePolicy,
}

impl MapReader {
    pub fn new(policy: ParsePolicy) -> Self {
        MapReader { policy }
    }

    /// Read and parse the whole map description of `process`
    pub fn read<P: ProcessSource>(
        &self,
        process: &P,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<MemoryRegion>> {
        let pid = process.pid();
        let mut maps = process
            .open_maps()
            .map_err(|source| Error::MapUnavailable { pid, source })?;

        let mut regions = Vec::new();
        let mut raw = Vec::new();
        let mut line_number = 0;

        loop {
            raw.clear();
            let read = maps
                .read_until(b'\n', &mut raw)
                .map_err(|source| Error::MapUnavailable { pid, source })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            // Mapped file names are arbitrary bytes
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok(region) => regions.push(region),
                Err(reason) => match self.policy {
                    ParsePolicy::Skip => reporter.line_rejected(line_number, line, &reason),
                    ParsePolicy::Abort => {
                        return Err(Error::MapParse {
                            line_number,
                            line: line.to_string(),
                            reason,
                        })
                    }
                },
            }
        }

        Ok(regions)
    }
}

/// Parse one map line into a region
pub fn parse_line(line: &str) -> std::result::Result<MemoryRegion, MapLineError> {
    let (range, rest) = next_field(line).ok_or(MapLineError::MissingRange)?;
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| MapLineError::MissingSeparator(range.to_string()))?;
    let start = parse_address(start)?;
    let end = parse_address(end)?;
    if end <= start {
        return Err(MapLineError::EmptyRange { start, end });
    }

    let (perms, rest) = next_field(rest).ok_or(MapLineError::MissingPermissions)?;
    let perms = Permissions::parse(perms)
        .ok_or_else(|| MapLineError::InvalidPermissions(perms.to_string()))?;

    let (offset, rest) = next_field(rest).unwrap_or(("", ""));
    let offset = u64::from_str_radix(offset, 16).unwrap_or(0);

    // device, inode, then the path runs to the end of the line
    let rest = next_field(rest).map_or("", |(_, rest)| rest);
    let rest = next_field(rest).map_or("", |(_, rest)| rest);
    let path = rest.trim();

    Ok(MemoryRegion {
        start,
        end,
        perms,
        offset,
        path: (!path.is_empty()).then(|| path.to_string()),
    })
}

fn parse_address(text: &str) -> std::result::Result<u64, MapLineError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MapLineError::InvalidAddress(text.to_string()));
    }
    u64::from_str_radix(text, 16).map_err(|_| MapLineError::AddressOverflow(text.to_string()))
}

/// Split off the next whitespace-delimited field
fn next_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some(text.split_at(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use crate::source::tests::{MockMemory, MockProcess};
    use crate::source::ProcessHandle;

    const TRUE_MAPS: &str = "\
00400000-00401000 r-xp 00000000 08:01 131074                             /bin/true
00601000-00602000 rw-p 00001000 08:01 131074                             /bin/true
7ffc8a1d2000-7ffc8a1f3000 rw-p 00000000 00:00 0                          [stack]
7ffc8a1f6000-7ffc8a1f8000 r-xp 00000000 00:00 0                          [vdso]
";

    fn read(maps: &str, policy: ParsePolicy) -> (Result<Vec<MemoryRegion>>, RecordingReporter) {
        let process = MockProcess::new(99, maps, MockMemory::new());
        let mut reporter = RecordingReporter::default();
        let result = MapReader::new(policy).read(&process, &mut reporter);
        (result, reporter)
    }

    #[test]
    fn test_parse_line_full() {
        let region =
            parse_line("00400000-00401000 r-xp 00000000 08:01 131074 /bin/true").unwrap();
        assert_eq!(region.start, 0x400000);
        assert_eq!(region.end, 0x401000);
        assert_eq!(region.size(), 0x1000);
        assert!(region.is_readable());
        assert!(region.is_executable());
        assert!(!region.is_writable());
        assert_eq!(region.offset, 0);
        assert_eq!(region.path.as_deref(), Some("/bin/true"));
    }

    #[test]
    fn test_parse_line_minimal_and_anonymous() {
        let region = parse_line("1000-2000 ---p").unwrap();
        assert!(!region.is_readable());
        assert_eq!(region.path, None);

        let anon = parse_line("7f0000000000-7f0000021000 rw-p 00000000 00:00 0 ").unwrap();
        assert_eq!(anon.path, None);
    }

    #[test]
    fn test_parse_line_uppercase_hex_and_offset() {
        let region = parse_line("7FFF0000-7FFF1000 r--s 0001A000 00:05 42 /dev/shm/x").unwrap();
        assert_eq!(region.start, 0x7fff0000);
        assert_eq!(region.offset, 0x1a000);
        assert!(region.perms.shared);
    }

    #[test]
    fn test_parse_line_path_keeps_spaces() {
        let region =
            parse_line("1000-2000 r-xp 00000000 08:01 77      /tmp/my dir/a.out (deleted)")
                .unwrap();
        assert_eq!(region.path.as_deref(), Some("/tmp/my dir/a.out (deleted)"));
    }

    #[test]
    fn test_parse_line_rejections() {
        assert_eq!(parse_line(""), Err(MapLineError::MissingRange));
        assert_eq!(
            parse_line("00400000 r-xp"),
            Err(MapLineError::MissingSeparator("00400000".to_string()))
        );
        assert_eq!(
            parse_line("0040000g-00401000 r-xp"),
            Err(MapLineError::InvalidAddress("0040000g".to_string()))
        );
        assert_eq!(
            parse_line("+1000-2000 r-xp"),
            Err(MapLineError::InvalidAddress("+1000".to_string()))
        );
        assert_eq!(
            parse_line("-2000 r-xp"),
            Err(MapLineError::InvalidAddress(String::new()))
        );
        assert_eq!(
            parse_line("1000-10000000000000000 r-xp"),
            Err(MapLineError::AddressOverflow("10000000000000000".to_string()))
        );
        assert_eq!(
            parse_line("2000-2000 r-xp"),
            Err(MapLineError::EmptyRange { start: 0x2000, end: 0x2000 })
        );
        assert_eq!(
            parse_line("3000-2000 r-xp"),
            Err(MapLineError::EmptyRange { start: 0x3000, end: 0x2000 })
        );
        assert_eq!(parse_line("1000-2000"), Err(MapLineError::MissingPermissions));
        assert_eq!(
            parse_line("1000-2000 read"),
            Err(MapLineError::InvalidPermissions("read".to_string()))
        );
    }

    #[test]
    fn test_read_preserves_count_and_order() {
        let (regions, reporter) = read(TRUE_MAPS, ParsePolicy::Abort);
        let regions = regions.unwrap();

        assert_eq!(regions.len(), 4);
        let starts: Vec<u64> = regions.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0x400000, 0x601000, 0x7ffc8a1d2000, 0x7ffc8a1f6000]);
        assert!(regions.iter().all(|r| r.end > r.start));
        assert!(reporter.rejected.is_empty());
    }

    #[test]
    fn test_read_does_not_sort() {
        let (regions, _) = read("5000-6000 r--p\n1000-2000 r--p\n", ParsePolicy::Skip);
        let starts: Vec<u64> = regions.unwrap().iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0x5000, 0x1000]);
    }

    #[test]
    fn test_read_empty_map() {
        let (regions, reporter) = read("", ParsePolicy::Abort);
        assert!(regions.unwrap().is_empty());
        assert!(reporter.rejected.is_empty());
    }

    #[test]
    fn test_read_ignores_blank_lines() {
        let (regions, reporter) = read("\n1000-2000 r--p\n\n", ParsePolicy::Abort);
        assert_eq!(regions.unwrap().len(), 1);
        assert!(reporter.rejected.is_empty());
    }

    #[test]
    fn test_skip_policy_reports_bad_lines() {
        let maps = "1000-2000 r--p\ngarbage here\n3000-4000 rw-p\n5000-5000 r--p\n";
        let (regions, reporter) = read(maps, ParsePolicy::Skip);

        let starts: Vec<u64> = regions.unwrap().iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0x1000, 0x3000]);
        assert_eq!(reporter.rejected, vec![2, 4]);
    }

    #[test]
    fn test_abort_policy_fails_on_first_bad_line() {
        let maps = "1000-2000 r--p\ngarbage here\n3000-4000 zzzz\n";
        let (result, _) = read(maps, ParsePolicy::Abort);

        match result {
            Err(Error::MapParse {
                line_number,
                line,
                reason,
            }) => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "garbage here");
                assert_eq!(reason, MapLineError::MissingSeparator("garbage".to_string()));
            }
            other => panic!("expected MapParse, got {:?}", other),
        }
    }

    #[test]
    fn test_non_utf8_path_is_tolerated() {
        let mut maps = b"1000-2000 r--p 00000000 08:01 5 /tmp/".to_vec();
        maps.extend_from_slice(&[0xff, 0xfe, b'\n']);

        let root = tempfile::tempdir().unwrap();
        let handle = ProcessHandle::with_proc_root(5, root.path());
        std::fs::create_dir(handle.proc_dir()).unwrap();
        std::fs::write(handle.maps_path(), &maps).unwrap();

        let regions = MapReader::default()
            .read(&handle, &mut RecordingReporter::default())
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert!(regions[0].path.as_deref().unwrap().starts_with("/tmp/"));
    }

    #[test]
    fn test_missing_process_is_map_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let handle = ProcessHandle::with_proc_root(31337, root.path());
        let result = MapReader::default().read(&handle, &mut RecordingReporter::default());
        assert!(matches!(result, Err(Error::MapUnavailable { pid: 31337, .. })));
    }

    #[test]
    fn test_own_maps_parse_strictly() {
        let handle = ProcessHandle::new(std::process::id());
        let regions = MapReader::new(ParsePolicy::Abort)
            .read(&handle, &mut RecordingReporter::default())
            .unwrap();
        assert!(!regions.is_empty());
        assert!(regions.iter().any(|r| r.is_readable()));
    }
}
