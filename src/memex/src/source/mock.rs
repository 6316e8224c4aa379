//! Mock Process Source
//!
//! A synthetic process with fixed map text and memory contents, for testing
//! the map reader and the extractor without a live target.

use super::{Pid, ProcessSource};

use std::cell::RefCell;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::ops::Range;
use std::rc::Rc;

const EIO: i32 = 5;

/// Raw memory made of backed segments; anything else reads as EIO
#[derive(Debug, Clone, Default)]
pub struct MockMemory {
    /// (base address, contents)
    segments: Vec<(u64, Vec<u8>)>,
    /// Address ranges that fail to read even when backed
    failing: Vec<Range<u64>>,
    pos: u64,
    /// Every seek target, shared between clones handed out by `MockProcess`
    seeks: Rc<RefCell<Vec<u64>>>,
}

impl MockMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back `data.len()` bytes starting at `base`
    pub fn with_segment(mut self, base: u64, data: Vec<u8>) -> Self {
        self.segments.push((base, data));
        self
    }

    /// Make reads touching `range` fail with EIO
    pub fn with_failure(mut self, range: Range<u64>) -> Self {
        self.failing.push(range);
        self
    }

    /// Addresses seeked to so far, across all clones
    pub fn seeks(&self) -> Vec<u64> {
        self.seeks.borrow().clone()
    }

    fn segment_at(&self, address: u64) -> Option<&[u8]> {
        self.segments.iter().find_map(|(base, data)| {
            let end = base + data.len() as u64;
            if address >= *base && address < end {
                Some(&data[(address - base) as usize..])
            } else {
                None
            }
        })
    }
}

impl Read for MockMemory {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let request = self.pos..self.pos + buf.len() as u64;
        if self
            .failing
            .iter()
            .any(|f| f.start < request.end && request.start < f.end)
        {
            return Err(io::Error::from_raw_os_error(EIO));
        }

        let available = self
            .segment_at(self.pos)
            .ok_or_else(|| io::Error::from_raw_os_error(EIO))?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for MockMemory {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        self.pos = match target {
            SeekFrom::Start(address) => address,
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "seek before start")
            })?,
            SeekFrom::End(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "memory has no end",
                ))
            }
        };
        self.seeks.borrow_mut().push(self.pos);
        Ok(self.pos)
    }
}

/// A mock process source for testing map reading and extraction
pub struct MockProcess {
    pub pid: Pid,
    pub maps: String,
    pub memory: MockMemory,
    /// Simulate a process whose memory stream cannot be opened
    pub memory_unavailable: bool,
}

impl MockProcess {
    pub fn new(pid: Pid, maps: &str, memory: MockMemory) -> Self {
        Self {
            pid,
            maps: maps.to_string(),
            memory,
            memory_unavailable: false,
        }
    }
}

impl ProcessSource for MockProcess {
    type Maps = Cursor<Vec<u8>>;
    type Memory = MockMemory;

    fn pid(&self) -> Pid {
        self.pid
    }

    fn open_maps(&self) -> io::Result<Self::Maps> {
        Ok(Cursor::new(self.maps.clone().into_bytes()))
    }

    fn open_memory(&self) -> io::Result<Self::Memory> {
        if self.memory_unavailable {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(self.memory.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_memory_reads_segment() {
        let mut mem = MockMemory::new().with_segment(0x1000, vec![0x41, 0x42, 0x43, 0x44]);
        mem.seek(SeekFrom::Start(0x1001)).unwrap();

        let mut buf = [0u8; 2];
        mem.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0x42, 0x43]);
        assert_eq!(mem.seeks(), vec![0x1001]);
    }

    #[test]
    fn test_mock_memory_unbacked_is_eio() {
        let mut mem = MockMemory::new().with_segment(0x1000, vec![0; 4]);
        mem.seek(SeekFrom::Start(0x5000)).unwrap();
        let err = mem.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(EIO));
    }

    #[test]
    fn test_mock_memory_failure_overrides_backing() {
        let mut mem = MockMemory::new()
            .with_segment(0x1000, vec![0; 0x100])
            .with_failure(0x1080..0x1090);
        mem.seek(SeekFrom::Start(0x1000)).unwrap();
        assert!(mem.read_exact(&mut [0u8; 0x100]).is_err());
    }

    #[test]
    fn test_mock_process_shares_seek_log() {
        let process = MockProcess::new(1, "", MockMemory::new());
        let mut opened = process.open_memory().unwrap();
        opened.seek(SeekFrom::Start(0x10)).unwrap();
        assert_eq!(process.memory.seeks(), vec![0x10]);
    }
}
