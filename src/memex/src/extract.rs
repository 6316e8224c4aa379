//! Region Extractor
//!
//! Copies every readable region of a process into one flat artifact.
//!
//! The artifact is a strict concatenation: region bytes in map order, no
//! headers, no padding for regions that were skipped. A region either lands
//! in full or not at all.

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::maps::{MapLineError, MapReader, ParsePolicy};
use crate::region::MemoryRegion;
use crate::report::Reporter;
use crate::source::{Pid, ProcessSource};

/// Read granularity inside a region (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Why one region was left out of the artifact
#[derive(thiserror::Error, Debug)]
pub enum RegionError {
    #[error("seek to {address:#x} failed: {source}")]
    Seek {
        address: u64,
        #[source]
        source: io::Error,
    },

    #[error("read failed after {copied:#x} of {size:#x} bytes: {source}")]
    Read {
        copied: u64,
        size: u64,
        #[source]
        source: io::Error,
    },

    #[error("cannot buffer {size:#x} bytes")]
    Allocation { size: u64 },
}

/// Counters for one pass over a region sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub regions: usize,
    pub unreadable: usize,
    pub copied: usize,
    pub skipped: usize,
    pub bytes_written: u64,
}

/// Where region bytes go
///
/// A region that fails part-way has already been partly streamed, so a sink
/// must be able to give those bytes back.
pub trait Sink: Write {
    /// Bytes held so far
    fn position(&mut self) -> io::Result<u64>;

    /// Drop everything after the first `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Sink for Vec<u8> {
    fn position(&mut self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        Vec::truncate(self, len);
        Ok(())
    }
}

impl Sink for File {
    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(SeekFrom::Start(len))?;
        Ok(())
    }
}

impl<S: Sink> Sink for BufWriter<S> {
    fn position(&mut self) -> io::Result<u64> {
        let buffered = self.buffer().len() as u64;
        Ok(self.get_mut().position()? + buffered)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.flush()?;
        self.get_mut().truncate(len)
    }
}

/// Seek + chunked read + append, once per readable region
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    chunk_size: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Extractor {
    pub fn new(chunk_size: usize) -> Self {
        Extractor {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Run the pass over `regions`, appending to `sink`
    ///
    /// Region failures are reported and absorbed. The only error returned is
    /// a failed write to `sink`, which ends the pass. At most one chunk of
    /// region data is held in memory at a time.
    pub fn extract<M, W>(
        &self,
        memory: &mut M,
        regions: &[MemoryRegion],
        sink: &mut W,
        reporter: &mut dyn Reporter,
    ) -> io::Result<PassStats>
    where
        M: Read + Seek + ?Sized,
        W: Sink + ?Sized,
    {
        let mut stats = PassStats {
            regions: regions.len(),
            ..PassStats::default()
        };
        let mut buffer = Vec::new();

        for region in regions {
            if !region.is_readable() {
                stats.unreadable += 1;
                reporter.region_unreadable(region);
                continue;
            }

            let start = sink.position()?;
            match self.copy_region(memory, region, &mut buffer, sink)? {
                Ok(()) => {
                    stats.copied += 1;
                    stats.bytes_written += region.size();
                    reporter.region_copied(region, region.size());
                }
                Err(error) => {
                    sink.truncate(start)?;
                    stats.skipped += 1;
                    reporter.region_skipped(region, &error);
                }
            }
        }

        Ok(stats)
    }

    /// Stream one region into `sink`
    ///
    /// The outer error is a sink failure. The inner one is a region failure,
    /// after which the caller still has to drop what was already streamed.
    fn copy_region<M, W>(
        &self,
        memory: &mut M,
        region: &MemoryRegion,
        buffer: &mut Vec<u8>,
        sink: &mut W,
    ) -> io::Result<std::result::Result<(), RegionError>>
    where
        M: Read + Seek + ?Sized,
        W: Sink + ?Sized,
    {
        let size = region.size();
        if let Err(source) = memory.seek(SeekFrom::Start(region.start)) {
            return Ok(Err(RegionError::Seek {
                address: region.start,
                source,
            }));
        }

        let chunk = usize::try_from(size)
            .unwrap_or(usize::MAX)
            .min(self.chunk_size);
        if buffer.len() < chunk {
            if buffer.try_reserve_exact(chunk - buffer.len()).is_err() {
                return Ok(Err(RegionError::Allocation {
                    size: chunk as u64,
                }));
            }
            buffer.resize(chunk, 0);
        }

        let mut copied = 0u64;
        while copied < size {
            let len = (size - copied).min(chunk as u64) as usize;
            let piece = &mut buffer[..len];
            if let Err(source) = memory.read_exact(piece) {
                return Ok(Err(RegionError::Read {
                    copied,
                    size,
                    source,
                }));
            }
            sink.write_all(piece)?;
            copied += len as u64;
        }

        Ok(Ok(()))
    }
}

/// Options for a full dump pass
#[derive(Debug, Clone, Copy)]
pub struct DumpOptions {
    pub policy: ParsePolicy,
    pub chunk_size: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            policy: ParsePolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Outcome of a completed pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub pid: Pid,
    pub output: PathBuf,
    pub regions: usize,
    pub unreadable: usize,
    pub copied: usize,
    pub skipped: usize,
    pub rejected_lines: usize,
    pub bytes_written: u64,
}

impl ExtractionSummary {
    /// Nothing reached the artifact
    pub fn is_empty(&self) -> bool {
        self.bytes_written == 0
    }
}

/// Counts rejected map lines on their way to the caller's reporter
struct Tally<'a> {
    inner: &'a mut dyn Reporter,
    rejected: usize,
}

impl Reporter for Tally<'_> {
    fn line_rejected(&mut self, line_number: usize, line: &str, reason: &MapLineError) {
        self.rejected += 1;
        self.inner.line_rejected(line_number, line, reason);
    }

    fn region_copied(&mut self, region: &MemoryRegion, bytes: u64) {
        self.inner.region_copied(region, bytes);
    }

    fn region_unreadable(&mut self, region: &MemoryRegion) {
        self.inner.region_unreadable(region);
    }

    fn region_skipped(&mut self, region: &MemoryRegion, error: &RegionError) {
        self.inner.region_skipped(region, error);
    }
}

/// Dump every readable region of `process` into the file at `output`
///
/// The map is read once, upfront. The memory stream and the output file are
/// then opened once for the whole pass. The output is created or truncated.
pub fn dump<P, Q>(
    process: &P,
    output: Q,
    options: &DumpOptions,
    reporter: &mut dyn Reporter,
) -> Result<ExtractionSummary>
where
    P: ProcessSource,
    Q: AsRef<Path>,
{
    let pid = process.pid();
    let output = output.as_ref();
    let mut tally = Tally {
        inner: reporter,
        rejected: 0,
    };

    let regions = MapReader::new(options.policy).read(process, &mut tally)?;

    let mut memory = process
        .open_memory()
        .map_err(|source| Error::MemoryStreamUnavailable { pid, source })?;

    let sink_error = |source| Error::SinkWrite {
        path: output.to_path_buf(),
        source,
    };
    let mut sink = BufWriter::new(File::create(output).map_err(sink_error)?);

    let stats = Extractor::new(options.chunk_size)
        .extract(&mut memory, &regions, &mut sink, &mut tally)
        .map_err(sink_error)?;
    sink.flush().map_err(sink_error)?;

    Ok(ExtractionSummary {
        pid,
        output: output.to_path_buf(),
        regions: stats.regions,
        unreadable: stats.unreadable,
        copied: stats.copied,
        skipped: stats.skipped,
        rejected_lines: tally.rejected,
        bytes_written: stats.bytes_written,
    })
}
