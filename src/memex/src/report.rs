//! Reporting side channel
//!
//! The map reader and extractor never print. Everything an operator might want
//! to hear about goes through a [`Reporter`] supplied by the caller.

use crate::extract::RegionError;
use crate::maps::MapLineError;
use crate::region::MemoryRegion;

pub trait Reporter {
    /// A map line was rejected and skipped (only under `ParsePolicy::Skip`)
    fn line_rejected(&mut self, _line_number: usize, _line: &str, _reason: &MapLineError) {}

    /// A region was copied into the artifact
    fn region_copied(&mut self, _region: &MemoryRegion, _bytes: u64) {}

    /// A region lacks read permission and was passed over without touching memory
    fn region_unreadable(&mut self, _region: &MemoryRegion) {}

    /// A readable region could not be copied; the pass continues
    fn region_skipped(&mut self, region: &MemoryRegion, error: &RegionError);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn region_skipped(&mut self, _region: &MemoryRegion, _error: &RegionError) {}
}

/// Records region start addresses and line numbers per event
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub rejected: Vec<usize>,
    pub copied: Vec<u64>,
    pub unreadable: Vec<u64>,
    pub skipped: Vec<(u64, String)>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn line_rejected(&mut self, line_number: usize, _line: &str, _reason: &MapLineError) {
        self.rejected.push(line_number);
    }

    fn region_copied(&mut self, region: &MemoryRegion, _bytes: u64) {
        self.copied.push(region.start);
    }

    fn region_unreadable(&mut self, region: &MemoryRegion) {
        self.unreadable.push(region.start);
    }

    fn region_skipped(&mut self, region: &MemoryRegion, error: &RegionError) {
        self.skipped.push((region.start, error.to_string()));
    }
}
