//! Routes extraction events into the log

use memex::{MapLineError, MemoryRegion, RegionError, Reporter};
use tracing::{debug, trace, warn};

/// Reporter that turns every pass event into a `tracing` event
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn line_rejected(&mut self, line_number: usize, line: &str, reason: &MapLineError) {
        warn!("Ignored map line {} ({}): {}", line_number, reason, line);
    }

    fn region_copied(&mut self, region: &MemoryRegion, bytes: u64) {
        debug!("Copied {:#x} bytes: {}", bytes, region);
    }

    fn region_unreadable(&mut self, region: &MemoryRegion) {
        trace!("Not readable: {}", region);
    }

    fn region_skipped(&mut self, region: &MemoryRegion, error: &RegionError) {
        warn!("Skipped: {} ({})", region, error);
    }
}
