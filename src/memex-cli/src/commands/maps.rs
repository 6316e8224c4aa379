//! Region listing
//!
//! Shows what a dump of the process would walk over, without reading memory.

use anyhow::{Context, Result};
use memex::{MapReader, MemoryRegion};

use crate::config::Config;
use crate::preflight;
use crate::report::TracingReporter;

/// Handle `maps --pid`
pub fn handle(pid: u32, readable_only: bool) -> Result<()> {
    let config = Config::load()?;
    let process = preflight::validate_pid(pid)?;

    let regions = MapReader::new(config.parse_policy)
        .read(&process, &mut TracingReporter)
        .with_context(|| format!("Failed to read memory map of process {}", pid))?;

    for line in render(&regions, readable_only) {
        println!("{}", line);
    }
    Ok(())
}

/// Table of regions, header first
pub fn render(regions: &[MemoryRegion], readable_only: bool) -> Vec<String> {
    let shown: Vec<&MemoryRegion> = regions
        .iter()
        .filter(|region| !readable_only || region.is_readable())
        .collect();
    let total: u64 = shown
        .iter()
        .filter(|region| region.is_readable())
        .map(|region| region.size())
        .sum();

    let mut lines = Vec::with_capacity(shown.len() + 3);
    lines.push(format!(
        "Memory regions ({}), {:#x} readable bytes",
        shown.len(),
        total
    ));
    lines.push(format!("{:-<80}", ""));
    lines.extend(
        shown
            .iter()
            .map(|region| format!("{:>12x}  {}", region.size(), region)),
    );
    lines
}
