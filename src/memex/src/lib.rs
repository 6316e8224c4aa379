//! # memex
//!
//! Memory extraction library - carve the mapped image of a live Linux process.
//!
//! This library provides functionality to:
//! - Parse a process's memory map (`/proc/<pid>/maps`) into typed regions
//! - Copy every readable region from the raw memory stream (`/proc/<pid>/mem`)
//!   into a single flat artifact, in map order
//! - Tolerate regions that vanish or refuse to be read without failing the pass
//!
//! ## Example
//!
//! ```no_run
//! use memex::{dump, DumpOptions, NullReporter, ProcessHandle};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let process = ProcessHandle::new(23263);
//! let summary = dump(&process, "output.dump", &DumpOptions::default(), &mut NullReporter)?;
//!
//! println!("[OK] Process ({}) dumped to: {}", summary.pid, summary.output.display());
//! println!("{} regions copied, {} skipped", summary.copied, summary.skipped);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod maps;
pub mod region;
pub mod report;
pub mod source;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use extract::{
    dump, DumpOptions, ExtractionSummary, Extractor, PassStats, RegionError, Sink,
    DEFAULT_CHUNK_SIZE,
};
#[doc(inline)]
pub use maps::{parse_line, MapLineError, MapReader, ParsePolicy};
#[doc(inline)]
pub use region::{MemoryRegion, Permissions};
#[doc(inline)]
pub use report::{NullReporter, Reporter};
#[doc(inline)]
pub use source::{Pid, ProcessHandle, ProcessSource};
