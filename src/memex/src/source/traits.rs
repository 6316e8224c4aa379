//! Process Source Trait
//!
//! Core abstraction over the operating system's process-memory interface.

use std::io::{self, BufRead, Read, Seek};

/// Operating system process identifier
pub type Pid = u32;

/// Trait for opening the two views of a process the extractor consumes
///
/// Neither view is locked: the target keeps running and may remap its
/// address space between the map read and any memory read.
pub trait ProcessSource {
    /// Line-oriented memory map description
    type Maps: BufRead;

    /// Raw memory stream addressed by virtual address
    type Memory: Read + Seek;

    /// Identifier of the target process
    fn pid(&self) -> Pid;

    /// Open the memory map description
    fn open_maps(&self) -> io::Result<Self::Maps>;

    /// Open the raw memory stream
    fn open_memory(&self) -> io::Result<Self::Memory>;
}
