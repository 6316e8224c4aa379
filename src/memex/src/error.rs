//! Fatal errors for an extraction pass.
//!
//! Anything in here aborts the whole pass. Region-level failures live in
//! [`crate::extract::RegionError`] and never surface as an [`Error`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::maps::MapLineError;
use crate::source::Pid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("memory map of process {pid} is unavailable: {source}")]
    MapUnavailable {
        pid: Pid,
        #[source]
        source: io::Error,
    },

    #[error("memory map line {line_number} is malformed ({reason}): {line}")]
    MapParse {
        line_number: usize,
        line: String,
        #[source]
        reason: MapLineError,
    },

    #[error("memory of process {pid} cannot be opened: {source}")]
    MemoryStreamUnavailable {
        pid: Pid,
        #[source]
        source: io::Error,
    },

    #[error("failed to write dump to {}: {source}", .path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
