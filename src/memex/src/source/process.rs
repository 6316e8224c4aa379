//! Live Process Source
//!
//! Reads a running process through procfs.

use super::{Pid, ProcessSource};

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

const DEFAULT_PROC_ROOT: &str = "/proc";

/// Handle on a live process, keyed by pid
///
/// Validity is not re-checked between opening the map and opening memory;
/// a process that exits in between surfaces as read failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pid: Pid,
    proc_root: PathBuf,
}

impl ProcessHandle {
    pub fn new(pid: Pid) -> Self {
        Self::with_proc_root(pid, DEFAULT_PROC_ROOT)
    }

    /// Use a procfs mounted somewhere other than `/proc`
    pub fn with_proc_root<P: Into<PathBuf>>(pid: Pid, proc_root: P) -> Self {
        ProcessHandle {
            pid,
            proc_root: proc_root.into(),
        }
    }

    /// `<proc_root>/<pid>`
    pub fn proc_dir(&self) -> PathBuf {
        self.proc_root.join(self.pid.to_string())
    }

    pub fn maps_path(&self) -> PathBuf {
        self.proc_dir().join("maps")
    }

    pub fn mem_path(&self) -> PathBuf {
        self.proc_dir().join("mem")
    }

    /// Whether procfs currently lists this pid
    pub fn exists(&self) -> bool {
        self.proc_dir().is_dir()
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }
}

impl ProcessSource for ProcessHandle {
    type Maps = BufReader<File>;
    type Memory = File;

    fn pid(&self) -> Pid {
        self.pid
    }

    fn open_maps(&self) -> io::Result<Self::Maps> {
        File::open(self.maps_path()).map(BufReader::new)
    }

    fn open_memory(&self) -> io::Result<Self::Memory> {
        File::open(self.mem_path())
    }
}
