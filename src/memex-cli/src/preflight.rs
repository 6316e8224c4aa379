//! Checks that run before any process memory is touched
//!
//! Failures here are problems with how memex was invoked. They are returned
//! as [`UsageError`] so `main` can render them through clap's error output.

use anyhow::Result;
use clap::error::ErrorKind;
use memex::ProcessHandle;
use std::fmt;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info};

/// A problem with the invocation rather than with the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UsageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        UsageError {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UsageError {}

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Refuse to run without root when `required`
pub fn check_privileges(required: bool) -> Result<()> {
    require_root(required, is_root())
}

fn require_root(required: bool, root: bool) -> Result<()> {
    if required && !root {
        return Err(UsageError::new(
            ErrorKind::InvalidValue,
            "root privileges required (pass --no-root-check or set require_root = false to try anyway)",
        )
        .into());
    }
    Ok(())
}

/// Resolve a pid to a live process handle
pub fn validate_pid(pid: u32) -> Result<ProcessHandle> {
    let process = ProcessHandle::new(pid);
    if !process.exists() {
        return Err(UsageError::new(
            ErrorKind::ValueValidation,
            format!("Process ID not found '{}'", pid),
        )
        .into());
    }

    match process_name(pid) {
        Some(name) => info!("Target process {} ({})", pid, name),
        None => debug!("Target process {} (name unavailable)", pid),
    }

    Ok(process)
}

/// Short name of a running process, if the OS will tell us
pub fn process_name(pid: u32) -> Option<String> {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
    system
        .process(target)
        .map(|process| process.name().to_string_lossy().into_owned())
}
