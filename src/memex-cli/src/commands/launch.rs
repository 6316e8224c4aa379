//! Launch a target for dumping
//!
//! Starts the command, then holds off for the settle delay so a packed
//! binary has time to unpack itself before its memory map is read.

use anyhow::{bail, Context, Result};
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// A process started by memex
pub struct Launched {
    child: Child,
    pub command: String,
}

impl Launched {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Kill the process and reap it
    pub fn terminate(mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            self.child
                .kill()
                .with_context(|| format!("Failed to kill process {}", self.pid()))?;
        }
        let status = self.child.wait()?;
        debug!("Process {} ended: {}", self.pid(), status);
        Ok(())
    }
}

/// Start `command` and return once it has had `settle` to unpack
///
/// Fails if the process is already gone when the delay is over, since there
/// would be nothing left to dump.
pub fn launch(command: &[String], settle: Duration) -> Result<Launched> {
    let (program, args) = command.split_first().context("No command given")?;
    let line = command.join(" ");

    let child = Command::new(program)
        .args(args)
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;
    let mut launched = Launched {
        child,
        command: line,
    };

    debug!(
        "Waiting {} ms for process {} to settle",
        settle.as_millis(),
        launched.pid()
    );
    thread::sleep(settle);

    if let Some(status) = launched.child.try_wait()? {
        bail!(
            "Process {} ({}) exited before it could be dumped: {}",
            launched.pid(),
            launched.command,
            status
        );
    }

    info!("Process started ({}): {}", launched.pid(), launched.command);
    Ok(launched)
}
