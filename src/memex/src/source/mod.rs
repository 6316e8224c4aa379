//! Process Source Abstraction
//!
//! Where the map description and the raw memory stream come from:
//! - Live processes via `ProcessHandle` (`/proc/<pid>/maps`, `/proc/<pid>/mem`)
//! - Mock sources for testing

mod process;
mod traits;

#[cfg(test)]
mod mock;

pub use process::ProcessHandle;
pub use traits::{Pid, ProcessSource};
