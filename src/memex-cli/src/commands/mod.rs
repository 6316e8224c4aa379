//! Command handlers for memex CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod dump;
pub mod launch;
pub mod maps;
