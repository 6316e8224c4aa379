//! CLI argument definitions for memex
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;

pub use self::core::{Cli, Commands, DumpArgs};
