//! Core CLI definitions

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use memex::ParsePolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memex", version)]
#[command(
    about = "Memory Extractor - carve packed executables out of process memory",
    long_about = None
)]
#[command(arg_required_else_help = true)]
#[command(after_help = "Examples:
  memex dump -p 23263
  memex dump -o sus --pid 23465
  memex run -- ./sus --config /home/user/config.txt")]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// What to do with a memory map line that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Log the line and keep going
    Skip,
    /// Stop before writing anything
    Abort,
}

impl From<PolicyArg> for ParsePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => ParsePolicy::Skip,
            PolicyArg::Abort => ParsePolicy::Abort,
        }
    }
}

/// Options shared by every command that writes a dump
#[derive(Args, Debug, Clone, Default)]
pub struct DumpArgs {
    /// Write output to path/file (defaults to the configured output, ./output.dump)
    #[arg(short, long, env = "MEMEX_OUTPUT")]
    pub output: Option<PathBuf>,

    /// How to treat unparsable memory map lines
    #[arg(long, value_enum)]
    pub on_parse_error: Option<PolicyArg>,

    /// Do not require root privileges
    #[arg(long)]
    pub no_root_check: bool,

    /// Print a JSON summary of the dump
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dump the memory of a running process
    #[command(visible_alias = "d")]
    Dump {
        /// Process ID to extract from
        #[arg(short, long)]
        pid: u32,

        #[command(flatten)]
        args: DumpArgs,
    },

    /// Start a command, give it time to unpack, then dump it
    #[command(visible_alias = "r")]
    Run {
        /// Milliseconds to wait before reading memory (defaults to the configured delay)
        #[arg(short, long)]
        delay: Option<u64>,

        /// Terminate the started process after the dump
        #[arg(long)]
        kill: bool,

        #[command(flatten)]
        args: DumpArgs,

        /// The command to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// List the memory regions of a running process
    #[command(visible_alias = "m")]
    Maps {
        /// Process ID to inspect
        #[arg(short, long)]
        pid: u32,

        /// Only show regions that would be dumped
        #[arg(short, long)]
        readable: bool,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default output path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Set default settle delay in milliseconds
        #[arg(long)]
        delay: Option<u64>,

        /// Set default handling of unparsable map lines
        #[arg(long, value_enum)]
        parse_policy: Option<PolicyArg>,

        /// Set whether root privileges are required
        #[arg(long)]
        require_root: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
