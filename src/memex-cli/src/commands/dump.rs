//! Dump command handlers
//!
//! Handles `dump` (existing process) and `run` (launch, settle, dump).

use anyhow::{Context, Result};
use memex::{DumpOptions, ExtractionSummary, ProcessHandle, ProcessSource};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::launch;
use crate::cli::DumpArgs;
use crate::config::Config;
use crate::preflight;
use crate::report::TracingReporter;

/// Dump settings after merging flags over config
#[derive(Debug, Clone)]
pub struct DumpSettings {
    pub output: PathBuf,
    pub options: DumpOptions,
    pub json: bool,
}

impl DumpSettings {
    pub fn resolve(args: &DumpArgs, config: &Config) -> Self {
        DumpSettings {
            output: args.output.clone().unwrap_or_else(|| config.output.clone()),
            options: DumpOptions {
                policy: args
                    .on_parse_error
                    .map_or(config.parse_policy, Into::into),
                chunk_size: config.chunk_size,
            },
            json: args.json,
        }
    }
}

/// Handle `dump --pid`
pub fn handle_pid(pid: u32, args: &DumpArgs) -> Result<()> {
    let config = Config::load()?;
    preflight::check_privileges(config.require_root && !args.no_root_check)?;
    let process = preflight::validate_pid(pid)?;

    let settings = DumpSettings::resolve(args, &config);
    let summary = run_dump(&process, &settings)?;
    print_completion(&summary, settings.json)
}

/// Handle `run -- <command>`
pub fn handle_run(
    command: &[String],
    delay: Option<u64>,
    kill: bool,
    args: &DumpArgs,
) -> Result<()> {
    let config = Config::load()?;
    preflight::check_privileges(config.require_root && !args.no_root_check)?;

    let settle = delay.map_or_else(|| config.settle_delay(), Duration::from_millis);
    let launched = launch::launch(command, settle)?;
    let process = ProcessHandle::new(launched.pid());

    let settings = DumpSettings::resolve(args, &config);
    let result = run_dump(&process, &settings);

    let cleanup = if kill { launched.terminate() } else { Ok(()) };
    let summary = dump_outcome(result, cleanup)?;
    print_completion(&summary, settings.json)
}

/// The dump's own result, whatever happened to the launched process after it
fn dump_outcome(
    dump: Result<ExtractionSummary>,
    cleanup: Result<()>,
) -> Result<ExtractionSummary> {
    if let Err(err) = cleanup {
        warn!("{:#}", err);
    }
    dump
}

/// One extraction pass with log output
pub fn run_dump<P: ProcessSource>(
    process: &P,
    settings: &DumpSettings,
) -> Result<ExtractionSummary> {
    let pid = process.pid();
    info!("Dumping process {} to {}", pid, settings.output.display());

    let summary = memex::dump(
        process,
        &settings.output,
        &settings.options,
        &mut TracingReporter,
    )
    .with_context(|| format!("Failed to dump process {}", pid))?;

    info!(
        "{} of {} regions copied ({} bytes), {} skipped, {} not readable",
        summary.copied, summary.regions, summary.bytes_written, summary.skipped, summary.unreadable
    );
    if summary.rejected_lines > 0 {
        warn!("{} memory map lines could not be parsed", summary.rejected_lines);
    }
    if summary.is_empty() {
        warn!(
            "No memory could be copied; {} is empty",
            summary.output.display()
        );
    }

    Ok(summary)
}

/// Completion notice, plus the JSON summary when asked for
pub fn print_completion(summary: &ExtractionSummary, json: bool) -> Result<()> {
    println!("{}", completion_notice(summary));
    if json {
        let rendered =
            serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
        println!("{}", rendered);
    }
    Ok(())
}

pub fn completion_notice(summary: &ExtractionSummary) -> String {
    format!(
        "[OK] Process ({}) dumped to: {}",
        summary.pid,
        summary.output.display()
    )
}
