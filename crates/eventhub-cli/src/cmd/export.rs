//! `eh export`: dump every stored event as a JSON array.
//!
//! The output uses the same record shape as the event container, so an
//! export can be dropped back in place as `.eventhub/<key>.json`.

use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;

use super::Context;
use crate::output::{CliError, fail};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute `eh export`.
///
/// Unlike other reads this refuses a malformed container rather than
/// exporting an empty list.
///
/// # Errors
///
/// Returns an error if the project is missing, the container is malformed,
/// or the output file cannot be written.
pub fn run_export(args: &ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let events = project
        .store()
        .try_load_all()
        .map_err(|err| fail(ctx.output, &CliError::from_code(err.code(), err.to_string())))?;

    let mut json = serde_json::to_string_pretty(&events)?;
    json.push('\n');

    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(count = events.len(), path = %path.display(), "exported events");
            eprintln!("exported {} events to {}", events.len(), path.display());
        }
        None => print!("{json}"),
    }
    Ok(())
}
