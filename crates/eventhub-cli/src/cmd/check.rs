//! `eh check`: probe storage and validate the event container.

use eventhub_core::error::ErrorCode;
use eventhub_core::health;

use super::Context;
use crate::output::{CliError, fail, pretty_kv, render};

fn yes_no(ok: bool) -> &'static str {
    if ok { "ok" } else { "FAILED" }
}

/// Execute `eh check`. Prints the report, then exits non-zero if unhealthy.
///
/// # Errors
///
/// Returns an error if the project is missing or any check failed.
pub fn run_check(ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let report = health::check(&project.store());

    render(ctx.output, &report, |r, w| {
        pretty_kv(w, "Storage", yes_no(r.storage_writable))?;
        pretty_kv(w, "Events", yes_no(r.event_data_valid))?;
        pretty_kv(w, "Count", r.event_count.to_string())?;
        for problem in &r.problems {
            writeln!(w, "  - {problem}")?;
        }
        Ok(())
    })?;

    if report.is_healthy() {
        return Ok(());
    }
    let code = if report.event_data_valid {
        ErrorCode::StorageUnavailable
    } else {
        ErrorCode::MalformedData
    };
    Err(fail(ctx.output, &CliError::from_code(code, "health check failed")))
}
