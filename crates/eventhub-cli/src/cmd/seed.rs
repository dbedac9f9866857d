//! `eh seed`: add the sample events to an empty store.

use chrono::Utc;
use eventhub_core::seed::seed_sample_events;

use super::Context;
use crate::output::{CliError, fail, render};

/// Execute `eh seed`. A store that already holds events is left alone.
///
/// # Errors
///
/// Returns an error if the project is missing or the write fails.
pub fn run_seed(ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let seeded = seed_sample_events(&project.store(), Utc::now())
        .map_err(|err| fail(ctx.output, &CliError::from_code(err.code(), err.to_string())))?;

    let payload = serde_json::json!({ "seeded": seeded });
    render(ctx.output, &payload, |_, w| {
        if seeded == 0 {
            writeln!(w, "Store already has events; nothing seeded.")
        } else {
            writeln!(w, "✓ seeded {seeded} sample events")
        }
    })
}
