//! `eh delete`: permanently remove an event.

use clap::Args;
use eventhub_core::moderation;

use super::Context;
use crate::output::{CliError, fail, render};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Event ID.
    pub id: String,
}

/// Execute `eh delete`. Allowed for admins and the event's organizer.
///
/// # Errors
///
/// Returns an error if the project or identity is missing, the event does
/// not exist, or the session may not delete it.
pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = ctx.require_session()?;

    let removed = moderation::delete_event(&project.store(), &session, args.id.trim())
        .map_err(|err| fail(ctx.output, &CliError::from_code(err.code(), err.to_string())))?;

    let payload = serde_json::json!({
        "id": removed.id,
        "title": removed.title,
        "deleted": true,
    });
    render(ctx.output, &payload, |_, w| {
        writeln!(w, "✓ deleted {} ({})", removed.id, removed.title)
    })
}
