//! Status transitions: `eh approve|reject|cancel|complete|reinstate` and
//! `eh approve-all`.

use chrono::Utc;
use clap::Args;
use eventhub_core::moderation::{self, Action, ModerationError};
use serde::Serialize;

use super::Context;
use crate::output::{CliError, OutputMode, fail, render};

#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Event ID.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct TransitionOutput {
    id: String,
    action: &'static str,
    status: String,
    reviewed_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct BulkOutput {
    approved: usize,
}

fn moderation_error(output: OutputMode, err: &ModerationError) -> anyhow::Error {
    fail(output, &CliError::from_code(err.code(), err.to_string()))
}

/// Execute a single-event transition.
///
/// # Errors
///
/// Returns an error if the project or identity is missing, the event does
/// not exist, the role may not perform `action`, or the transition is invalid.
pub fn run_transition(args: &TransitionArgs, action: Action, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = ctx.require_session()?;

    let event = moderation::apply(&project.store(), &session, args.id.trim(), action, Utc::now())
        .map_err(|err| moderation_error(ctx.output, &err))?;

    let payload = TransitionOutput {
        id: event.id,
        action: action.as_str(),
        status: event.status.to_string(),
        reviewed_by: event.reviewed_by,
    };
    render(ctx.output, &payload, |p, w| {
        writeln!(w, "✓ {} {} (now {})", p.action, p.id, p.status)
    })
}

/// Execute `eh approve-all`.
///
/// # Errors
///
/// Returns an error if the project or identity is missing or the session is
/// not an admin.
pub fn run_approve_all(ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = ctx.require_session()?;

    let approved = moderation::bulk_approve(&project.store(), &session, Utc::now())
        .map_err(|err| moderation_error(ctx.output, &err))?;

    render(ctx.output, &BulkOutput { approved }, |p, w| {
        if p.approved == 0 {
            writeln!(w, "No pending events.")
        } else {
            writeln!(w, "✓ approved {} pending event(s)", p.approved)
        }
    })
}
