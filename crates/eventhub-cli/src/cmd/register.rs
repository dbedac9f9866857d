//! `eh register`: take a seat at an event.

use clap::Args;
use eventhub_core::{RegistrationOutcome, register};
use serde::Serialize;

use super::Context;
use crate::output::{CliError, fail, render};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Event ID.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct RegisterOutput<'a> {
    event_id: &'a str,
    registrant: &'a str,
    #[serde(flatten)]
    outcome: RegistrationOutcome,
    message: &'static str,
}

/// Execute `eh register`. The registrant is the current identity's email.
///
/// Every outcome other than `registered` exits non-zero with its error code.
///
/// # Errors
///
/// Returns an error if the project or identity is missing, or the
/// registration did not succeed.
pub fn run_register(args: &RegisterArgs, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = ctx.require_session()?;
    let event_id = args.id.trim();

    let outcome = register(&project.store(), event_id, &session.email);

    if let Some(code) = outcome.code() {
        return Err(fail(
            ctx.output,
            &CliError::from_code(code, outcome.message()),
        ));
    }

    let payload = RegisterOutput {
        event_id,
        registrant: &session.email,
        outcome,
        message: outcome.message(),
    };
    render(ctx.output, &payload, |p, w| {
        writeln!(w, "✓ {} ({} -> {})", p.message, p.registrant, p.event_id)
    })
}
