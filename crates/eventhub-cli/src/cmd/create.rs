//! `eh create`: publish a new event.

use chrono::Utc;
use clap::Args;
use eventhub_core::error::ErrorCode;
use eventhub_core::validate::{CreateError, EventDraft, create_event};

use super::{Context, today};
use super::show::EventView;
use crate::output::{CliError, fail, render_item};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Event title (5-100 characters).
    #[arg(long)]
    pub title: String,

    /// Event description (20-1000 characters).
    #[arg(long, short = 'd')]
    pub description: String,

    /// Event date, `YYYY-MM-DD`, today or later.
    #[arg(long)]
    pub date: String,

    /// Start time, `HH:MM` (24h).
    #[arg(long = "start", value_name = "HH:MM")]
    pub start_time: String,

    /// End time, `HH:MM` (24h), after the start time.
    #[arg(long = "end", value_name = "HH:MM")]
    pub end_time: Option<String>,

    #[arg(long)]
    pub venue: String,

    /// One of the configured categories.
    #[arg(long)]
    pub category: String,

    /// Capacity, 1-10000.
    #[arg(long = "seats", value_name = "N")]
    pub max_seats: String,

    /// Image URL or path.
    #[arg(long)]
    pub image: Option<String>,
}

impl CreateArgs {
    fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            venue: self.venue.clone(),
            category: self.category.clone(),
            max_seats: self.max_seats.clone(),
            image: self.image.clone(),
        }
    }
}

/// Execute `eh create`.
///
/// # Errors
///
/// Returns an error if the project or identity is missing, the role cannot
/// create events, any field is invalid, or the write fails.
pub fn run_create(args: &CreateArgs, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = ctx.require_session()?;
    let policy = project.config.policy();

    let event = match create_event(
        &project.store(),
        &session,
        &args.draft(),
        &policy,
        today(),
        Utc::now(),
    ) {
        Ok(event) => event,
        Err(CreateError::Invalid(errors)) => {
            let details = serde_json::to_value(&errors)?;
            return Err(fail(
                ctx.output,
                &CliError::from_code(ErrorCode::ValidationFailed, "invalid event")
                    .with_details(details),
            ));
        }
        Err(err) => {
            return Err(fail(
                ctx.output,
                &CliError::from_code(err.code(), err.to_string()),
            ));
        }
    };

    render_item(&EventView::from(event), ctx.output)?;
    Ok(())
}
