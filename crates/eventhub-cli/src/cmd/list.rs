//! `eh list`: browse events.
//!
//! Without filters this lists active events dated today or later. `--all`
//! starts from every stored event instead; the remaining flags narrow the
//! result and can be combined.

use clap::Args;
use eventhub_core::query::{self, ALL_CATEGORIES};

use super::{Context, today};
use super::show::EventView;
use crate::output::render_list;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Include every status and past dates.
    #[arg(long)]
    pub all: bool,

    /// Only events organized by this organizer ID.
    #[arg(long, value_name = "ID")]
    pub organizer: Option<String>,

    /// Only events organized by the current identity.
    #[arg(long, conflicts_with = "organizer")]
    pub mine: bool,

    /// Only events the current identity is registered for.
    #[arg(long)]
    pub registered: bool,

    /// Case-insensitive text to match in title, description, venue, or organizer.
    #[arg(long, short = 's', value_name = "TERM")]
    pub search: Option<String>,

    /// Exact category name, or `all`.
    #[arg(long, short = 'c', value_name = "CATEGORY")]
    pub category: Option<String>,
}

impl ListArgs {
    const fn needs_session(&self) -> bool {
        self.mine || self.registered
    }
}

/// Execute `eh list`.
///
/// # Errors
///
/// Returns an error if the project is missing, or `--mine`/`--registered` is
/// used without an identity.
pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = if args.needs_session() {
        Some(ctx.require_session()?)
    } else {
        None
    };

    let snapshot = project.store().load_all();
    let mut events = if args.all {
        snapshot
    } else {
        query::active_upcoming(&snapshot, today())
    };

    if let Some(organizer) = &args.organizer {
        events = query::by_organizer(&events, organizer.trim());
    }
    if let Some(session) = &session {
        if args.mine {
            events = query::by_organizer(&events, &session.id);
        }
        if args.registered {
            events = query::registered_by(&events, &session.email);
        }
    }
    if args.search.is_some() || args.category.is_some() {
        events = query::search(
            &events,
            args.search.as_deref().unwrap_or_default(),
            args.category.as_deref().unwrap_or(ALL_CATEGORIES),
        );
    }

    query::sort_by_schedule(&mut events);
    tracing::debug!(count = events.len(), "listing events");

    let views: Vec<EventView> = events.into_iter().map(EventView::from).collect();
    if views.is_empty() && !ctx.output.is_json() {
        println!("No events found.");
        return Ok(());
    }
    render_list(&views, ctx.output)?;
    Ok(())
}
