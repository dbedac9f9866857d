//! `eh show`: full details for one event.

use std::io::{self, Write};

use clap::Args;
use eventhub_core::Event;
use eventhub_core::error::ErrorCode;
use serde::Serialize;

use super::Context;
use crate::output::{CliError, Renderable, fail, pretty_kv, pretty_rule, render_item};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Event ID.
    pub id: String,
}

/// An event plus the derived seat count, as shown to users.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    #[serde(rename = "seatsLeft")]
    pub seats_left: u32,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let seats_left = event.seats_left();
        Self { event, seats_left }
    }
}

fn schedule(event: &Event) -> String {
    let start = event.start_time.format("%H:%M");
    match event.end_time {
        Some(end) => format!("{} {start}-{}", event.date, end.format("%H:%M")),
        None => format!("{} {start}", event.date),
    }
}

impl Renderable for EventView {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let e = &self.event;
        writeln!(w, "{}  {}", e.id, e.title)?;
        pretty_rule(w)?;
        pretty_kv(w, "Status", e.status.as_str())?;
        pretty_kv(w, "When", schedule(e))?;
        pretty_kv(w, "Venue", &e.venue)?;
        pretty_kv(w, "Category", &e.category)?;
        pretty_kv(w, "Organizer", format!("{} ({})", e.organizer, e.organizer_id))?;
        pretty_kv(
            w,
            "Seats",
            format!("{}/{} ({} left)", e.attendees, e.max_seats, self.seats_left),
        )?;
        if let Some(reviewer) = &e.reviewed_by {
            let at = e
                .reviewed_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_default();
            pretty_kv(w, "Reviewed", format!("{reviewer} {at}").trim_end())?;
        }
        if !e.description.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", e.description)?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(w, self).map_err(io::Error::from)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let e = &self.event;
        writeln!(
            w,
            "{}  {}  {}  {}  {}/{}  {}",
            e.id,
            e.date,
            e.start_time.format("%H:%M"),
            e.status,
            e.attendees,
            e.max_seats,
            e.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "DATE", "TIME", "STATUS", "SEATS", "TITLE"]
    }
}

/// Execute `eh show`.
///
/// # Errors
///
/// Returns an error if the project is missing or the event does not exist.
pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let Some(event) = project.store().find_by_id(args.id.trim()) else {
        return Err(fail(
            ctx.output,
            &CliError::from_code(
                ErrorCode::EventNotFound,
                format!("event '{}' not found", args.id.trim()),
            ),
        ));
    };

    render_item(&EventView::from(event), ctx.output)?;
    Ok(())
}
