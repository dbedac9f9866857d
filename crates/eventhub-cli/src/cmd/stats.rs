//! `eh stats`: dashboard counts for the current identity.
//!
//! Everyone gets registrant counts; organizers and admins also get the
//! totals for the events they organized, and admins get status totals.

use eventhub_core::Role;
use eventhub_core::stats::{
    AdminStats, OrganizerStats, RegistrantStats, admin_stats, organizer_stats, registrant_stats,
};
use serde::Serialize;

use super::{Context, today};
use crate::output::{pretty_kv, pretty_section, render};

#[derive(Debug, Serialize)]
struct StatsOutput {
    user: String,
    role: Role,
    registrant: RegistrantStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    organizer: Option<OrganizerStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<AdminStats>,
}

/// Execute `eh stats`.
///
/// # Errors
///
/// Returns an error if the project or identity is missing.
pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let session = ctx.require_session()?;
    let events = project.store().load_all();

    let payload = StatsOutput {
        registrant: registrant_stats(&events, &session.email, today()),
        organizer: session
            .can_create_events()
            .then(|| organizer_stats(&events, &session.id)),
        admin: session.is_admin().then(|| admin_stats(&events)),
        user: session.id,
        role: session.role,
    };

    render(ctx.output, &payload, |p, w| {
        pretty_section(w, &format!("{} ({})", p.user, p.role))?;
        pretty_kv(w, "Registered", p.registrant.registered.to_string())?;
        pretty_kv(w, "Attended", p.registrant.attended.to_string())?;
        pretty_kv(w, "Upcoming", p.registrant.upcoming.to_string())?;
        if let Some(org) = &p.organizer {
            pretty_kv(w, "Organized", org.organized.to_string())?;
            pretty_kv(w, "Signups", org.total_registrations.to_string())?;
        }
        if let Some(admin) = &p.admin {
            writeln!(w)?;
            pretty_section(w, "All events")?;
            pretty_kv(w, "Total", admin.total.to_string())?;
            pretty_kv(w, "Active", admin.active.to_string())?;
            pretty_kv(w, "Pending", admin.pending.to_string())?;
            pretty_kv(w, "Rejected", admin.rejected.to_string())?;
            pretty_kv(w, "Cancelled", admin.cancelled.to_string())?;
            pretty_kv(w, "Completed", admin.completed.to_string())?;
        }
        Ok(())
    })
}
