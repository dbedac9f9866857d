//! E2E tests for approval workflows, role checks, and status transitions.

use assert_cmd::Command;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn eh_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("eh"));
    cmd.current_dir(dir);
    cmd.env_remove("EVENTHUB_USER");
    cmd.env_remove("EVENTHUB_ROLE");
    cmd.env_remove("FORMAT");
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env("EVENTHUB_LOG", "error");
    cmd
}

const ORGANIZER: &str = "chess@campus.edu";
const ADMIN: &str = "dean@campus.edu";

/// Initialize a project where new events need approval.
fn init_moderated_project(dir: &Path) {
    eh_cmd(dir).args(["init"]).assert().success();
    let path = dir.join(".eventhub/config.toml");
    let config = std::fs::read_to_string(&path).expect("read config");
    assert!(config.contains("require_approval = false"));
    std::fs::write(
        &path,
        config.replace("require_approval = false", "require_approval = true"),
    )
    .expect("write config");
}

fn as_role(dir: &Path, user: &str, role: &str, args: &[&str]) -> std::process::Output {
    eh_cmd(dir)
        .args(["--as", user, "--role", role])
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash")
}

fn ok_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn error_code(output: &std::process::Output) -> String {
    assert!(!output.status.success(), "command unexpectedly succeeded");
    let err: Value = serde_json::from_slice(&output.stderr).expect("valid JSON on stderr");
    err["error"]["error_code"]
        .as_str()
        .expect("error_code")
        .to_string()
}

fn create_event(dir: &Path, title: &str) -> Value {
    let date = (Utc::now().date_naive() + Duration::days(10))
        .format("%Y-%m-%d")
        .to_string();
    ok_json(&as_role(
        dir,
        ORGANIZER,
        "organizer",
        &[
            "create",
            "--title",
            title,
            "--description",
            "Rapid-format open tournament for all levels.",
            "--date",
            &date,
            "--start",
            "14:00",
            "--venue",
            "Student Union",
            "--category",
            "Social",
            "--seats",
            "64",
        ],
    ))
}

fn status_of(dir: &Path, id: &str) -> String {
    let output = eh_cmd(dir)
        .args(["show", id, "--json"])
        .output()
        .expect("show");
    ok_json(&output)["status"]
        .as_str()
        .expect("status")
        .to_string()
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

#[test]
fn pending_event_needs_admin_approval() {
    let dir = TempDir::new().expect("tempdir");
    init_moderated_project(dir.path());

    let event = create_event(dir.path(), "Chess Open 2026");
    assert_eq!(event["status"], "pending");
    let id = event["id"].as_str().expect("id").to_string();

    // Not listed, not open.
    let list = eh_cmd(dir.path()).args(["list", "--json"]).output().expect("list");
    assert_eq!(ok_json(&list), serde_json::json!([]));
    let closed = as_role(dir.path(), "ana@campus.edu", "participant", &["register", &id]);
    assert_eq!(error_code(&closed), "E2004");

    // Organizers cannot approve their own events.
    let denied = as_role(dir.path(), ORGANIZER, "organizer", &["approve", &id]);
    assert_eq!(error_code(&denied), "E3002");

    let approved = ok_json(&as_role(dir.path(), ADMIN, "admin", &["approve", &id]));
    assert_eq!(approved["status"], "active");
    assert_eq!(approved["reviewed_by"], "dean");

    let registered = as_role(dir.path(), "ana@campus.edu", "participant", &["register", &id]);
    assert_eq!(ok_json(&registered)["outcome"], "registered");
}

#[test]
fn reject_is_final() {
    let dir = TempDir::new().expect("tempdir");
    init_moderated_project(dir.path());
    let id = create_event(dir.path(), "Poetry Slam Night")["id"]
        .as_str()
        .expect("id")
        .to_string();

    ok_json(&as_role(dir.path(), ADMIN, "admin", &["reject", &id]));
    assert_eq!(status_of(dir.path(), &id), "rejected");

    let again = as_role(dir.path(), ADMIN, "admin", &["approve", &id]);
    assert_eq!(error_code(&again), "E3001");
}

#[test]
fn approve_all_approves_only_pending() {
    let dir = TempDir::new().expect("tempdir");
    init_moderated_project(dir.path());
    create_event(dir.path(), "Board Game Social");
    create_event(dir.path(), "Film Club Screening");

    let denied = as_role(dir.path(), ORGANIZER, "organizer", &["approve-all"]);
    assert_eq!(error_code(&denied), "E3002");

    let first = ok_json(&as_role(dir.path(), ADMIN, "admin", &["approve-all"]));
    assert_eq!(first["approved"], 2);
    let second = ok_json(&as_role(dir.path(), ADMIN, "admin", &["approve-all"]));
    assert_eq!(second["approved"], 0);
}

// ---------------------------------------------------------------------------
// Cancel / reinstate / complete
// ---------------------------------------------------------------------------

#[test]
fn owner_cancels_and_admin_reinstates() {
    let dir = TempDir::new().expect("tempdir");
    eh_cmd(dir.path()).args(["init"]).assert().success();
    let id = create_event(dir.path(), "Chess Open 2026")["id"]
        .as_str()
        .expect("id")
        .to_string();

    let stranger = as_role(dir.path(), "other@campus.edu", "organizer", &["cancel", &id]);
    assert_eq!(error_code(&stranger), "E3002");

    ok_json(&as_role(dir.path(), ORGANIZER, "organizer", &["cancel", &id]));
    assert_eq!(status_of(dir.path(), &id), "cancelled");

    let closed = as_role(dir.path(), "ana@campus.edu", "participant", &["register", &id]);
    assert_eq!(error_code(&closed), "E2004");

    ok_json(&as_role(dir.path(), ADMIN, "admin", &["reinstate", &id]));
    assert_eq!(status_of(dir.path(), &id), "active");

    ok_json(&as_role(dir.path(), ADMIN, "admin", &["complete", &id]));
    assert_eq!(status_of(dir.path(), &id), "completed");
}

#[test]
fn transition_on_unknown_event_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    eh_cmd(dir.path()).args(["init"]).assert().success();
    let output = as_role(dir.path(), ADMIN, "admin", &["approve", "evt_missing"]);
    assert_eq!(error_code(&output), "E2001");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_allowed_for_owner_only() {
    let dir = TempDir::new().expect("tempdir");
    eh_cmd(dir.path()).args(["init"]).assert().success();
    let id = create_event(dir.path(), "Chess Open 2026")["id"]
        .as_str()
        .expect("id")
        .to_string();

    let denied = as_role(dir.path(), "ana@campus.edu", "participant", &["delete", &id]);
    assert_eq!(error_code(&denied), "E3002");

    let deleted = ok_json(&as_role(dir.path(), ORGANIZER, "organizer", &["delete", &id]));
    assert_eq!(deleted["deleted"], true);

    let gone = eh_cmd(dir.path())
        .args(["show", &id, "--json"])
        .output()
        .expect("show");
    assert_eq!(error_code(&gone), "E2001");
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[test]
fn stats_sections_follow_role() {
    let dir = TempDir::new().expect("tempdir");
    eh_cmd(dir.path()).args(["init", "--seed"]).assert().success();
    let id = create_event(dir.path(), "Chess Open 2026")["id"]
        .as_str()
        .expect("id")
        .to_string();
    ok_json(&as_role(dir.path(), "ana@campus.edu", "participant", &["register", &id]));

    let participant = ok_json(&as_role(dir.path(), "ana@campus.edu", "participant", &["stats"]));
    assert_eq!(participant["registrant"]["registered"], 1);
    assert_eq!(participant["registrant"]["upcoming"], 1);
    assert!(participant.get("organizer").is_none());
    assert!(participant.get("admin").is_none());

    let organizer = ok_json(&as_role(dir.path(), ORGANIZER, "organizer", &["stats"]));
    assert_eq!(organizer["organizer"]["organized"], 1);
    assert_eq!(organizer["organizer"]["total_registrations"], 1);

    let admin = ok_json(&as_role(dir.path(), ADMIN, "admin", &["stats"]));
    assert_eq!(admin["admin"]["total"], 4);
    assert_eq!(admin["admin"]["active"], 4);
}

#[test]
fn unknown_role_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    eh_cmd(dir.path()).args(["init"]).assert().success();
    let output = as_role(dir.path(), ADMIN, "superuser", &["stats"]);
    assert_eq!(error_code(&output), "E3002");
}
